use super::archive;
use crate::errors::AppError;
use crate::models::{ChatMessage, FileRecord};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Maximum allowed file size (10 MB).
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Name of the chat history file carried next to the project files.
pub const CHAT_HISTORY_FILE: &str = "mini_chat.json";

/// Everything read by one upload.
#[derive(Debug, Default)]
pub struct Upload {
    pub files: Vec<FileRecord>,
    /// Chat history found in a `mini_chat.json`, if any.
    pub messages: Option<Vec<ChatMessage>>,
    pub skipped: Vec<PathBuf>,
}

impl Upload {
    /// Only a `mini_chat.json` at the root, from a single file or an archive,
    /// is a chat history. Inside an uploaded folder it is an ordinary file.
    fn push(&mut self, filename: String, code: String) {
        if filename != CHAT_HISTORY_FILE {
            self.files.push(FileRecord { filename, code });
            return;
        }
        match serde_json::from_str::<Vec<ChatMessage>>(&code) {
            Ok(messages) => self.messages = Some(messages),
            Err(e) => {
                log::warn!("{} is not a chat history: {}", filename, e);
                self.skipped.push(PathBuf::from(filename));
            }
        }
    }
}

/// Reads files, folders and zip archives into records.
///
/// A file is named by its file name. A folder keeps its own name as the first
/// path component, so uploading `proj/` yields `proj/src/main.py`. Zip archives
/// are expanded with their entry names.
pub async fn upload_paths(paths: &[PathBuf], ignore_paths: &[PathBuf]) -> Result<Upload, AppError> {
    let mut upload = Upload::default();

    for path in paths {
        if is_ignored(path, ignore_paths) {
            continue;
        }
        let metadata = fs::metadata(path).await?;
        if metadata.is_dir() {
            upload_folder(path, ignore_paths, &mut upload).await?;
        } else if is_zip(path) {
            let bytes = fs::read(path).await?;
            for record in archive::read_archive(&bytes)? {
                upload.push(record.filename, record.code);
            }
        } else {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| AppError::InvalidInput(format!("Not a file: {}", path.display())))?;
            if let Some(code) = read_text_file(path).await? {
                upload.push(filename, code);
            } else {
                upload.skipped.push(path.clone());
            }
        }
    }

    log::info!(
        "Uploaded {} file(s), skipped {}",
        upload.files.len(),
        upload.skipped.len()
    );
    Ok(upload)
}

async fn upload_folder(
    folder: &Path,
    ignore_paths: &[PathBuf],
    upload: &mut Upload,
) -> Result<(), AppError> {
    let folder = fs::canonicalize(folder).await?;
    let base = folder.parent().unwrap_or(folder.as_path()).to_path_buf();
    let ignored: Vec<PathBuf> = ignore_paths
        .iter()
        .filter_map(|p| std::fs::canonicalize(p).ok())
        .collect();

    let walker = WalkDir::new(&folder)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git" && !is_ignored(e.path(), &ignored));

    for entry in walker {
        let entry = entry.map_err(|e| AppError::InvalidInput(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(filename) = relative_name(path, &base) else {
            continue;
        };
        match read_text_file(path).await? {
            Some(code) => upload.push(filename, code),
            None => upload.skipped.push(path.to_path_buf()),
        }
    }
    Ok(())
}

/// `/`-separated path of `path` below `base`.
fn relative_name(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Reads a file as UTF-8 text; `None` when it is too large or binary.
async fn read_text_file(path: &Path) -> Result<Option<String>, AppError> {
    let metadata = fs::metadata(path).await?;
    if metadata.len() > MAX_FILE_SIZE {
        log::warn!(
            "Skipping {}: larger than {} bytes",
            path.display(),
            MAX_FILE_SIZE
        );
        return Ok(None);
    }

    let bytes = fs::read(path).await?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(Some(text)),
        Err(_) => {
            log::warn!("Skipping {}: not valid UTF-8", path.display());
            Ok(None)
        }
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// Checks if a path should be ignored.
fn is_ignored(path: &Path, ignored: &[PathBuf]) -> bool {
    ignored.iter().any(|ignored_path| path.starts_with(ignored_path))
}
