use super::reader::CHAT_HISTORY_FILE;
use crate::errors::AppError;
use crate::models::{ChatMessage, FileRecord};
use crate::store::FileStore;
use chrono::{DateTime, Utc};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Download name for an archive created at `now`, e.g. `mini-2024-05-01-09-30.zip`.
pub fn archive_name(now: DateTime<Utc>) -> String {
    format!("mini-{}.zip", now.format("%Y-%m-%d-%H-%M"))
}

/// Packs the files and the chat history into an in-memory zip.
///
/// The history entry owns the `mini_chat.json` name at the archive root, so a
/// project file with that exact name is left out.
pub fn build_archive(files: &FileStore, messages: &[ChatMessage]) -> Result<Vec<u8>, AppError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (filename, code) in files.iter() {
        if filename == CHAT_HISTORY_FILE {
            log::warn!("Leaving {} out of the archive, the chat history uses that name", filename);
            continue;
        }
        zip.start_file(filename, options)?;
        zip.write_all(code.as_bytes())?;
    }

    let history = serde_json::to_string(messages)
        .map_err(|e| AppError::InvalidInput(format!("Chat history: {}", e)))?;
    zip.start_file(CHAT_HISTORY_FILE, options)?;
    zip.write_all(history.as_bytes())?;

    Ok(zip.finish()?.into_inner())
}

/// Writes the archive into `output_directory` and returns its path.
pub async fn write_archive(
    files: &FileStore,
    messages: &[ChatMessage],
    output_directory: &Path,
) -> Result<PathBuf, AppError> {
    let bytes = build_archive(files, messages)?;
    tokio::fs::create_dir_all(output_directory).await?;
    let path = output_directory.join(archive_name(Utc::now()));
    tokio::fs::write(&path, bytes).await?;
    log::info!("Wrote {} file(s) to {}", files.len(), path.display());
    Ok(path)
}

/// Reads every text entry of a zip; binary entries are skipped.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<FileRecord>, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut records = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let filename = entry.name().to_string();
        let mut code = String::new();
        if entry.read_to_string(&mut code).is_err() {
            log::warn!("Skipping archive entry {}: not valid UTF-8", filename);
            continue;
        }
        records.push(FileRecord { filename, code });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_processing::reader::upload_paths;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_archive_name_uses_minute_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 59).unwrap();
        assert_eq!(archive_name(now), "mini-2024-05-01-09-30.zip");
    }

    #[test]
    fn test_archive_always_carries_history() {
        let bytes = build_archive(&FileStore::new(), &[]).unwrap();
        let records = read_archive(&bytes).unwrap();
        assert_eq!(records, vec![FileRecord::new(CHAT_HISTORY_FILE, "[]")]);
    }

    #[test]
    fn test_project_file_named_like_history_does_not_break_archive() {
        let mut store = FileStore::new();
        store.merge(vec![
            FileRecord::new("a.py", "1"),
            FileRecord::new(CHAT_HISTORY_FILE, "not json"),
            FileRecord::new("docs/mini_chat.json", "nested"),
        ]);
        let messages = vec![ChatMessage::user("hi")];

        let bytes = build_archive(&store, &messages).unwrap();
        let records = read_archive(&bytes).unwrap();

        assert_eq!(
            records,
            vec![
                FileRecord::new("a.py", "1"),
                FileRecord::new("docs/mini_chat.json", "nested"),
                FileRecord::new(CHAT_HISTORY_FILE, r#"[{"role":"user","content":"hi"}]"#),
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_then_download_reproduces_files() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("proj");
        std::fs::create_dir_all(project.join("pkg")).unwrap();
        std::fs::write(project.join("main.py"), "import pkg\n").unwrap();
        std::fs::write(project.join("pkg/__init__.py"), "").unwrap();

        let upload = upload_paths(&[project], &[]).await.unwrap();
        let mut store = FileStore::new();
        store.merge(upload.files.clone());
        let messages = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];

        let out = dir.path().join("out");
        let path = write_archive(&store, &messages, &out).await.unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("mini-"));

        let restored = upload_paths(&[path], &[]).await.unwrap();
        assert_eq!(restored.files, upload.files);
        assert_eq!(restored.messages, Some(messages));
    }
}
