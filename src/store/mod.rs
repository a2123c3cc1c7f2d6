//! The in-memory file collection of the open project.
//!
//! Files are kept in an insertion-ordered map keyed by filename, so writing a
//! filename that already exists replaces its content in place and every other
//! file keeps its position.

use crate::models::FileRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from filename to file content.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "Vec<FileRecord>", into = "Vec<FileRecord>")]
pub struct FileStore {
    files: IndexMap<String, String>,
}

/// What a merge did to a single filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub filename: String,
    /// Content before the merge, `None` when the file was added.
    pub before: Option<String>,
    pub after: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub changes: Vec<FileChange>,
}

impl MergeSummary {
    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(|c| c.before.is_none())
            .map(|c| c.filename.as_str())
    }

    pub fn updated(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(|c| c.before.is_some())
            .map(|c| c.filename.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, filename: &str) -> Option<&str> {
        self.files.get(filename).map(String::as_str)
    }

    /// Iterates `(filename, code)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(f, c)| (f.as_str(), c.as_str()))
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn to_records(&self) -> Vec<FileRecord> {
        self.iter().map(|(f, c)| FileRecord::new(f, c)).collect()
    }

    /// Writes `code` to `filename`, creating the file when it does not exist.
    /// Returns the previous content.
    pub fn upsert(&mut self, filename: impl Into<String>, code: impl Into<String>) -> Option<String> {
        self.files.insert(filename.into(), code.into())
    }

    /// Deletes a file, keeping the relative order of the remaining ones.
    pub fn remove(&mut self, filename: &str) -> Option<FileRecord> {
        self.files
            .shift_remove_entry(filename)
            .map(|(filename, code)| FileRecord { filename, code })
    }

    /// Overwrites every file named in `incoming` and appends the new ones.
    ///
    /// When `incoming` names the same file more than once the last record wins.
    /// Records whose content is already identical are not reported as changes.
    pub fn merge<I>(&mut self, incoming: I) -> MergeSummary
    where
        I: IntoIterator<Item = FileRecord>,
    {
        let mut latest: IndexMap<String, String> = IndexMap::new();
        for record in incoming {
            latest.insert(record.filename, record.code);
        }

        let mut summary = MergeSummary::default();
        for (filename, code) in latest {
            let before = self.files.insert(filename.clone(), code.clone());
            if before.as_deref() != Some(code.as_str()) {
                summary.changes.push(FileChange {
                    filename,
                    before,
                    after: code,
                });
            }
        }
        summary
    }

    /// Returns the files whose name ends with one of the suffixes in `raw`.
    pub fn filter(&self, raw: &str) -> FileStore {
        let suffixes = parse_filter(raw);
        if suffixes.is_empty() {
            return self.clone();
        }
        let files = self
            .files
            .iter()
            .filter(|(filename, _)| suffixes.iter().any(|s| filename.ends_with(s)))
            .map(|(f, c)| (f.clone(), c.clone()))
            .collect();
        FileStore { files }
    }
}

/// Splits a raw filter on commas and semicolons, dropping blank parts.
pub fn parse_filter(raw: &str) -> Vec<&str> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Editor language id for a filename, by extension.
pub fn language_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("ts") | Some("tsx") => "typescript",
        Some("js") => "javascript",
        Some("py") => "python",
        Some("java") => "java",
        Some("cpp") => "cpp",
        Some("html") => "html",
        Some("css") => "css",
        _ => "plaintext",
    }
}

impl From<Vec<FileRecord>> for FileStore {
    fn from(records: Vec<FileRecord>) -> Self {
        let mut store = FileStore::new();
        store.merge(records);
        store
    }
}

impl From<FileStore> for Vec<FileRecord> {
    fn from(store: FileStore) -> Self {
        store
            .files
            .into_iter()
            .map(|(filename, code)| FileRecord { filename, code })
            .collect()
    }
}
