use super::{ChatMessage, FileRecord};
use serde::{Deserialize, Serialize};

/// A saved snapshot of the editor owned by one account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Project {
    #[serde(skip)]
    pub id: String,
    pub files: Vec<FileRecord>,
    pub messages: Vec<ChatMessage>,
}

impl Project {
    /// Creates a project with a freshly generated id.
    pub fn new(files: Vec<FileRecord>, messages: Vec<ChatMessage>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), files, messages)
    }

    pub fn with_id(id: String, files: Vec<FileRecord>, messages: Vec<ChatMessage>) -> Self {
        Self {
            id,
            files,
            messages,
        }
    }
}
