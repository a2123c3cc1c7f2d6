use super::FileRecord;
use serde::{Deserialize, Serialize};

/// The JSON document the assistant is instructed to answer with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub message: String,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}
