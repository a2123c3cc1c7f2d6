use super::StorageError;
use crate::chat::ChatSession;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

const DRAFT_FILE: &str = "draft.json";

/// Local copy of the open project, restored on every run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Draft {
    #[serde(flatten)]
    pub session: ChatSession,
    #[serde(default)]
    pub api_key_notice_dismissed: bool,
}

/// Mirrors the [`Draft`] to a JSON file in the data directory.
pub struct DraftCache {
    path: PathBuf,
}

impl DraftCache {
    pub fn new(data_directory: &Path) -> Self {
        Self {
            path: data_directory.join(DRAFT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the draft. A missing file is an empty draft, and so is a corrupt
    /// one, after logging it.
    pub async fn load(&self) -> Result<Draft, StorageError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Draft::default());
        }
        let raw = fs::read_to_string(&self.path).await?;
        match serde_json::from_str(&raw) {
            Ok(draft) => Ok(draft),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable draft at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Draft::default())
            }
        }
    }

    pub async fn save(&self, draft: &Draft) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(draft)?;
        fs::write(&self.path, raw).await?;
        log::debug!("Draft saved to {}", self.path.display());
        Ok(())
    }
}
