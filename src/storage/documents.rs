//! Per-user documents: the API key setting and saved projects.
//!
//! The local store keeps one JSON file per document, laid out the way the
//! hosted database addresses them:
//!
//! ```text
//! user/<uid>/openai/token.json      {"apiKey": "..."}
//! user/<uid>/projects/<id>.json     {"files": [...], "messages": [...]}
//! ```

use super::{validate_id, StorageError};
use crate::models::project::Project;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_api_key(&self, uid: &str) -> Result<Option<String>, StorageError>;

    async fn set_api_key(&self, uid: &str, api_key: &str) -> Result<(), StorageError>;

    /// Creates or overwrites the project under its id.
    async fn save_project(&self, uid: &str, project: &Project) -> Result<(), StorageError>;

    async fn load_project(&self, uid: &str, id: &str) -> Result<Project, StorageError>;

    /// Deleting a project that does not exist is not an error.
    async fn delete_project(&self, uid: &str, id: &str) -> Result<(), StorageError>;

    /// Ids of the user's saved projects, sorted.
    async fn list_projects(&self, uid: &str) -> Result<Vec<String>, StorageError>;
}

#[derive(Serialize, Deserialize)]
struct TokenDocument {
    #[serde(rename = "apiKey")]
    api_key: String,
}

pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(data_directory: &Path) -> Self {
        Self {
            root: data_directory.join("user"),
        }
    }

    fn user_dir(&self, uid: &str) -> Result<PathBuf, StorageError> {
        validate_id(uid)?;
        Ok(self.root.join(uid))
    }

    fn token_path(&self, uid: &str) -> Result<PathBuf, StorageError> {
        Ok(self.user_dir(uid)?.join("openai").join("token.json"))
    }

    fn projects_dir(&self, uid: &str) -> Result<PathBuf, StorageError> {
        Ok(self.user_dir(uid)?.join("projects"))
    }

    fn project_path(&self, uid: &str, id: &str) -> Result<PathBuf, StorageError> {
        validate_id(id)?;
        Ok(self.projects_dir(uid)?.join(format!("{}.json", id)))
    }
}

async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, serde_json::to_string_pretty(document)?).await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn get_api_key(&self, uid: &str) -> Result<Option<String>, StorageError> {
        let path = self.token_path(uid)?;
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        let document: TokenDocument = serde_json::from_str(&fs::read_to_string(&path).await?)?;
        Ok(Some(document.api_key))
    }

    async fn set_api_key(&self, uid: &str, api_key: &str) -> Result<(), StorageError> {
        let document = TokenDocument {
            api_key: api_key.to_string(),
        };
        write_document(&self.token_path(uid)?, &document).await
    }

    async fn save_project(&self, uid: &str, project: &Project) -> Result<(), StorageError> {
        let path = self.project_path(uid, &project.id)?;
        write_document(&path, project).await?;
        log::info!("Saved project {} for user {}", project.id, uid);
        Ok(())
    }

    async fn load_project(&self, uid: &str, id: &str) -> Result<Project, StorageError> {
        let path = self.project_path(uid, id)?;
        if !fs::try_exists(&path).await? {
            return Err(StorageError::ProjectNotFound(id.to_string()));
        }
        let mut project: Project = serde_json::from_str(&fs::read_to_string(&path).await?)?;
        project.id = id.to_string();
        Ok(project)
    }

    async fn delete_project(&self, uid: &str, id: &str) -> Result<(), StorageError> {
        let path = self.project_path(uid, id)?;
        if fs::try_exists(&path).await? {
            fs::remove_file(&path).await?;
            log::info!("Deleted project {} for user {}", id, uid);
        }
        Ok(())
    }

    async fn list_projects(&self, uid: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.projects_dir(uid)?;
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
