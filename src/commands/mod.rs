pub mod account;
pub mod chat;
pub mod files;
pub mod project;
pub mod serve;
pub mod settings;

use crate::api::{client::OpenAiClient, relay::RelayClient, CompletionService};
use crate::auth::{local::LocalAuth, AuthProvider, Session};
use crate::cli::display::CliDisplayManager;
use crate::errors::AppError;
use crate::storage::{
    documents::{DocumentStore, LocalDocumentStore},
    draft::DraftCache,
};
use crate::utils::config::Config;
use tokio::sync::watch;

/// Everything a command handler needs, built once per run.
pub struct App {
    pub config: Config,
    pub display: CliDisplayManager,
    pub auth: LocalAuth,
    pub documents: LocalDocumentStore,
    pub drafts: DraftCache,
    /// Follows sign-in and sign-out for the lifetime of the run.
    session: watch::Receiver<Option<Session>>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let data_directory = config.data_directory().to_path_buf();
        tokio::fs::create_dir_all(&data_directory).await?;

        let drafts = DraftCache::new(&data_directory);
        log::debug!("Draft cache at {}", drafts.path().display());

        let auth = LocalAuth::open(&data_directory).await?;
        if let Some(session) = auth.current() {
            log::debug!("Restored session for {}", session.email);
        }

        Ok(Self {
            session: auth.subscribe(),
            auth,
            documents: LocalDocumentStore::new(&data_directory),
            drafts,
            display: CliDisplayManager::new(),
            config,
        })
    }

    /// The signed-in session, or `NotLoggedIn`.
    pub fn require_session(&self) -> Result<Session, AppError> {
        self.session.borrow().clone().ok_or(AppError::NotLoggedIn)
    }

    /// Picks the relay when one is configured, otherwise calls the API with the
    /// signed-in user's key.
    pub async fn completion_service(&self) -> Result<Box<dyn CompletionService>, AppError> {
        if let Some(url) = &self.config.relay_url {
            return Ok(Box::new(RelayClient::new(url.clone())));
        }

        let session = self.require_session()?;
        let api_key = self
            .documents
            .get_api_key(&session.uid)
            .await?
            .filter(|key| !key.trim().is_empty())
            .ok_or(AppError::MissingApiKey)?;

        Ok(Box::new(OpenAiClient::with_base_url(
            api_key,
            self.config.model_settings(),
            self.config.base_url.clone(),
        )))
    }
}
