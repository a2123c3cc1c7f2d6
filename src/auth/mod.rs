pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

/// The signed-in user, passed explicitly to every handler that needs one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub email: String,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("An account already exists for {0}")]
    EmailInUse(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("Password reset token is invalid or already used")]
    InvalidResetToken,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Requests a password reset email. Unknown addresses are accepted
    /// silently so the call does not reveal which accounts exist.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    fn current(&self) -> Option<Session>;

    /// Observes session changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub(crate) fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}
