use crate::api::errors::CompletionError;
use crate::auth::AuthError;
use crate::storage::StorageError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    IoError(std::io::Error),
    CompletionError(CompletionError),
    StorageError(StorageError),
    AuthError(AuthError),
    TomlError(toml::de::Error),
    ZipError(zip::result::ZipError),
    NotLoggedIn,
    MissingApiKey,
    FileNotFound(String),
    InvalidInput(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::IoError(e) => write!(f, "IO error: {}", e),
            AppError::CompletionError(e) => write!(f, "Completion API error: {}", e),
            AppError::StorageError(e) => write!(f, "Storage error: {}", e),
            AppError::AuthError(e) => write!(f, "Authentication error: {}", e),
            AppError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            AppError::ZipError(e) => write!(f, "Archive error: {}", e),
            AppError::NotLoggedIn => {
                write!(f, "You are not logged in, run `codemini login` first")
            }
            AppError::MissingApiKey => write!(
                f,
                "No OpenAI API key configured, run `codemini set-token <key>`"
            ),
            AppError::FileNotFound(name) => write!(f, "No such file in the project: {}", name),
            AppError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::TomlError(err)
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        AppError::CompletionError(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::StorageError(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::AuthError(err)
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::ZipError(err)
    }
}
