use super::{normalize_email, AuthError, AuthProvider, Session, MIN_PASSWORD_LENGTH};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::watch;

const ACCOUNTS_FILE: &str = "accounts.json";
const SESSION_FILE: &str = "session.json";
const OUTBOX_DIR: &str = "outbox";

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Account {
    uid: String,
    salt: String,
    password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reset_token: Option<String>,
}

/// Accounts keyed by normalized email.
type Accounts = BTreeMap<String, Account>;

/// File-backed identity provider.
pub struct LocalAuth {
    accounts_path: PathBuf,
    session_path: PathBuf,
    outbox: PathBuf,
    session: watch::Sender<Option<Session>>,
}

impl LocalAuth {
    /// Opens the provider and restores the persisted session, if any.
    pub async fn open(data_directory: &Path) -> Result<Self, AuthError> {
        let session_path = data_directory.join(SESSION_FILE);
        let current = if fs::try_exists(&session_path).await? {
            let raw = fs::read_to_string(&session_path).await?;
            serde_json::from_str::<Session>(&raw).ok()
        } else {
            None
        };

        Ok(Self {
            accounts_path: data_directory.join(ACCOUNTS_FILE),
            session_path,
            outbox: data_directory.join(OUTBOX_DIR),
            session: watch::Sender::new(current),
        })
    }

    async fn read_accounts(&self) -> Result<Accounts, AuthError> {
        if !fs::try_exists(&self.accounts_path).await? {
            return Ok(Accounts::new());
        }
        let raw = fs::read_to_string(&self.accounts_path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write_accounts(&self, accounts: &Accounts) -> Result<(), AuthError> {
        if let Some(parent) = self.accounts_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.accounts_path, serde_json::to_string_pretty(accounts)?).await?;
        Ok(())
    }

    async fn set_session(&self, session: Option<Session>) -> Result<(), AuthError> {
        match &session {
            Some(s) => {
                if let Some(parent) = self.session_path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(&self.session_path, serde_json::to_string(s)?).await?;
            }
            None => {
                if fs::try_exists(&self.session_path).await? {
                    fs::remove_file(&self.session_path).await?;
                }
            }
        }
        self.session.send_replace(session);
        Ok(())
    }

    /// Where the password reset email for `email` is delivered. There is no
    /// mail transport, so the message is written to a text file.
    pub fn outbox_path(&self, email: &str) -> Result<PathBuf, AuthError> {
        let email = normalize_email(email)?;
        Ok(self.outbox.join(format!("{}.txt", email)))
    }

    /// Completes a reset started by [`AuthProvider::send_password_reset`].
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        check_password(new_password)?;
        let email = normalize_email(email)?;
        let mut accounts = self.read_accounts().await?;
        let account = accounts
            .get_mut(&email)
            .filter(|a| a.reset_token.as_deref() == Some(token))
            .ok_or(AuthError::InvalidResetToken)?;

        account.salt = uuid::Uuid::new_v4().simple().to_string();
        account.password_hash = hash_password(&account.salt, new_password);
        account.reset_token = None;
        self.write_accounts(&accounts).await?;
        log::info!("Password reset for {}", email);
        Ok(())
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn check_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        check_password(password)?;

        let mut accounts = self.read_accounts().await?;
        if accounts.contains_key(&email) {
            return Err(AuthError::EmailInUse(email));
        }

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let account = Account {
            uid: uuid::Uuid::new_v4().simple().to_string(),
            password_hash: hash_password(&salt, password),
            salt,
            reset_token: None,
        };
        let session = Session {
            uid: account.uid.clone(),
            email: email.clone(),
        };
        accounts.insert(email, account);
        self.write_accounts(&accounts).await?;

        log::info!("Created account {}", session.email);
        self.set_session(Some(session.clone())).await?;
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let accounts = self.read_accounts().await?;
        let account = accounts
            .get(&email)
            .filter(|a| hash_password(&a.salt, password) == a.password_hash)
            .ok_or(AuthError::InvalidCredentials)?;

        let session = Session {
            uid: account.uid.clone(),
            email,
        };
        self.set_session(Some(session.clone())).await?;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_session(None).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email)?;
        let mut accounts = self.read_accounts().await?;
        let Some(account) = accounts.get_mut(&email) else {
            log::debug!("Password reset requested for unknown address");
            return Ok(());
        };

        let token = uuid::Uuid::new_v4().simple().to_string();
        account.reset_token = Some(token.clone());
        self.write_accounts(&accounts).await?;

        let mail = format!(
            "To: {email}\nSubject: Reset your CodeMini password\n\n\
             Token: {token}\n\n\
             codemini reset-password --email {email} --token {token} --new-password <password>\n"
        );
        let path = self.outbox_path(&email)?;
        fs::create_dir_all(&self.outbox).await?;
        fs::write(&path, mail).await?;
        log::info!("Password reset email for {} written to {}", email, path.display());
        Ok(())
    }

    fn current(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let dir = tempdir().unwrap();
        let auth = LocalAuth::open(dir.path()).await.unwrap();

        let created = auth.sign_up("Ada@example.com", "secret1").await.unwrap();
        assert_eq!(created.email, "ada@example.com");
        assert_eq!(auth.current(), Some(created.clone()));

        auth.sign_out().await.unwrap();
        assert_eq!(auth.current(), None);

        let signed_in = auth.sign_in("ada@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in, created);
    }

    #[tokio::test]
    async fn test_rejects_duplicate_and_bad_credentials() {
        let dir = tempdir().unwrap();
        let auth = LocalAuth::open(dir.path()).await.unwrap();
        auth.sign_up("ada@example.com", "secret1").await.unwrap();

        assert!(matches!(
            auth.sign_up("ADA@example.com", "another1").await,
            Err(AuthError::EmailInUse(_))
        ));
        assert!(matches!(
            auth.sign_in("ada@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@example.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_up("bob@example.com", "123").await,
            Err(AuthError::WeakPassword(6))
        ));
    }

    #[tokio::test]
    async fn test_session_survives_reopen() {
        let dir = tempdir().unwrap();
        let session = {
            let auth = LocalAuth::open(dir.path()).await.unwrap();
            auth.sign_up("ada@example.com", "secret1").await.unwrap()
        };

        let reopened = LocalAuth::open(dir.path()).await.unwrap();
        assert_eq!(reopened.current(), Some(session));
    }

    #[tokio::test]
    async fn test_subscribers_see_session_changes() {
        let dir = tempdir().unwrap();
        let auth = LocalAuth::open(dir.path()).await.unwrap();
        let mut rx = auth.subscribe();
        assert_eq!(*rx.borrow(), None);

        let session = auth.sign_up("ada@example.com", "secret1").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(session));

        auth.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), None);
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let dir = tempdir().unwrap();
        let auth = LocalAuth::open(dir.path()).await.unwrap();
        auth.sign_up("ada@example.com", "secret1").await.unwrap();

        auth.send_password_reset("unknown@example.com").await.unwrap();
        auth.send_password_reset("ada@example.com").await.unwrap();

        assert!(!auth.outbox_path("unknown@example.com").unwrap().exists());

        let accounts = auth.read_accounts().await.unwrap();
        let token = accounts["ada@example.com"].reset_token.clone().unwrap();
        let mail = std::fs::read_to_string(auth.outbox_path("ADA@example.com").unwrap()).unwrap();
        assert!(mail.contains(&format!("Token: {}", token)));

        assert!(matches!(
            auth.reset_password("ada@example.com", "bogus", "newsecret").await,
            Err(AuthError::InvalidResetToken)
        ));
        auth.reset_password("ada@example.com", &token, "newsecret").await.unwrap();

        assert!(auth.sign_in("ada@example.com", "secret1").await.is_err());
        assert!(auth.sign_in("ada@example.com", "newsecret").await.is_ok());
        assert!(matches!(
            auth.reset_password("ada@example.com", &token, "again-new").await,
            Err(AuthError::InvalidResetToken)
        ));
    }
}
