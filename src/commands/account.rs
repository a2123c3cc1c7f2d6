use super::App;
use crate::auth::AuthProvider;
use crate::errors::AppError;
use crate::storage::documents::DocumentStore;

/// Keys this short are treated as placeholders.
const MIN_API_KEY_LENGTH: usize = 6;

pub async fn handle_signup(app: &App, email: &str, password: &str) -> Result<(), AppError> {
    let session = app.auth.sign_up(email, password).await?;
    app.display
        .print_success(&format!("Account created, logged in as {}", session.email));
    Ok(())
}

pub async fn handle_login(app: &App, email: &str, password: &str) -> Result<(), AppError> {
    let session = app.auth.sign_in(email, password).await?;
    app.display
        .print_success(&format!("Logged in as {}", session.email));
    Ok(())
}

pub async fn handle_logout(app: &App) -> Result<(), AppError> {
    app.auth.sign_out().await?;
    app.display.print_success("Logged out");
    Ok(())
}

pub async fn handle_reset_password(
    app: &App,
    email: &str,
    token: Option<String>,
    new_password: Option<String>,
) -> Result<(), AppError> {
    match (token, new_password) {
        (Some(token), Some(new_password)) => {
            app.auth.reset_password(email, &token, &new_password).await?;
            app.display.print_success("Password updated, you can log in now");
        }
        _ => {
            app.auth.send_password_reset(email).await?;
            app.display.print_success(&format!(
                "If an account exists for that address, the reset email was written to {}",
                app.auth.outbox_path(email)?.display()
            ));
        }
    }
    Ok(())
}

pub async fn handle_set_token(app: &App, api_key: &str) -> Result<(), AppError> {
    let session = app.require_session()?;
    app.documents.set_api_key(&session.uid, api_key.trim()).await?;
    app.display.print_success("Token saved successfully!");
    Ok(())
}

pub async fn handle_dashboard(app: &App, dismiss: bool) -> Result<(), AppError> {
    let session = app.require_session()?;
    let mut draft = app.drafts.load().await?;

    if dismiss && !draft.api_key_notice_dismissed {
        draft.api_key_notice_dismissed = true;
        app.drafts.save(&draft).await?;
    }

    let api_key = app.documents.get_api_key(&session.uid).await?;
    let show_notice = needs_api_key_notice(api_key.as_deref(), draft.api_key_notice_dismissed);

    app.display.print_header();
    app.display.print_dashboard(&session, show_notice);
    Ok(())
}

fn needs_api_key_notice(api_key: Option<&str>, dismissed: bool) -> bool {
    let configured = api_key.is_some_and(|key| key.chars().count() >= MIN_API_KEY_LENGTH);
    !configured && !dismissed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::Config;
    use tempfile::tempdir;

    async fn app_in(dir: &std::path::Path) -> App {
        let config = Config {
            data_directory: dir.display().to_string(),
            ..Config::default()
        };
        App::new(config).await.unwrap()
    }

    #[test]
    fn test_notice_for_missing_or_short_key() {
        assert!(needs_api_key_notice(None, false));
        assert!(needs_api_key_notice(Some("sk-12"), false));
        assert!(!needs_api_key_notice(Some("sk-123"), false));
        assert!(!needs_api_key_notice(None, true));
    }

    #[tokio::test]
    async fn test_set_token_requires_login() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path()).await;

        assert!(matches!(
            handle_set_token(&app, "sk-123456").await,
            Err(AppError::NotLoggedIn)
        ));
        assert!(matches!(
            handle_dashboard(&app, false).await,
            Err(AppError::NotLoggedIn)
        ));
    }

    #[tokio::test]
    async fn test_set_token_stores_key_for_user() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path()).await;
        handle_signup(&app, "ada@example.com", "secret1").await.unwrap();

        handle_set_token(&app, "  sk-123456 ").await.unwrap();

        let uid = app.require_session().unwrap().uid;
        assert_eq!(
            app.documents.get_api_key(&uid).await.unwrap().as_deref(),
            Some("sk-123456")
        );
    }

    #[tokio::test]
    async fn test_app_session_follows_login_and_logout() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path()).await;
        assert!(matches!(app.require_session(), Err(AppError::NotLoggedIn)));

        handle_signup(&app, "ada@example.com", "secret1").await.unwrap();
        assert_eq!(app.require_session().unwrap().email, "ada@example.com");

        handle_logout(&app).await.unwrap();
        assert!(matches!(app.require_session(), Err(AppError::NotLoggedIn)));

        handle_login(&app, "ada@example.com", "secret1").await.unwrap();
        assert_eq!(app.require_session().unwrap().email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_reset_password_through_outbox() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path()).await;
        handle_signup(&app, "ada@example.com", "secret1").await.unwrap();
        handle_logout(&app).await.unwrap();

        handle_reset_password(&app, "ada@example.com", None, None).await.unwrap();

        let mail = std::fs::read_to_string(app.auth.outbox_path("ada@example.com").unwrap()).unwrap();
        let token = mail
            .lines()
            .find_map(|line| line.strip_prefix("Token: "))
            .unwrap()
            .to_string();

        handle_reset_password(&app, "ada@example.com", Some(token), Some("newsecret".to_string()))
            .await
            .unwrap();

        assert!(matches!(
            handle_login(&app, "ada@example.com", "secret1").await,
            Err(AppError::AuthError(_))
        ));
        handle_login(&app, "ada@example.com", "newsecret").await.unwrap();
    }

    #[tokio::test]
    async fn test_dismiss_is_remembered() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path()).await;
        handle_signup(&app, "ada@example.com", "secret1").await.unwrap();

        handle_dashboard(&app, true).await.unwrap();
        assert!(app.drafts.load().await.unwrap().api_key_notice_dismissed);
    }
}
