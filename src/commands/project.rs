use super::App;
use crate::chat::ChatSession;
use crate::cli::args::ProjectAction;
use crate::errors::AppError;
use crate::models::project::Project;
use crate::storage::documents::DocumentStore;

pub async fn handle_project(app: &App, action: ProjectAction) -> Result<(), AppError> {
    let session = app.require_session()?;

    match action {
        ProjectAction::Save { id } => {
            let draft = app.drafts.load().await?;
            let files = draft.session.files.to_records();
            let messages = draft.session.messages;
            let project = match id {
                Some(id) => Project::with_id(id, files, messages),
                None => Project::new(files, messages),
            };
            app.documents.save_project(&session.uid, &project).await?;
            app.display
                .print_success(&format!("Saved project {}", project.id));
        }
        ProjectAction::List => {
            let ids = app.documents.list_projects(&session.uid).await?;
            if ids.is_empty() {
                app.display.print_info("No saved projects");
            }
            for id in ids {
                app.display.print_info(&id);
            }
        }
        ProjectAction::Open { id } => {
            let project = app.documents.load_project(&session.uid, &id).await?;
            let mut draft = app.drafts.load().await?;
            draft.session = ChatSession::new(project.files.into(), project.messages);
            app.drafts.save(&draft).await?;
            app.display.print_success(&format!("Opened project {}", id));
        }
        ProjectAction::Delete { id } => {
            app.documents.delete_project(&session.uid, &id).await?;
            app.display.print_success(&format!("Deleted project {}", id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthProvider;
    use crate::models::{ChatMessage, FileRecord};
    use crate::utils::config::Config;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_then_open_restores_draft() {
        let dir = tempdir().unwrap();
        let config = Config {
            data_directory: dir.path().display().to_string(),
            ..Config::default()
        };
        let app = App::new(config).await.unwrap();

        assert!(matches!(
            handle_project(&app, ProjectAction::List).await,
            Err(AppError::NotLoggedIn)
        ));

        let session = app.auth.sign_up("ada@example.com", "secret1").await.unwrap();
        let mut draft = app.drafts.load().await.unwrap();
        draft.session.files.merge(vec![FileRecord::new("a.py", "1")]);
        draft.session.messages.push(ChatMessage::user("hi"));
        app.drafts.save(&draft).await.unwrap();

        handle_project(&app, ProjectAction::Save { id: Some("p1".to_string()) })
            .await
            .unwrap();

        let mut scratch = app.drafts.load().await.unwrap();
        scratch.session = ChatSession::default();
        app.drafts.save(&scratch).await.unwrap();

        handle_project(&app, ProjectAction::Open { id: "p1".to_string() })
            .await
            .unwrap();
        assert_eq!(app.drafts.load().await.unwrap().session, draft.session);

        handle_project(&app, ProjectAction::Delete { id: "p1".to_string() })
            .await
            .unwrap();
        assert!(app.documents.list_projects(&session.uid).await.unwrap().is_empty());
    }
}
