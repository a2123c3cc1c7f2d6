use super::App;
use crate::errors::AppError;
use crate::file_processing::{archive, reader};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

pub async fn handle_upload(
    app: &App,
    paths: &[PathBuf],
    ignore: &[PathBuf],
) -> Result<(), AppError> {
    let upload = reader::upload_paths(paths, ignore).await?;
    let mut draft = app.drafts.load().await?;

    let summary = draft.session.files.merge(upload.files);
    if let Some(messages) = upload.messages {
        app.display
            .print_info(&format!("Restored {} chat message(s)", messages.len()));
        draft.session.messages = messages;
    }
    for path in &upload.skipped {
        app.display
            .print_info(&format!("Skipped {}", path.display()));
    }
    app.drafts.save(&draft).await?;

    app.display.print_changes(&summary);
    Ok(())
}

pub async fn handle_download(
    app: &App,
    filter: Option<&str>,
    output: &Path,
) -> Result<(), AppError> {
    let draft = app.drafts.load().await?;
    let files = draft.session.files.filter(filter.unwrap_or_default());

    let path = archive::write_archive(&files, &draft.session.messages, output).await?;
    app.display.print_success(&format!(
        "Downloaded {} file(s) to {}",
        files.len(),
        path.display()
    ));
    Ok(())
}

pub async fn handle_files(app: &App, filter: Option<&str>) -> Result<(), AppError> {
    let draft = app.drafts.load().await?;
    let files = draft.session.files.filter(filter.unwrap_or_default());
    app.display.print_files(&files, filter);
    Ok(())
}

pub async fn handle_show(app: &App, filename: &str) -> Result<(), AppError> {
    let draft = app.drafts.load().await?;
    let code = draft
        .session
        .files
        .get(filename)
        .ok_or_else(|| AppError::FileNotFound(filename.to_string()))?;
    app.display.print_file(filename, code);
    Ok(())
}

pub async fn handle_edit(app: &App, filename: &str, from: Option<&Path>) -> Result<(), AppError> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(AppError::InvalidInput("Filename cannot be empty".to_string()));
    }

    let code = match from {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut code = String::new();
            tokio::io::stdin().read_to_string(&mut code).await?;
            code
        }
    };

    let mut draft = app.drafts.load().await?;
    let created = draft.session.files.upsert(filename, code).is_none();
    app.drafts.save(&draft).await?;

    if created {
        app.display.print_success(&format!("Created {}", filename));
    } else {
        app.display.print_success(&format!("Saved {}", filename));
    }
    Ok(())
}

pub async fn handle_remove(app: &App, filename: &str) -> Result<(), AppError> {
    let mut draft = app.drafts.load().await?;
    draft
        .session
        .files
        .remove(filename)
        .ok_or_else(|| AppError::FileNotFound(filename.to_string()))?;
    app.drafts.save(&draft).await?;
    app.display.print_success(&format!("Deleted {}", filename));
    Ok(())
}
