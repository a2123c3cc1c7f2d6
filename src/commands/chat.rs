use super::App;
use crate::api::CompletionService;
use crate::chat::{TurnError, TurnReport};
use crate::errors::AppError;
use crate::storage::draft::{Draft, DraftCache};
use std::time::Instant;

/// Sends one prompt and applies the reply.
///
/// A failed turn is reported and recorded in the history but is not an error
/// of the command: the files stay as they were and the draft is still saved.
pub async fn handle_chat(app: &mut App, prompt: &str) -> Result<(), AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::InvalidInput("Prompt cannot be empty".to_string()));
    }

    let start_time = Instant::now();
    let service = app.completion_service().await?;

    app.display.start_spinner();
    let turn = run_turn(&app.drafts, service.as_ref(), prompt).await;
    app.display.stop_spinner();
    let (result, draft) = turn?;

    match result {
        Ok(report) => {
            if let Some(reply) = draft.session.messages.last() {
                app.display.print_message(reply);
            }
            app.display.print_changes(&report.summary);
        }
        Err(e) => app.display.print_error(&e.to_string()),
    }
    app.display.print_footer(start_time.elapsed());
    Ok(())
}

/// Requests against a snapshot of the draft, then records the turn on a fresh
/// load. Anything another run saved while the reply was pending is kept.
async fn run_turn(
    drafts: &DraftCache,
    service: &dyn CompletionService,
    prompt: &str,
) -> Result<(Result<TurnReport, TurnError>, Draft), AppError> {
    let snapshot = drafts.load().await?;
    let outcome = snapshot.session.request(service, prompt).await;

    let mut draft = drafts.load().await?;
    let result = draft.session.record_turn(prompt, outcome);
    drafts.save(&draft).await?;
    Ok((result, draft))
}

pub async fn handle_history(app: &App) -> Result<(), AppError> {
    let draft = app.drafts.load().await?;
    app.display.print_history(&draft.session.messages);
    Ok(())
}

pub async fn handle_clear(app: &App) -> Result<(), AppError> {
    let mut draft = app.drafts.load().await?;
    draft.session.clear_messages();
    app.drafts.save(&draft).await?;
    app.display.print_success("Chat history cleared");
    Ok(())
}
