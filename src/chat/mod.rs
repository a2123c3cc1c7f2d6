//! Chat turns against the completion service.
//!
//! A turn embeds the current files in the prompt, waits for one reply, and
//! parses it as an [`AssistantReply`]. Requesting and recording are separate
//! steps, so the reply can be applied to a session reloaded after the wait.
//! Only a reply that parses cleanly touches the file store; every failure is
//! recorded in the history while the files stay as they were.

use crate::api::{errors::CompletionError, CompletionService};
use crate::models::{assistant_reply::AssistantReply, ChatMessage};
use crate::store::{FileStore, MergeSummary};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplyParseError {
    #[error("the assistant sent an empty reply")]
    Empty,
    #[error("the assistant reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("the assistant returned a file without a name")]
    MissingFilename,
}

#[derive(Error, Debug)]
pub enum TurnError {
    #[error("completion request failed: {0}")]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Parse(#[from] ReplyParseError),
}

/// Result of a turn whose reply was applied.
#[derive(Debug)]
pub struct TurnReport {
    pub message: String,
    pub summary: MergeSummary,
}

/// The files and chat history of one editing session.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    #[serde(default)]
    pub files: FileStore,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(files: FileStore, messages: Vec<ChatMessage>) -> Self {
        Self { files, messages }
    }

    /// Asks the service about `prompt` with the current files embedded. The
    /// session itself is left unchanged.
    pub async fn request(
        &self,
        service: &dyn CompletionService,
        prompt: &str,
    ) -> Result<AssistantReply, TurnError> {
        let combined = build_prompt(prompt, &self.files);
        let raw = service.complete(&combined).await?;
        Ok(parse_reply(&raw)?)
    }

    /// Appends a finished turn to the history. A reply is merged into the
    /// files; a failure is recorded as an `Error:` message and leaves them as
    /// they were.
    pub fn record_turn(
        &mut self,
        prompt: &str,
        outcome: Result<AssistantReply, TurnError>,
    ) -> Result<TurnReport, TurnError> {
        self.messages.push(ChatMessage::user(prompt));

        match outcome {
            Ok(reply) => {
                self.messages.push(ChatMessage::assistant(reply.message.clone()));
                let summary = self.files.merge(reply.files);
                log::info!(
                    "Assistant reply applied: {} added, {} updated",
                    summary.added().count(),
                    summary.updated().count()
                );
                Ok(TurnReport {
                    message: reply.message,
                    summary,
                })
            }
            Err(e) => {
                log::error!("Chat turn failed: {}", e);
                self.messages
                    .push(ChatMessage::assistant(format!("Error: {}", e)));
                Err(e)
            }
        }
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }
}

/// Combines the user prompt with the name and content of every file.
pub fn build_prompt(prompt: &str, files: &FileStore) -> String {
    let mut combined = String::from(prompt);
    if files.is_empty() {
        return combined;
    }
    combined.push_str("\n\nCurrent files:\n");
    for (filename, code) in files.iter() {
        combined.push_str(&format!("<file name=\"{}\">\n{}\n</file>\n", filename, code));
    }
    combined
}

/// Parses a raw assistant reply into its message and file edits.
///
/// Surrounding whitespace and one enclosing Markdown code fence are tolerated.
pub fn parse_reply(raw: &str) -> Result<AssistantReply, ReplyParseError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(ReplyParseError::Empty);
    }

    let reply: AssistantReply = serde_json::from_str(body)?;
    if reply.files.iter().any(|f| f.filename.trim().is_empty()) {
        return Err(ReplyParseError::MissingFilename);
    }
    Ok(reply)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    match rest.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedService {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(text: &str) -> Self {
            Self {
                reply: Err(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(CompletionError::ApiError)
        }
    }

    async fn send(
        session: &mut ChatSession,
        service: &ScriptedService,
        prompt: &str,
    ) -> Result<TurnReport, TurnError> {
        let outcome = session.request(service, prompt).await;
        session.record_turn(prompt, outcome)
    }

    fn session_with(pairs: &[(&str, &str)]) -> ChatSession {
        let records: Vec<FileRecord> = pairs.iter().map(|(f, c)| FileRecord::new(*f, *c)).collect();
        ChatSession::new(records.into(), Vec::new())
    }

    #[tokio::test]
    async fn test_reply_overwrites_existing_file() {
        let mut session = session_with(&[("a.py", "1")]);
        let service =
            ScriptedService::replying(r#"{"message":"done","files":[{"filename":"a.py","code":"2"}]}"#);

        let report = send(&mut session, &service, "bump it").await.unwrap();

        assert_eq!(report.message, "done");
        assert_eq!(session.files.to_records(), vec![FileRecord::new("a.py", "2")]);
        assert_eq!(
            session.messages,
            vec![ChatMessage::user("bump it"), ChatMessage::assistant("done")]
        );
    }

    #[tokio::test]
    async fn test_reply_adds_new_file() {
        let mut session = session_with(&[("a.py", "1")]);
        let service =
            ScriptedService::replying(r#"{"message":"added","files":[{"filename":"b.py","code":"x"}]}"#);

        let report = send(&mut session, &service, "add b").await.unwrap();

        assert_eq!(
            session.files.to_records(),
            vec![FileRecord::new("a.py", "1"), FileRecord::new("b.py", "x")]
        );
        assert_eq!(report.summary.added().collect::<Vec<_>>(), vec!["b.py"]);
    }

    #[tokio::test]
    async fn test_non_json_reply_leaves_files_untouched() {
        let mut session = session_with(&[("a.py", "1")]);
        let before = session.files.clone();
        let service = ScriptedService::replying("Sure! Here is your code: print(1)");

        let err = send(&mut session, &service, "rewrite").await.unwrap_err();

        assert!(matches!(err, TurnError::Parse(ReplyParseError::InvalidJson(_))));
        assert_eq!(session.files, before);
        assert_eq!(session.messages.len(), 2);
        assert!(session.messages[1].content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_files_untouched() {
        let mut session = session_with(&[("a.py", "1")]);
        let before = session.files.clone();
        let service = ScriptedService::failing("connection reset");

        let err = send(&mut session, &service, "rewrite").await.unwrap_err();

        assert!(matches!(err, TurnError::Completion(_)));
        assert_eq!(session.files, before);
        assert!(session.messages[1].content.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_prompt_embeds_every_file() {
        let mut session = session_with(&[("a.py", "print(1)"), ("lib/b.ts", "export {}")]);
        let service = ScriptedService::replying(r#"{"message":"ok","files":[]}"#);

        send(&mut session, &service, "explain").await.unwrap();

        let prompts = service.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("explain"));
        assert!(prompts[0].contains("<file name=\"a.py\">\nprint(1)\n</file>"));
        assert!(prompts[0].contains("<file name=\"lib/b.ts\">\nexport {}\n</file>"));
    }

    #[tokio::test]
    async fn test_reply_lands_on_reloaded_session() {
        let snapshot = session_with(&[("a.py", "1")]);
        let service =
            ScriptedService::replying(r#"{"message":"ok","files":[{"filename":"c.py","code":"3"}]}"#);
        let outcome = snapshot.request(&service, "add c").await;

        let mut latest = session_with(&[("a.py", "1"), ("b.py", "2")]);
        latest.messages.push(ChatMessage::user("add b"));
        latest.record_turn("add c", outcome).unwrap();

        assert_eq!(latest.files.filenames().collect::<Vec<_>>(), vec!["a.py", "b.py", "c.py"]);
        assert_eq!(
            latest.messages,
            vec![
                ChatMessage::user("add b"),
                ChatMessage::user("add c"),
                ChatMessage::assistant("ok")
            ]
        );
        assert!(snapshot.messages.is_empty());
    }

    #[test]
    fn test_parse_reply_tolerates_code_fence() {
        let raw = "```json\n{\"message\":\"hi\",\"files\":[{\"filename\":\"a.py\",\"code\":\"x\"}]}\n```";
        let reply = parse_reply(raw).unwrap();
        assert_eq!(reply.message, "hi");
        assert_eq!(reply.files, vec![FileRecord::new("a.py", "x")]);
    }

    #[test]
    fn test_parse_reply_without_files() {
        let reply = parse_reply(r#"  {"message":"nothing to change"}  "#).unwrap();
        assert!(reply.files.is_empty());
    }

    #[test]
    fn test_parse_reply_rejects_bad_shapes() {
        assert!(matches!(parse_reply("   "), Err(ReplyParseError::Empty)));
        assert!(matches!(
            parse_reply(r#"{"files":[]}"#),
            Err(ReplyParseError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"message":"x","files":[{"filename":" ","code":""}]}"#),
            Err(ReplyParseError::MissingFilename)
        ));
    }

    #[test]
    fn test_clear_messages_keeps_files() {
        let mut session = session_with(&[("a.py", "1")]);
        session.messages.push(ChatMessage::user("hi"));
        session.clear_messages();
        assert!(session.messages.is_empty());
        assert_eq!(session.files.len(), 1);
    }
}
