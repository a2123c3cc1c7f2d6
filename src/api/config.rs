// src/api/config.rs

/// Base URL for the OpenAI API.
pub const BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub const DEFAULT_TEMPERATURE: f32 = 1.0;

pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// System prompt for the code assistant.
pub const CODE_ASSISTANT_SYSTEM_PROMPT: &str = "Produce JSON. Add, or edit the files (default python) based on user prompts, only return the files you have modified. in the format of: {\"message\":\"your message\",\"files\": [{\"filename\": \"filepath1\", \"code\": \"code1\"},{\"filename\": \"filepath2\", \"code\": \"code2\"}]}";

/// Error body returned by the relay when the upstream call fails.
pub const RELAY_ERROR_MESSAGE: &str = "Error communicating with OpenAI";
