use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the codemini application.
#[derive(Parser, Debug, PartialEq, Clone)]
#[command(version, about = "A code editor with a chat assistant that edits your files", long_about = None)]
pub struct Args {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for the codemini application.
#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum Commands {
    /// Create an account and sign in.
    Signup {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Sign in to an existing account.
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Sign out.
    Logout,

    /// Request a password reset, or complete one with the emailed token.
    ResetPassword {
        #[arg(short, long)]
        email: String,

        /// Token from the reset email.
        #[arg(long, requires = "new_password")]
        token: Option<String>,

        #[arg(long, requires = "token")]
        new_password: Option<String>,
    },

    /// Store the OpenAI API key for the signed-in account.
    SetToken {
        api_key: String,
    },

    /// Show the account overview.
    Dashboard {
        /// Stop showing the missing API key notice.
        #[arg(long)]
        dismiss: bool,
    },

    /// Upload files, folders or downloaded archives into the project.
    Upload {
        /// Paths to files, folders or .zip archives.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Paths to files or directories to ignore.
        #[arg(short, long, num_args = 1.., value_delimiter = '&')]
        ignore: Vec<PathBuf>,
    },

    /// Download the project and chat history as a zip archive.
    Download {
        /// Only include files ending with one of these suffixes (e.g. ".js,.ts").
        #[arg(short, long)]
        filter: Option<String>,

        /// Directory to write the archive to.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// List the project files.
    Files {
        /// Only list files ending with one of these suffixes (e.g. ".js,.ts").
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print a file.
    Show {
        filename: String,
    },

    /// Replace a file's content, creating it if needed.
    Edit {
        filename: String,

        /// Read the new content from this path instead of stdin.
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Delete a file from the project.
    Rm {
        filename: String,
    },

    /// Ask the assistant to change the project.
    Chat {
        prompt: String,
    },

    /// Print the chat history.
    History,

    /// Clear the chat history.
    Clear,

    /// Manage saved projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Run the relay that forwards chat messages to OpenAI.
    Serve,

    /// Manage configuration options.
    Config {
        /// Set the log level (off, error, warn, info, debug).
        #[arg(long)]
        set_log_level: Option<String>,

        /// Set the directory holding the draft, accounts and projects.
        #[arg(long)]
        set_data_directory: Option<String>,

        /// Send chat through this relay URL.
        #[arg(long, conflicts_with = "clear_relay_url")]
        set_relay_url: Option<String>,

        /// Call the API directly again.
        #[arg(long)]
        clear_relay_url: bool,

        /// Set the address `serve` listens on.
        #[arg(long)]
        set_listen_address: Option<String>,

        /// Set the API key used by `serve`.
        #[arg(long)]
        set_server_api_key: Option<String>,
    },

    /// Manage model configuration options.
    ModelConfig {
        #[arg(long)]
        set_model: Option<String>,

        /// Set the temperature for the AI.
        #[arg(long)]
        set_temperature: Option<f32>,

        #[arg(long)]
        set_max_tokens: Option<u32>,

        /// Set the base URL of the chat completions API.
        #[arg(long)]
        set_base_url: Option<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum ProjectAction {
    /// Save the open project, overwriting it when the id exists.
    Save {
        #[arg(long)]
        id: Option<String>,
    },

    /// List saved projects.
    List,

    /// Replace the open project with a saved one.
    Open {
        id: String,
    },

    /// Delete a saved project.
    Delete {
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_with_ignores() {
        let args = Args::parse_from(["codemini", "upload", "proj", "notes.md", "-i", "proj/target&proj/.venv"]);
        assert_eq!(
            args.command,
            Commands::Upload {
                paths: vec![PathBuf::from("proj"), PathBuf::from("notes.md")],
                ignore: vec![PathBuf::from("proj/target"), PathBuf::from("proj/.venv")],
            }
        );
    }

    #[test]
    fn test_parse_project_save() {
        let args = Args::parse_from(["codemini", "project", "save", "--id", "p1"]);
        assert_eq!(
            args.command,
            Commands::Project {
                action: ProjectAction::Save {
                    id: Some("p1".to_string())
                }
            }
        );
    }

    #[test]
    fn test_reset_token_requires_new_password() {
        let result = Args::try_parse_from(["codemini", "reset-password", "-e", "a@b.co", "--token", "t"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_relay_flags_conflict() {
        let result = Args::try_parse_from([
            "codemini",
            "config",
            "--set-relay-url",
            "http://x",
            "--clear-relay-url",
        ]);
        assert!(result.is_err());
    }
}
