use crate::auth::Session;
use crate::models::{ChatMessage, Role};
use crate::store::{language_for, FileStore, MergeSummary};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::time::Duration;

const API_KEYS_URL: &str = "https://platform.openai.com/api-keys";

/// Manages CLI display and output formatting.
pub struct CliDisplayManager {
    spinner: Option<ProgressBar>,
}

impl CliDisplayManager {
    /// Creates a new `CliDisplayManager`.
    pub fn new() -> Self {
        CliDisplayManager { spinner: None }
    }

    /// Prints the application header.
    pub fn print_header(&self) {
        println!("\n{}", "╭──────────────────────╮".bright_magenta());
        println!(
            "{}",
            format!("│  ✦ CodeMini v{:<7} │", env!("CARGO_PKG_VERSION"))
                .bright_magenta()
                .bold()
        );
        println!("{}\n", "╰──────────────────────╯".bright_magenta());
    }

    pub fn print_dashboard(&self, session: &Session, show_notice: bool) {
        if show_notice {
            self.print_api_key_notice();
        }
        self.print_section("🏠", "Welcome to CodeMini", "");
        self.print_info("Upload files with `codemini upload <paths>`");
        self.print_info("Ask for changes with `codemini chat \"<prompt>\"`");
        self.print_info("Set your token with `codemini set-token <key>`");
        self.print_info("Reset your password with `codemini reset-password -e <email>`");
        println!();
        println!(
            "{}",
            format!("Logged in as {}", session.email).bright_white().dimmed()
        );
    }

    fn print_api_key_notice(&self) {
        println!(
            "{} {}",
            "!".bright_yellow().bold(),
            "You haven't configured an OpenAI API token yet.".bright_yellow()
        );
        self.print_info("Add one with `codemini set-token <key>`");
        self.print_info(&format!("You can get your key here: {}", API_KEYS_URL));
        self.print_info("Hide this notice with `codemini dashboard --dismiss`");
        println!();
    }

    /// Prints the file explorer listing.
    pub fn print_files(&self, files: &FileStore, filter: Option<&str>) {
        let title = match filter {
            Some(f) if !f.trim().is_empty() => format!("Files matching '{}'", f),
            _ => "Files".to_string(),
        };
        self.print_section("📁", &title, &format!("{} file(s)", files.len()));
        for (filename, code) in files.iter() {
            println!(
                "   {} {} {}",
                "•".bright_white(),
                filename.bright_cyan(),
                format!("({} lines)", code.lines().count()).dimmed()
            );
        }
    }

    pub fn print_file(&self, filename: &str, code: &str) {
        self.print_section("📄", filename, language_for(filename));
        println!("{}", code);
    }

    pub fn print_history(&self, messages: &[ChatMessage]) {
        if messages.is_empty() {
            self.print_info("No messages yet");
            return;
        }
        for message in messages {
            self.print_message(message);
        }
    }

    pub fn print_message(&self, message: &ChatMessage) {
        match message.role {
            Role::User => println!("{} {}", "you".bright_green().bold(), message.content),
            Role::Assistant => println!("{} {}", "assistant".bright_magenta().bold(), message.content),
        }
    }

    /// Prints what an applied assistant reply changed.
    pub fn print_changes(&self, summary: &MergeSummary) {
        if summary.is_empty() {
            self.print_info("No files changed");
            return;
        }
        self.print_section("💾", "Changed files", "");
        for change in &summary.changes {
            match &change.before {
                None => println!(
                    "   {} {} {}",
                    "+".bright_green(),
                    change.filename.bright_cyan(),
                    format!("(new, {} lines)", change.after.lines().count()).dimmed()
                ),
                Some(before) => {
                    let (inserted, deleted) = line_delta(before, &change.after);
                    println!(
                        "   {} {} {} {}",
                        "~".bright_yellow(),
                        change.filename.bright_cyan(),
                        format!("+{}", inserted).green(),
                        format!("-{}", deleted).red()
                    );
                }
            }
        }
    }

    /// Prints an error the user should see without aborting the command.
    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", "✗".bright_red().bold(), message.bright_red());
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", "✓".bright_green().bold(), message);
    }

    /// Prints the application footer.
    pub fn print_footer(&self, duration: Duration) {
        println!();
        println!(
            "{}",
            format!("⚡ Completed in {:.2?}", duration)
                .bright_white()
                .dimmed(),
        );
        println!();
    }

    /// Starts a spinner while waiting for the assistant.
    pub fn start_spinner(&mut self) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(&format!(
            "   {} {{spinner}} {}",
            "→".bright_white(),
            "Waiting for the assistant".italic().bright_white()
        )) {
            spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Stops the spinner.
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Helper function to print a section header.
    fn print_section(&self, icon: &str, title: &str, description: &str) {
        println!("{} {}", icon.bright_yellow(), title.bright_cyan().bold());
        if !description.is_empty() {
            println!(
                "   {} {}",
                "→".bright_white(),
                description.italic().bright_white()
            );
        }
    }

    /// Helper function to print an informational message.
    pub fn print_info(&self, message: &str) {
        println!(
            "   {} {}",
            "→".bright_white(),
            message.italic().bright_white()
        );
    }
}

/// Counts inserted and deleted lines between two versions of a file.
pub fn line_delta(before: &str, after: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(before, after);
    diff.iter_all_changes()
        .fold((0, 0), |(ins, del), change| match change.tag() {
            ChangeTag::Insert => (ins + 1, del),
            ChangeTag::Delete => (ins, del + 1),
            ChangeTag::Equal => (ins, del),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_delta_counts_changed_lines() {
        assert_eq!(line_delta("a\nb\nc\n", "a\nB\nc\nd\n"), (2, 1));
        assert_eq!(line_delta("same\n", "same\n"), (0, 0));
        assert_eq!(line_delta("", "x\ny\n"), (2, 0));
    }
}
