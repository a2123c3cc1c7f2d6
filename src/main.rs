mod api;
mod auth;
mod chat;
mod cli;
mod commands;
mod errors;
mod file_processing;
mod models;
mod server;
mod storage;
mod store;
mod utils;

use crate::utils::logger;
use clap::Parser;
use cli::args::{Args, Commands};
use commands::{account, chat as chat_commands, files, project, serve, settings, App};
use errors::AppError;
use utils::config::read_config;

/// The main entry point of the application
#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Config subcommands load the file unvalidated so an invalid value can be fixed.
    match args.command {
        Commands::Config {
            set_log_level,
            set_data_directory,
            set_relay_url,
            clear_relay_url,
            set_listen_address,
            set_server_api_key,
        } => {
            return settings::handle_config_subcommand(
                set_log_level,
                set_data_directory,
                set_relay_url,
                clear_relay_url,
                set_listen_address,
                set_server_api_key,
            )
            .await;
        }
        Commands::ModelConfig {
            set_model,
            set_temperature,
            set_max_tokens,
            set_base_url,
        } => {
            return settings::handle_model_config_subcommand(
                set_model,
                set_temperature,
                set_max_tokens,
                set_base_url,
            )
            .await;
        }
        _ => {}
    }

    let config = read_config()?;
    logger::setup_logger(&config);
    log::debug!("Using data directory {}", config.data_directory);

    if let Commands::Serve = args.command {
        return serve::handle_serve(&config).await;
    }

    let mut app = App::new(config).await?;
    run_command(&mut app, args.command).await
}

async fn run_command(app: &mut App, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Signup { email, password } => account::handle_signup(app, &email, &password).await,
        Commands::Login { email, password } => account::handle_login(app, &email, &password).await,
        Commands::Logout => account::handle_logout(app).await,
        Commands::ResetPassword {
            email,
            token,
            new_password,
        } => account::handle_reset_password(app, &email, token, new_password).await,
        Commands::SetToken { api_key } => account::handle_set_token(app, &api_key).await,
        Commands::Dashboard { dismiss } => account::handle_dashboard(app, dismiss).await,
        Commands::Upload { paths, ignore } => files::handle_upload(app, &paths, &ignore).await,
        Commands::Download { filter, output } => {
            files::handle_download(app, filter.as_deref(), &output).await
        }
        Commands::Files { filter } => files::handle_files(app, filter.as_deref()).await,
        Commands::Show { filename } => files::handle_show(app, &filename).await,
        Commands::Edit { filename, from } => files::handle_edit(app, &filename, from.as_deref()).await,
        Commands::Rm { filename } => files::handle_remove(app, &filename).await,
        Commands::Chat { prompt } => chat_commands::handle_chat(app, &prompt).await,
        Commands::History => chat_commands::handle_history(app).await,
        Commands::Clear => chat_commands::handle_clear(app).await,
        Commands::Project { action } => project::handle_project(app, action).await,
        Commands::Serve | Commands::Config { .. } | Commands::ModelConfig { .. } => Ok(()),
    }
}
