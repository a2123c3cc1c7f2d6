use crate::errors::AppError;
use crate::utils::config::{load_config, validate_config, write_config};

/// Handles the config subcommand
pub async fn handle_config_subcommand(
    set_log_level: Option<String>,
    set_data_directory: Option<String>,
    set_relay_url: Option<String>,
    clear_relay_url: bool,
    set_listen_address: Option<String>,
    set_server_api_key: Option<String>,
) -> Result<(), AppError> {
    let mut config = load_config()?;

    if let Some(log_level) = set_log_level {
        config.log_level = log_level.clone();
        println!("Log level set to {}", log_level);
    }

    if let Some(data_directory) = set_data_directory {
        config.data_directory = data_directory.clone();
        println!("Data directory set to {}", data_directory);
    }

    if let Some(relay_url) = set_relay_url {
        config.relay_url = Some(relay_url.clone());
        println!("Relay URL set to {}", relay_url);
    }

    if clear_relay_url {
        config.relay_url = None;
        println!("Relay URL cleared");
    }

    if let Some(listen_address) = set_listen_address {
        config.listen_address = listen_address.clone();
        println!("Listen address set to {}", listen_address);
    }

    if let Some(server_api_key) = set_server_api_key {
        config.server_api_key = Some(server_api_key);
        println!("Server API key set");
    }

    validate_config(&config)?;
    write_config(&config)?;
    Ok(())
}

/// Handles the model-config subcommand
pub async fn handle_model_config_subcommand(
    set_model: Option<String>,
    set_temperature: Option<f32>,
    set_max_tokens: Option<u32>,
    set_base_url: Option<String>,
) -> Result<(), AppError> {
    let mut config = load_config()?;

    if let Some(model) = set_model {
        config.model = model.clone();
        println!("Model set to: {}", model);
    }

    if let Some(temperature) = set_temperature {
        config.temperature = temperature;
        println!("Temperature set to: {}", temperature);
    }

    if let Some(max_tokens) = set_max_tokens {
        config.max_tokens = max_tokens;
        println!("Max tokens set to: {}", max_tokens);
    }

    if let Some(base_url) = set_base_url {
        config.base_url = base_url.clone();
        println!("Base URL set to: {}", base_url);
    }

    validate_config(&config)?;
    write_config(&config)?;
    Ok(())
}
