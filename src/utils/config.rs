// src/utils/config.rs

use crate::api::{config as api_config, ModelSettings};
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

const LOG_LEVELS: [&str; 5] = ["off", "error", "warn", "info", "debug"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: String,
    pub data_directory: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub base_url: String,
    /// When set, chat goes through this relay instead of calling the API directly.
    pub relay_url: Option<String>,
    pub listen_address: String,
    /// Key used by `serve`; the `OPENAI_API_KEY` environment variable wins.
    pub server_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_directory = dirs::data_dir()
            .map(|d| d.join("codemini"))
            .unwrap_or_else(|| PathBuf::from(".codemini"));
        Self {
            log_level: "off".to_string(),
            data_directory: data_directory.display().to_string(),
            model: api_config::DEFAULT_MODEL.to_string(),
            temperature: api_config::DEFAULT_TEMPERATURE,
            max_tokens: api_config::DEFAULT_MAX_TOKENS,
            base_url: api_config::BASE_URL.to_string(),
            relay_url: None,
            listen_address: "127.0.0.1:3000".to_string(),
            server_api_key: None,
        }
    }
}

impl Config {
    pub fn data_directory(&self) -> &Path {
        Path::new(&self.data_directory)
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf, AppError> {
    let mut path = get_executable_dir()?;
    path.push("config.toml");
    Ok(path)
}

/// Validate config to prevent obviously wrong or missing values.
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "Log level must be one of {}",
            LOG_LEVELS.join(", ")
        )));
    }
    if config.temperature < 0.0 || config.temperature > 2.0 {
        return Err(AppError::InvalidInput(
            "Temperature must be between 0.0 and 2.0".to_string(),
        ));
    }
    if config.max_tokens == 0 {
        return Err(AppError::InvalidInput(
            "Max tokens cannot be zero".to_string(),
        ));
    }
    if config.data_directory.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Data directory cannot be empty".to_string(),
        ));
    }
    for url in std::iter::once(&config.base_url).chain(config.relay_url.iter()) {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::InvalidInput(format!("Not an http(s) URL: {}", url)));
        }
    }
    if config.listen_address.parse::<std::net::SocketAddr>().is_err() {
        return Err(AppError::InvalidInput(format!(
            "Listen address is not host:port: {}",
            config.listen_address
        )));
    }
    Ok(())
}

/// Read config from file, and create a default config if none exists.
pub fn read_config() -> Result<Config, AppError> {
    read_config_from(&get_config_path()?)
}

pub fn read_config_from(config_path: &Path) -> Result<Config, AppError> {
    let config = load_config_from(config_path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Reads the config without validating it, so a bad value can be repaired.
pub fn load_config() -> Result<Config, AppError> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(config_path: &Path) -> Result<Config, AppError> {
    if !config_path.exists() {
        write_config_to(config_path, &Config::default())?;
    }
    let config_str = fs::read_to_string(config_path)?;
    Ok(toml::from_str(&config_str)?)
}

pub fn write_config(config: &Config) -> Result<(), AppError> {
    write_config_to(&get_config_path()?, config)
}

pub fn write_config_to(config_path: &Path, config: &Config) -> Result<(), AppError> {
    let config_str = toml::to_string(config)
        .map_err(|e| AppError::InvalidInput(format!("Failed to serialize config: {}", e)))?;
    fs::write(config_path, config_str)?;
    Ok(())
}

fn get_executable_dir() -> Result<PathBuf, AppError> {
    let exe = env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        AppError::InvalidInput("Failed to get the executable directory".to_string())
    })
}
