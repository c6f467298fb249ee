// ecom-insights/crates/ecom-insights/src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

/// Groq's OpenAI-compatible chat completions endpoint.
pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_API_PORT: u16 = 33400;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub data_dir: PathBuf,
    pub api_host: String,
    pub api_port: u16,
    pub completions_url: String,
    pub chat_model: String,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("ecommerce.db"),
            data_dir: PathBuf::from("data"),
            api_host: "0.0.0.0".to_string(),
            api_port: DEFAULT_API_PORT,
            completions_url: DEFAULT_COMPLETIONS_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        let defaults = Self::default();

        let api_port = match env::var("API_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("API_PORT must be a port number, got '{}'", raw))?,
            Err(_) => defaults.api_port,
        };

        let api_key = env::var("GROQ_API_KEY").ok().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("GROQ_API_KEY is not set; chat requests will be rejected upstream");
        }

        Ok(Self {
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port,
            completions_url: env::var("COMPLETIONS_URL").unwrap_or(defaults.completions_url),
            chat_model: env::var("CHAT_MODEL").unwrap_or(defaults.chat_model),
            api_key,
        })
    }

    pub fn print_config(&self) {
        info!("Configuration:");
        info!("  Database:        {}", self.database_path.display());
        info!("  Data directory:  {}", self.data_dir.display());
        info!("  API address:     {}:{}", self.api_host, self.api_port);
        info!("  Completions URL: {}", self.completions_url);
        info!("  Chat model:      {}", self.chat_model);
        info!(
            "  API key:         {}",
            if self.api_key.is_some() { "set" } else { "missing" }
        );
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api_host, self.api_port)
            .parse()
            .with_context(|| format!("Invalid API address {}:{}", self.api_host, self.api_port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            database_path: PathBuf::from("/tmp/test.db"),
            data_dir: PathBuf::from("/tmp/data"),
            api_host: "127.0.0.1".to_string(),
            api_port: 8000,
            completions_url: "http://127.0.0.1:9999/v1/chat/completions".to_string(),
            chat_model: "test-model".to_string(),
            api_key: Some("secret".to_string()),
        }
    }

    #[test]
    fn test_defaults_match_stock_deployment() {
        let config = Config::default();

        assert_eq!(config.api_port, 33400);
        assert_eq!(config.database_path, PathBuf::from("ecommerce.db"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.chat_model, "llama3-8b-8192");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_api_addr_parsing() {
        let config = create_test_config();
        let addr = config.api_addr().unwrap();

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_api_addr_with_zero_address() {
        let mut config = create_test_config();
        config.api_host = "0.0.0.0".to_string();
        config.api_port = 5000;

        let addr = config.api_addr().unwrap();
        assert_eq!(addr.port(), 5000);
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
    }

    #[test]
    fn test_api_addr_rejects_hostname_garbage() {
        let mut config = create_test_config();
        config.api_host = "not a host".to_string();

        assert!(config.api_addr().is_err());
    }
}
