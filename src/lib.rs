//! Medora healthcare portal core library.
//!
//! Exports the REST backend (api + storage) and the client core (session,
//! cache, portal facade) the dashboards consume.

pub mod api;
pub mod client;
pub mod error;
pub mod models;
pub mod storage;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub database: DatabaseConfig,
        pub client: ClientConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DatabaseConfig {
        pub url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ClientConfig {
        pub api_base: String,
        pub session_path: String,
    }

    /// Load configuration from config/ files with MEDORA_* overrides.
    pub fn load_config() -> Result<Config, config::ConfigError> {
        let env = std::env::var("MEDORA_ENV").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(config::Environment::with_prefix("MEDORA").separator("__"))
            .build()?
            .try_deserialize()
    }
}
