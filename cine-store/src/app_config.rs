use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub smtp: SmtpConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Mail relay settings. `username` and `password` have no default anywhere;
/// if they are not supplied via a config file or environment, `Config::load`
/// fails and the process never starts with a silent fallback credential.
#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_seconds: u64,
}

fn default_smtp_timeout() -> u64 {
    10
}

/// Session signing secret, externally supplied only.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secret: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables win, e.g. CINE__SMTP__PASSWORD=...
            .add_source(config::Environment::with_prefix("CINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
