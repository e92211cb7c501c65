//! HTTP listener settings loaded through the `config` crate

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Where a service binds its HTTP listener
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    /// Load settings from `{PREFIX}_HOST` / `{PREFIX}_PORT`
    ///
    /// Missing values fall back to `0.0.0.0` and `default_port`.
    pub fn load(prefix: &str, default_port: u16) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(default_port))?
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
