use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File read for configuration overrides, relative to the working directory.
pub const CONFIG_FILE: &str = "DVoting.toml";

/// Prefix of the environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "DVOTING_";

/// Client configuration, derived from built-in defaults, then `DVoting.toml`,
/// then `DVOTING_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    proxy_address: String,
    request_timeout: u64,
    poll_interval: u64,
    log_config: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_address: "http://localhost:9080".to_string(),
            request_timeout: 30,
            poll_interval: 1000,
            log_config: "log4rs.yaml".to_string(),
        }
    }
}

impl Config {
    /// The layered configuration sources, for callers wanting to add their own.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self> {
        let config: Self = Self::figment().extract()?;
        debug!("Loaded configuration: {config:?}");
        Ok(config)
    }

    /// Base URL of the proxy every backend request goes through.
    /// Configured via `PROXY_ADDRESS`.
    pub fn proxy_address(&self) -> &str {
        self.proxy_address.trim_end_matches('/')
    }

    /// Timeout of a single backend request, in seconds.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Delay between two status polls, in milliseconds.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }

    /// Path of the log4rs configuration file.
    pub fn log_config(&self) -> &Path {
        Path::new(&self.log_config)
    }
}
