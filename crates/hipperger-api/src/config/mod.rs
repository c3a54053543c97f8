//! Configuration module for the hipperger auth gateway

mod auth;
mod server;
mod signup;

pub use auth::{Auth0Config, GatekeeperConfig, GrantType};
pub use server::ServerConfig;
pub use signup::SignupConfig;

use figment::{
    providers::{Env, Serialized},
    value::{Uncased, UncasedStr},
    Figment,
};
use hipperger_common::config::{self as common_config, ConfigLoader};
use hipperger_common::ConfigurationError as ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "hipperger-api.toml";

/// Prefix of environment overrides, e.g. `HIPPERGER_API_SERVER__BIND_ADDRESS`
pub const ENV_PREFIX: &str = "HIPPERGER_API_";

/// Auth0 variables read under their conventional names
const AUTH0_ENV_VARS: [&str; 4] = [
    "AUTH0_DOMAIN",
    "AUTH0_IDENTITY",
    "AUTH0_CLIENT_ID",
    "AUTH0_CLIENT_SECRET",
];

/// Main configuration structure for the hipperger API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Auth0 tenant used by the login forwarder
    pub auth0: Auth0Config,

    /// JWT validation of protected routes
    pub gatekeeper: GatekeeperConfig,

    /// Local signup
    pub signup: SignupConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => <Config as ConfigLoader<Config>>::load_from_file(path),
            None => <Config as ConfigLoader<Config>>::load(None),
        }
    }

    /// Generate example configuration file
    pub fn generate_example() -> Result<String, ConfigError> {
        common_config::to_toml(&Self::default())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout)
    }

    /// Check that the loaded values can run the service
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth0.validate()?;
        self.gatekeeper.validate()?;
        if self.server.request_timeout == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    fn figment(path: &Path) -> Figment {
        // AUTH0_* sit below the prefixed variables so those stay the final word.
        common_config::layered(
            &Config::default(),
            path,
            Env::raw().only(&AUTH0_ENV_VARS).map(auth0_env_key),
            ENV_PREFIX,
        )
    }
}

/// Map a conventional Auth0 variable onto its key in the `auth0` section
fn auth0_env_key(key: &UncasedStr) -> Uncased<'_> {
    match key.as_str().to_ascii_lowercase().as_str() {
        "auth0_domain" => "auth0.domain".into(),
        "auth0_identity" => "auth0.audience".into(),
        "auth0_client_id" => "auth0.client_id".into(),
        "auth0_client_secret" => "auth0.client_secret".into(),
        other => Uncased::from(other.to_string()),
    }
}

impl ConfigLoader<Config> for Config {
    fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        common_config::extract(&Self::figment(&path))
    }

    fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
        common_config::extract(&Self::figment(path))
    }

    fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<(), ConfigError> {
        let figment = Figment::from(Serialized::defaults(config.clone()))
            .merge(Env::prefixed(prefix).split("__"));

        *config = common_config::extract(&figment)?;

        Ok(())
    }
}
