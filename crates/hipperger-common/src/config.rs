//! Configuration loading shared by all binaries
//!
//! Sources are layered with figment, lowest priority first:
//! built-in defaults, a TOML file, a caller-supplied overlay, then prefixed
//! environment variables using `__` as the nesting separator.

use crate::error::ConfigurationError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment, Provider,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// Loader implemented by every top-level configuration type
pub trait ConfigLoader<T> {
    /// Load from the given file (or the default file name) plus environment
    fn load(path: Option<PathBuf>) -> Result<T, ConfigurationError>;

    /// Load from an explicit file plus environment
    fn load_from_file(path: &Path) -> Result<T, ConfigurationError>;

    /// Re-apply environment overrides with the given prefix on top of `config`
    fn apply_env_overrides(config: &mut T, prefix: &str) -> Result<(), ConfigurationError>;
}

/// Build the standard defaults → TOML → overlay → `prefix`-env figment
pub fn layered<T: Serialize, P: Provider>(
    defaults: &T,
    file: &Path,
    overlay: P,
    env_prefix: &str,
) -> Figment {
    Figment::from(Serialized::defaults(defaults))
        .merge(Toml::file(file))
        .merge(overlay)
        .merge(Env::prefixed(env_prefix).split("__"))
}

/// Extract a typed configuration, mapping figment errors
pub fn extract<T: DeserializeOwned>(figment: &Figment) -> Result<T, ConfigurationError> {
    figment.extract().map_err(|e| ConfigurationError::ParseError {
        details: e.to_string(),
    })
}

/// Render a configuration value as pretty TOML
pub fn to_toml<T: Serialize>(config: &T) -> Result<String, ConfigurationError> {
    toml::to_string_pretty(config).map_err(|e| ConfigurationError::ParseError {
        details: format!("Failed to serialize config: {e}"),
    })
}
