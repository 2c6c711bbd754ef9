// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Service configuration: the settings record layered from a JSON file,
//! `SEASTATE_*` environment variables and the command line.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Organization admitted when no allow-list is configured.
pub const DEFAULT_ORGANIZATION: &str = "2c4ee562-6261-4018-a1b1-8837ab526944";

/// File name of the service settings inside the platform config directory.
pub const SERVICE_CONFIG_FILE: &str = "service.json";

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading the settings file.
    #[error("{}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },
    /// Settings file is not valid JSON for [`ServiceConfig`].
    #[error("{}: {source}", path.display())]
    Serde {
        /// File being read.
        path: PathBuf,
        /// Underlying failure.
        source: serde_json::Error,
    },
    /// An override carried a value outside its domain.
    #[error("invalid value `{value}` for {key}")]
    InvalidOverride {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
    /// No home directory to derive the config directory from.
    #[error("could not resolve config dir")]
    NoConfigDir,
}

/// `service.json` under the user config directory (e.g., `~/.config/seastate`).
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let proj =
        ProjectDirs::from("dev", "flyingrobots", "Seastate").ok_or(ConfigError::NoConfigDir)?;
    Ok(proj.config_dir().join(SERVICE_CONFIG_FILE))
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Tokens are verified.
    #[default]
    Production,
    /// Token verification is skipped and a fixed user is assumed.
    Development,
}

/// Settings of the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Deployment environment.
    pub environment: Environment,
    /// Required `aud` claim; audience is not checked when unset.
    pub allowed_token_aud: Option<String>,
    /// HS256 shared secret.
    pub jwt_secret: Option<String>,
    /// JSON Web Key Set file.
    pub jwks_path: Option<PathBuf>,
    /// Organizations whose users are admitted.
    pub allowed_organizations: Vec<String>,
    /// Extra load-merge-replace attempts after a version conflict.
    pub update_retries: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            allowed_token_aud: None,
            jwt_secret: None,
            jwks_path: None,
            allowed_organizations: vec![DEFAULT_ORGANIZATION.to_owned()],
            update_retries: 3,
        }
    }
}

impl ServiceConfig {
    /// Apply `SEASTATE_*` overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(value) = lookup("SEASTATE_ENVIRONMENT") {
            self.environment = Environment::from_str(&value, true).map_err(|_| {
                ConfigError::InvalidOverride {
                    key: "SEASTATE_ENVIRONMENT",
                    value,
                }
            })?;
        }
        if let Some(aud) = lookup("SEASTATE_ALLOWED_TOKEN_AUD") {
            self.allowed_token_aud = Some(aud);
        }
        if let Some(secret) = lookup("SEASTATE_JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
        if let Some(path) = lookup("SEASTATE_JWKS_PATH") {
            self.jwks_path = Some(PathBuf::from(path));
        }
        Ok(self)
    }
}

/// Load the service settings from `path`, or from [`default_config_path`]
/// when no path is given. A missing or empty file yields the defaults.
pub fn load_service_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(ServiceConfig::default()),
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ServiceConfig::default());
    }
    serde_json::from_slice(&bytes).map_err(|source| ConfigError::Serde { path, source })
}
