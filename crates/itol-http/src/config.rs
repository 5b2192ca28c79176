//! Client and service configuration loaded from TOML.
//!
//! Load failures carry the `ConfigParseError` code and the file path in
//! their context message.

use crate::auth::{PasswordDecryptor, basic_authorization_header};
use crate::error::CredentialError;
use anyhow::{Context, Result};
use itol_core::ErrorCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_temp_file_prefix")]
    pub temp_file_prefix: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            temp_file_prefix: default_temp_file_prefix(),
        }
    }
}

/// Connection settings for the remote issue service.
///
/// `properties` is passed through untouched for the synchronization layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub url: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub encrypted_password: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl ServiceConfig {
    /// `Authorization: Basic …` line for these credentials.
    ///
    /// # Errors
    ///
    /// Returns the decryptor's error if the stored password cannot be read.
    pub fn authorization_header(
        &self,
        decryptor: &dyn PasswordDecryptor,
    ) -> Result<String, CredentialError> {
        basic_authorization_header(&self.user_name, &self.encrypted_password, decryptor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub service: Option<ServiceConfig>,
}

/// Load a config file; a missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let code = ErrorCode::ConfigParseError.code();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("{code}: Failed to read {}", path.display()))?;

    toml::from_str::<Config>(&content)
        .with_context(|| format!("{code}: Failed to parse {}", path.display()))
}

/// Load `<config_dir>/itol/config.toml`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Config> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(Config::default());
    };
    load_config(&config_dir.join("itol/config.toml"))
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_max_redirects() -> u32 {
    5
}

fn default_user_agent() -> String {
    "itol".to_string()
}

fn default_temp_file_prefix() -> String {
    "itol".to_string()
}
