//! Session configuration.
//!
//! Covers everything the HTTP adapter and the manager need to agree on: the
//! cookie that carries the session id, its attributes, and the reserved key
//! used for flash messages. Loadable from TOML so deployments can tune it
//! without code changes.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::flash::DEFAULT_FLASH_KEY;

/// Top-level session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie: CookieConfig,
    /// Reserved session key for flash messages.
    pub flash_key: String,
}

/// Attributes of the cookie carrying the session id.
///
/// The core only reads `name` and `lifetime_secs`; the rest is passed
/// through for the HTTP adapter that formats the actual `Set-Cookie` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    /// Cookie lifetime in seconds; `None` means a session cookie that the
    /// browser drops on close.
    pub lifetime_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie: CookieConfig::default(),
            flash_key: DEFAULT_FLASH_KEY.to_string(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "sid".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            lifetime_secs: None,
        }
    }
}

impl SessionConfig {
    /// Parse from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse session configuration")
    }

    /// Load from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Save to a TOML file.
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize session configuration")?;
        std::fs::write(path.as_ref(), content).with_context(|| {
            format!("Failed to write config file: {}", path.as_ref().display())
        })?;
        Ok(())
    }
}
