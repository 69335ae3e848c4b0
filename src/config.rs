//! Configuration

use crate::app::settings::AdminSettings;
use crate::error::{Error, Result};
use crate::stores::FileStorage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://teamingkr.duckdns.org";

/// Environment variable overriding `api_base_url`.
pub const API_BASE_URL_ENV: &str = "TEAMING_ADMIN_API_BASE_URL";

/// Backend paths, relative to `api_base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub sign_in: String,
    pub current_user: String,
    pub refresh: String,
    pub log_out: String,
    pub gifticons: String,
    pub dashboard_stats: String,
    pub teams: String,
    pub users: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sign_in: "/api/api/auth/teaming/sign-in".to_string(),
            current_user: "/users/me".to_string(),
            refresh: "/users/me/access-token".to_string(),
            log_out: "/users/me/log-out".to_string(),
            gifticons: "/admin/gifticon".to_string(),
            dashboard_stats: "/api/stats/dashboard".to_string(),
            teams: "/api/teams".to_string(),
            users: "/api/users".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL.
    pub api_base_url: String,
    /// Request timeout in milliseconds. Unset keeps the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Token storage file. Unset uses the config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    pub endpoints: Endpoints,
    pub settings: AdminSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_ms: None,
            storage_path: None,
            endpoints: Endpoints::default(),
            settings: AdminSettings::default(),
        }
    }
}

impl Config {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("teaming-admin"))
            .ok_or_else(|| Error::Config("could not determine config directory".to_string()))
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, applying environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }
        Ok(config)
    }

    /// Load configuration from `path`. A missing file is created with the
    /// defaults; if it cannot be written the defaults are still returned.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            match config.save_to(path) {
                Ok(()) => tracing::debug!("Wrote default config to {}", path.display()),
                Err(err) => tracing::warn!("Could not write {}: {}", path.display(), err),
            }
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Token storage at `storage_path`, or under the config directory when
    /// unset.
    pub fn storage(&self) -> FileStorage {
        match &self.storage_path {
            Some(path) => FileStorage::new(path),
            None => FileStorage::in_config_dir(),
        }
    }
}
