//! Saved project settings for the CLI.
//!
//! This module handles loading and saving the project settings the login
//! command needs: API URL, app URL, project ID and publishable client key.
//! Tokens are never written here.
//!
//! Configuration is stored at `~/.config/stackauth-login/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stackauth_login_core::{ClientConfig, DEFAULT_BASE_URL};

/// Application name used for the config directory path
const APP_NAME: &str = "stackauth-login";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub app_url: Option<String>,
    pub project_id: Option<String>,
    pub publishable_client_key: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Layer `overrides` on top of this config. Set values in `overrides` win.
    pub fn merged(&self, overrides: &Config) -> Config {
        Config {
            base_url: overrides.base_url.clone().or_else(|| self.base_url.clone()),
            app_url: overrides.app_url.clone().or_else(|| self.app_url.clone()),
            project_id: overrides.project_id.clone().or_else(|| self.project_id.clone()),
            publishable_client_key: overrides
                .publishable_client_key
                .clone()
                .or_else(|| self.publishable_client_key.clone()),
        }
    }

    /// Build the library config. Missing fields become empty strings so
    /// the core reports exactly which one is absent.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::new(
            self.app_url.clone().unwrap_or_default(),
            self.project_id.clone().unwrap_or_default(),
            self.publishable_client_key.clone().unwrap_or_default(),
        )
        .with_base_url(
            self.base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )
    }
}

/// Mask a secret for display, keeping only a short prefix
pub fn mask_secret(secret: &str) -> String {
    const VISIBLE: usize = 4;
    if secret.chars().count() <= VISIBLE * 2 {
        return "*".repeat(secret.chars().count());
    }
    let prefix: String = secret.chars().take(VISIBLE).collect();
    format!("{}...", prefix)
}
