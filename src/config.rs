use crate::api::EndpointIdentity;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables that override the config file
pub const COMPANY_VAR: &str = "RELATICS_COMPANY";
pub const ENVIRONMENT_ID_VAR: &str = "RELATICS_ENVIRONMENT_ID";
pub const WORKSPACE_ID_VAR: &str = "RELATICS_WORKSPACE_ID";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub company_name: Option<String>,
    pub environment_id: Option<String>,
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub transport: TransportSettings,
}

/// HTTP settings for the SOAP transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransportSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_pool_max_idle_per_host() -> usize {
    10
}

fn default_user_agent() -> String {
    format!("relatics-cli/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: default_user_agent(),
        }
    }
}

impl TransportSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("relatics-cli")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".relatics-cli")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (defaults when absent) and apply environment
    /// overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            info!("Config file doesn't exist, using defaults");
            Self::default()
        };

        // Load .env file if it exists
        dotenvy::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        debug!("Saving config to: {:?}", path);

        if let Some(config_dir) = path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).with_context(|| {
                    format!("Failed to create config directory: {:?}", config_dir)
                })?;
                info!("Created config directory: {:?}", config_dir);
            }
        }

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        info!("Config saved successfully");
        Ok(())
    }

    /// Override identity fields from a variable lookup (the process
    /// environment in [`Config::load`])
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(company_name) = lookup(COMPANY_VAR) {
            debug!("Company name overridden by {}", COMPANY_VAR);
            self.company_name = Some(company_name);
        }
        if let Some(environment_id) = lookup(ENVIRONMENT_ID_VAR) {
            debug!("Environment id overridden by {}", ENVIRONMENT_ID_VAR);
            self.environment_id = Some(environment_id);
        }
        if let Some(workspace_id) = lookup(WORKSPACE_ID_VAR) {
            debug!("Workspace id overridden by {}", WORKSPACE_ID_VAR);
            self.workspace_id = Some(workspace_id);
        }
    }

    /// Endpoint identity for the dynamic client; every field must be set
    pub fn identity(&self) -> Result<EndpointIdentity> {
        let company_name = self
            .company_name
            .clone()
            .with_context(|| format!("No company name configured (set {})", COMPANY_VAR))?;
        let environment_id = self
            .environment_id
            .clone()
            .with_context(|| format!("No environment id configured (set {})", ENVIRONMENT_ID_VAR))?;
        let workspace_id = self
            .workspace_id
            .clone()
            .with_context(|| format!("No workspace id configured (set {})", WORKSPACE_ID_VAR))?;

        Ok(EndpointIdentity::new(company_name, environment_id, workspace_id))
    }
}
