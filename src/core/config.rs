use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const FIXER_ACCESS_KEY_ENV: &str = "FIXER_ACCESS_KEY";

const DEFAULT_FIXER_URL: &str = "http://data.fixer.io/api";
const DEFAULT_BOT_USERNAME: &str = "cnvtbot";

fn default_fixer_url() -> String {
    DEFAULT_FIXER_URL.to_string()
}

fn default_bot_username() -> String {
    DEFAULT_BOT_USERNAME.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    pub token: Option<String>,
    #[serde(default = "default_bot_username")]
    pub bot_username: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        TelegramConfig {
            token: None,
            bot_username: default_bot_username(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FixerConfig {
    #[serde(default = "default_fixer_url")]
    pub base_url: String,
    pub access_key: Option<String>,
}

impl Default for FixerConfig {
    fn default() -> Self {
        FixerConfig {
            base_url: default_fixer_url(),
            access_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Disk,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub fixer: FixerConfig,
    #[serde(default)]
    pub store: StoreKind,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from `path` (or the default location) and layers
    /// environment secrets on top. A missing default file means all defaults.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, falling back to defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "cnvtbot", "cnvtbot")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "cnvtbot", "cnvtbot")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Environment values win over the file for secrets.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(TELEGRAM_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.telegram.token = Some(token);
        }
        if let Some(key) = lookup(FIXER_ACCESS_KEY_ENV).filter(|v| !v.is_empty()) {
            self.fixer.access_key = Some(key);
        }
        self
    }

    pub fn telegram_token(&self) -> Result<&str> {
        self.telegram.token.as_deref().with_context(|| {
            format!("Telegram token missing: set telegram.token or {TELEGRAM_TOKEN_ENV}")
        })
    }

    pub fn fixer_access_key(&self) -> Result<&str> {
        self.fixer.access_key.as_deref().with_context(|| {
            format!("Fixer access key missing: set fixer.access_key or {FIXER_ACCESS_KEY_ENV}")
        })
    }
}
