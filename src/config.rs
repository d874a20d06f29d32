use crate::cli::OutputFormat;
use crate::error::CliError;
use anyhow::Result;
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

// Build-time default injected via build.rs (API_URL env var or .env)
const DEFAULT_API_URL: &str = env!("API_URL");

/// Runtime override for the API base URL.
pub const API_URL_ENV: &str = "UPTIMEX_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_true")]
    pub color: bool,

    /// `local`, `utc`, or an IANA zone name.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_format() -> String {
    "table".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timezone() -> String {
    "local".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            format: default_format(),
            color: true,
            timezone: default_timezone(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&Self::path()?)
    }

    pub fn save(&self) -> Result<(), CliError> {
        self.save_to_path(&Self::path()?)
    }

    pub fn path() -> Result<PathBuf, CliError> {
        let dirs = ProjectDirs::from("run", "uptimex", "uptimex")
            .ok_or_else(|| CliError::Other("Could not determine config directory".to_string()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load config from a specific path; a missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(CliError::ConfigRead)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(CliError::ConfigWrite)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(CliError::ConfigWrite)?;
        Ok(())
    }

    /// Set a key from `uptimex config set`, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CliError> {
        match key {
            "api_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(CliError::Other(format!(
                        "api_url must start with http:// or https://, got '{}'",
                        value
                    )));
                }
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "format" => {
                OutputFormat::from_str(value).map_err(|_| {
                    CliError::Other(format!("Unknown format '{}'. Use table, json or yaml", value))
                })?;
                self.format = value.to_lowercase();
            }
            "color" => {
                self.color = match value.to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => {
                        return Err(CliError::Other(format!(
                            "color must be true or false, got '{}'",
                            value
                        )));
                    }
                };
            }
            "timezone" => {
                DisplayTz::from_str(value)?;
                self.timezone = value.to_string();
            }
            _ => {
                return Err(CliError::Other(format!(
                    "Unknown config key '{}'. Valid keys: api_url, format, color, timezone",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Timezone used when rendering timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayTz {
    #[default]
    Local,
    Utc,
    Named(Tz),
}

impl FromStr for DisplayTz {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "local" => Ok(Self::Local),
            "utc" => Ok(Self::Utc),
            _ => s.trim().parse::<Tz>().map(Self::Named).map_err(|_| {
                CliError::Other(format!(
                    "Invalid timezone '{}'. Use local, utc, or an IANA name like 'Asia/Tehran'",
                    s
                ))
            }),
        }
    }
}

/// Runtime context that combines config and CLI overrides
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    api_url_override: Option<String>,
    format_override: Option<OutputFormat>,
    tz_override: Option<DisplayTz>,
    no_color: bool,
    plain: bool,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::with_config(config))
    }

    /// Create context with a specific config (for testing)
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            api_url_override: None,
            format_override: None,
            tz_override: None,
            no_color: false,
            plain: false,
        }
    }

    pub fn override_api_url(&mut self, url: String) {
        self.api_url_override = Some(url);
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format_override = Some(format);
    }

    pub fn set_timezone(&mut self, tz: DisplayTz) {
        self.tz_override = Some(tz);
    }

    pub fn set_no_color(&mut self, no_color: bool) {
        self.no_color = no_color;
    }

    pub fn set_plain(&mut self, plain: bool) {
        self.plain = plain;
    }

    /// Flag, then UPTIMEX_API_URL, then the config file.
    pub fn api_url(&self) -> String {
        if let Some(url) = &self.api_url_override {
            return url.clone();
        }
        std::env::var(API_URL_ENV).unwrap_or_else(|_| self.config.api_url.clone())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format_override
            .or_else(|| OutputFormat::from_str(&self.config.format).ok())
            .unwrap_or_default()
    }

    /// Falls back to local time when the configured zone is invalid.
    pub fn timezone(&self) -> DisplayTz {
        self.tz_override.unwrap_or_else(|| {
            DisplayTz::from_str(&self.config.timezone).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring configured timezone");
                DisplayTz::Local
            })
        })
    }

    pub fn no_color(&self) -> bool {
        self.no_color || !self.config.color
    }

    pub fn plain(&self) -> bool {
        self.plain
    }
}
