use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skywatch_common::{Indicator, ThresholdTable};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// SMTP relay host
    pub host: String,

    /// SMTP user; also the sender address
    pub user: String,

    /// SMTP password
    pub pass: String,

    /// ClimaCell API key
    pub cc_key: String,

    /// Address every report is sent to
    pub recipient: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Implicit TLS when true, opportunistic STARTTLS otherwise
    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Directory holding the HTML templates
    #[serde(default = "default_template_dir")]
    pub template_dir: String,

    /// Directory containing `summary-icons/` and `legends/`
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-indicator overrides of the built-in alert limits
    #[serde(default)]
    pub thresholds: BTreeMap<Indicator, f64>,

    /// Local hour of the daily forecast mail
    #[serde(default = "default_forecast_hour")]
    pub forecast_hour: u32,

    #[serde(default = "default_alert_interval_minutes")]
    pub alert_interval_minutes: u64,
}

fn default_port() -> u16 {
    587
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_template_dir() -> String {
    "resources".to_string()
}

fn default_asset_dir() -> String {
    ".".to_string()
}

fn default_api_base_url() -> String {
    "https://api.climacell.co/v3/weather".to_string()
}

fn default_forecast_hour() -> u32 {
    8
}

fn default_alert_interval_minutes() -> u64 {
    2
}

impl NotifierConfig {
    /// Load configuration from a JSON file, or TOML when the extension says so.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config: NotifierConfig = if is_toml {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file '{}'", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file '{}'", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("Config key 'host' must not be empty");
        }
        if self.cc_key.trim().is_empty() {
            anyhow::bail!("Config key 'cc_key' must not be empty");
        }
        if self.user.trim().is_empty() {
            anyhow::bail!("Config key 'user' must not be empty");
        }
        if self.recipient.trim().is_empty() {
            anyhow::bail!("Config key 'recipient' must not be empty");
        }
        if self.forecast_hour >= 24 {
            anyhow::bail!("Config key 'forecast_hour' must be below 24, got {}", self.forecast_hour);
        }
        if self.alert_interval_minutes == 0 {
            anyhow::bail!("Config key 'alert_interval_minutes' must be positive");
        }
        Ok(())
    }

    pub fn thresholds(&self) -> ThresholdTable {
        ThresholdTable::default().with_overrides(&self.thresholds)
    }

    pub fn template_dir(&self) -> PathBuf {
        PathBuf::from(&self.template_dir)
    }

    pub fn asset_dir(&self) -> PathBuf {
        PathBuf::from(&self.asset_dir)
    }

    pub fn smtp_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
