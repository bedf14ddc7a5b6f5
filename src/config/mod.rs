#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::chromium::ChromiumConfig;
use crate::adapters::telegram::DEFAULT_API_URL;
use crate::core::aggregator::{AggregatorConfig, DEFAULT_MARKETPLACE_URL};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use cli::{BotCli, CliConfig};

pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SETTLE_SECS: u64 = 5;
const MAX_SETTLE_SECS: u64 = 60;
const MAX_POLL_TIMEOUT_SECS: u64 = 50;

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: Option<String>,
    pub telegram_api_url: String,
    pub poll_timeout_secs: u64,
    pub marketplace_url: String,
    pub chrome_path: Option<PathBuf>,
    pub settle_secs: u64,
    pub monitor: bool,
    pub log_json: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            telegram_api_url: DEFAULT_API_URL.to_string(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            chrome_path: None,
            settle_secs: DEFAULT_SETTLE_SECS,
            monitor: false,
            log_json: false,
        }
    }
}

impl BotConfig {
    /// Layers the config file over the defaults.
    pub fn from_toml(file: TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            token: file.telegram.token,
            telegram_api_url: file
                .telegram
                .api_url
                .unwrap_or(defaults.telegram_api_url),
            poll_timeout_secs: file
                .telegram
                .poll_timeout_secs
                .unwrap_or(defaults.poll_timeout_secs),
            marketplace_url: file
                .marketplace
                .base_url
                .unwrap_or(defaults.marketplace_url),
            chrome_path: file.browser.chrome_path.map(PathBuf::from),
            settle_secs: file.browser.settle_secs.unwrap_or(defaults.settle_secs),
            monitor: file.monitoring.enabled.unwrap_or(defaults.monitor),
            log_json: file.monitoring.json_logs.unwrap_or(defaults.log_json),
        }
    }

    /// Reads the file named by `--config` (if any) and applies the flags on
    /// top of it.
    #[cfg(feature = "cli")]
    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        let mut config = Self::from_toml(file);

        if let Some(token) = &cli.token {
            config.token = Some(token.clone());
        }
        if let Some(url) = &cli.telegram_api_url {
            config.telegram_api_url = url.clone();
        }
        if let Some(secs) = cli.poll_timeout {
            config.poll_timeout_secs = secs;
        }
        if let Some(url) = &cli.marketplace_url {
            config.marketplace_url = url.clone();
        }
        if let Some(path) = &cli.chrome_path {
            config.chrome_path = Some(path.clone());
        }
        if let Some(secs) = cli.settle_secs {
            config.settle_secs = secs;
        }
        config.monitor |= cli.monitor;
        config.log_json |= cli.log_json;

        Ok(config)
    }

    pub fn require_token(&self) -> Result<&str> {
        let token = validation::validate_required_field("telegram.token", &self.token)?;
        validation::validate_bot_token("telegram.token", token)?;
        Ok(token)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            marketplace_url: self.marketplace_url.clone(),
            settle_delay: Duration::from_secs(self.settle_secs),
        }
    }

    pub fn chromium_config(&self) -> ChromiumConfig {
        ChromiumConfig {
            executable: self.chrome_path.clone(),
        }
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("telegram.api_url", &self.telegram_api_url)?;
        validation::validate_url("marketplace.base_url", &self.marketplace_url)?;
        validation::validate_range(
            "telegram.poll_timeout_secs",
            self.poll_timeout_secs,
            0,
            MAX_POLL_TIMEOUT_SECS,
        )?;
        validation::validate_range("browser.settle_secs", self.settle_secs, 0, MAX_SETTLE_SECS)?;

        if let Some(token) = &self.token {
            validation::validate_bot_token("telegram.token", token)?;
        }
        if let Some(path) = &self.chrome_path {
            validation::validate_non_empty_string(
                "browser.chrome_path",
                &path.to_string_lossy(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::PriceBotError;

    #[test]
    fn test_defaults_are_valid_without_token() {
        let config = BotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.aggregator_config().settle_delay, Duration::from_secs(5));
        assert!(matches!(
            config.require_token(),
            Err(PriceBotError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_from_toml_fills_defaults() {
        let file = TomlConfig::from_toml_str(
            r#"
[telegram]
token = "1:x"

[browser]
settle_secs = 2
"#,
        )
        .unwrap();

        let config = BotConfig::from_toml(file);
        assert_eq!(config.require_token().unwrap(), "1:x");
        assert_eq!(config.settle_secs, 2);
        assert_eq!(config.telegram_api_url, DEFAULT_API_URL);
        assert_eq!(config.marketplace_url, DEFAULT_MARKETPLACE_URL);
        assert_eq!(config.poll_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = BotConfig {
            settle_secs: 600,
            ..BotConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BotConfig {
            marketplace_url: "divar.ir".to_string(),
            ..BotConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BotConfig {
            token: Some("not-a-token".to_string()),
            ..BotConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_flags_override_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"[telegram]\ntoken = \"1:file\"\n[browser]\nsettle_secs = 9\n[monitoring]\nenabled = true\n",
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            token: Some("2:flag".to_string()),
            settle_secs: Some(1),
            ..CliConfig::default()
        };

        let config = BotConfig::from_cli(&cli).unwrap();
        assert_eq!(config.token.as_deref(), Some("2:flag"));
        assert_eq!(config.settle_secs, 1);
        assert!(config.monitor);
        assert!(!config.log_json);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_parses_flags() {
        use clap::Parser;

        let cli = BotCli::try_parse_from([
            "divar-price-bot",
            "--token",
            "123:abc",
            "--settle-secs",
            "7",
            "--monitor",
        ])
        .unwrap()
        .config;
        assert_eq!(cli.token.as_deref(), Some("123:abc"));
        assert_eq!(cli.settle_secs, Some(7));
        assert!(cli.monitor);
    }
}
