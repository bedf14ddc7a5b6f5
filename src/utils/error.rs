use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceBotError {
    #[error("Browser operation failed: {message}")]
    BrowserError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Telegram API rejected `{method}`: {description}")]
    TelegramApiError { method: String, description: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error in `{field}`: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value `{value}` for `{field}`: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Price parsing error: {message}")]
    PriceParseError { message: String },
}

impl PriceBotError {
    pub fn browser(message: impl std::fmt::Display) -> Self {
        Self::BrowserError {
            message: message.to_string(),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigValidationError { .. }
                | Self::InvalidConfigValueError { .. }
                | Self::MissingConfigError { .. }
                | Self::TomlError(_)
        )
    }

    /// Short message suitable for stderr when the process cannot start.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingConfigError { field } => {
                format!("Required setting `{}` is not configured", field)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting `{}` is invalid: {}", field, reason)
            }
            Self::ConfigValidationError { field, message } => {
                format!("Configuration problem in `{}`: {}", field, message)
            }
            Self::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::HttpError(_) => "Could not reach the Telegram API".to_string(),
            Self::TelegramApiError { description, .. } => {
                format!("Telegram refused the request: {}", description)
            }
            Self::BrowserError { .. } => "The headless browser could not be used".to_string(),
            Self::SerializationError(_) => "Unexpected response format".to_string(),
            Self::PriceParseError { .. } => "A listing price could not be read".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingConfigError { .. } => {
                "Set TELEGRAM_BOT_TOKEN or pass --token (or add it to the config file)"
            }
            Self::InvalidConfigValueError { .. } | Self::ConfigValidationError { .. } => {
                "Check the command-line flags and the config file values"
            }
            Self::TomlError(_) => "Fix the syntax of the TOML config file",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::HttpError(_) => "Check network connectivity and the Telegram API URL",
            Self::TelegramApiError { .. } => "Verify the bot token with @BotFather",
            Self::BrowserError { .. } => {
                "Install Chrome/Chromium or point --chrome-path at the executable"
            }
            Self::SerializationError(_) | Self::PriceParseError { .. } => {
                "Retry later; the remote page or API may have changed"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PriceBotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        let missing = PriceBotError::MissingConfigError {
            field: "telegram.token".to_string(),
        };
        assert!(missing.is_config_error());
        assert!(missing.user_friendly_message().contains("telegram.token"));
        assert!(missing.recovery_suggestion().contains("TELEGRAM_BOT_TOKEN"));

        let browser = PriceBotError::browser("chrome exited");
        assert!(!browser.is_config_error());
        assert_eq!(
            browser.to_string(),
            "Browser operation failed: chrome exited"
        );
    }

    #[test]
    fn test_json_errors_convert_to_serialization_error() {
        let err: PriceBotError = serde_json::from_str::<u8>("not json").unwrap_err().into();
        assert!(matches!(err, PriceBotError::SerializationError(_)));
        assert!(!err.is_config_error());
        assert_eq!(err.user_friendly_message(), "Unexpected response format");
    }
}
