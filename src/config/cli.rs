use clap::{Args, Parser};
use std::path::PathBuf;

/// Telegram bot that reports the average asking price of an item on Divar.
#[derive(Debug, Parser)]
#[command(name = "divar-price-bot", version)]
pub struct BotCli {
    #[command(flatten)]
    pub config: CliConfig,
}

// Flags shared by the bot and the one-off probe binary.
#[derive(Debug, Clone, Default, Args)]
pub struct CliConfig {
    /// Optional TOML config file; flags override its values
    #[arg(short, long, value_name = "FILE", env = "DIVAR_BOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Telegram bot token from @BotFather
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long, value_name = "URL", env = "TELEGRAM_API_URL")]
    pub telegram_api_url: Option<String>,

    /// Long-poll window for getUpdates, in seconds
    #[arg(long, value_name = "SECS")]
    pub poll_timeout: Option<u64>,

    /// Marketplace base URL searched for listings
    #[arg(long, value_name = "URL")]
    pub marketplace_url: Option<String>,

    /// Chrome/Chromium executable used for scraping
    #[arg(long, value_name = "PATH", env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Seconds to let the results page render before reading it
    #[arg(long, value_name = "SECS")]
    pub settle_secs: Option<u64>,

    /// Log resource usage after each lookup
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
