pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{BotCli, CliConfig};

pub use adapters::{ChromiumConfig, ChromiumLauncher, TelegramTransport};
pub use app::PriceBot;
pub use config::BotConfig;
pub use core::aggregator::{AggregatorConfig, PriceAggregator};
pub use domain::model::{LookupFailure, PriceOutcome};
pub use utils::error::{PriceBotError, Result};
