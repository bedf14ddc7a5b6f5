use clap::Parser;
use divar_price_bot::utils::{logger, monitor::SystemMonitor, validation::Validate};
use divar_price_bot::{
    BotCli, BotConfig, ChromiumLauncher, PriceAggregator, PriceBot, PriceBotError,
    TelegramTransport,
};

fn exit_with(e: &PriceBotError) -> ! {
    tracing::error!("❌ Startup failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(if e.is_config_error() { 1 } else { 2 });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = BotCli::parse().config;

    let config = match BotConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting divar-price-bot");

    if let Err(e) = config.validate() {
        exit_with(&e);
    }
    let token = match config.require_token() {
        Ok(token) => token.to_string(),
        Err(e) => exit_with(&e),
    };

    let transport = TelegramTransport::new(&config.telegram_api_url, &token, config.poll_timeout())?;
    match transport.get_me().await {
        Ok(me) => tracing::info!(
            "✅ Connected to Telegram as @{}",
            me.username.as_deref().unwrap_or("<unnamed>")
        ),
        Err(e) => exit_with(&e),
    }

    let monitor = SystemMonitor::new(config.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let aggregator = PriceAggregator::new(
        ChromiumLauncher::new(config.chromium_config()),
        config.aggregator_config(),
    );
    let bot = PriceBot::new(aggregator, transport).with_monitor(monitor);

    bot.run_until(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown requested");
    })
    .await;

    Ok(())
}
