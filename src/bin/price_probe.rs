use clap::Parser;
use divar_price_bot::app::replies;
use divar_price_bot::utils::{logger, validation::Validate};
use divar_price_bot::{BotConfig, ChromiumLauncher, CliConfig, PriceAggregator, PriceOutcome};

/// Runs a single price lookup without Telegram and prints the reply the bot
/// would send.
#[derive(Parser)]
#[command(name = "price-probe")]
#[command(about = "One-off Divar price lookup from the command line")]
struct Args {
    /// Item to search for, e.g. "پراید ۸۸"
    query: String,

    /// Print the raw outcome as JSON instead of the chat reply
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    common: CliConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.common.verbose);

    let config = BotConfig::from_cli(&args.common)?;
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let aggregator = PriceAggregator::new(
        ChromiumLauncher::new(config.chromium_config()),
        config.aggregator_config(),
    );

    println!("{}", replies::searching(&args.query));
    let outcome = aggregator.compute_average_price(&args.query).await;

    if args.json {
        println!("{}", outcome.to_json()?);
    } else {
        println!("{}", replies::render(&args.query, outcome));
    }

    if let PriceOutcome::Failed(_) = outcome {
        std::process::exit(2);
    }
    Ok(())
}
