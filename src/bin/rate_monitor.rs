use anyhow::Result;
use price_feed::logging::init_tracing;
use price_feed::{
    receive_amount, FeedConfig, Heartbeat, HttpPriceSource, PriceFeedStore, ShutdownManager,
};
use std::sync::Arc;
use std::time::Duration;
use swap_pricer::bin_common::{load_config_from_env, parse_args, ConfigType};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(ConfigType::Feed);
    let config = if config_path.exists() {
        FeedConfig::load(&config_path)?
    } else {
        FeedConfig::from_env()?
    };

    init_tracing();

    // Watched sample conversion: AMOUNT FROM TO (defaults to 1.5 ETH USDC)
    let (amount, from, to) = sample_conversion(&parse_args());

    print_banner(&config, amount, &from, &to);

    let source = Arc::new(HttpPriceSource::new(&config)?);
    let store = PriceFeedStore::start(source, config.refresh_interval());
    let mut updates = store.subscribe();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let mut heartbeat = Heartbeat::new(60);
    let mut last_error: Option<String> = None;

    while shutdown.is_running() {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(state) => {
                    if state.is_loading || state.is_refetching {
                        continue;
                    }
                    match &state.error {
                        Some(message) => {
                            // Stale prices stay usable; only log new failures
                            if last_error.as_deref() != Some(message) {
                                error!("Price refresh failed: {message}");
                            }
                        }
                        None => {
                            info!(
                                "{} prices live | {} {} -> {} {}",
                                state.prices.len(),
                                amount,
                                from,
                                receive_amount(&state.prices, amount, &from, &to),
                                to
                            );
                            heartbeat.reset();
                        }
                    }
                    last_error = state.error.clone();
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.interruptible_sleep(Duration::from_secs(1)) => {
                if heartbeat.tick() {
                    let state = store.state();
                    info!("Heartbeat: {} symbols tracked", state.prices.len());
                }
            }
        }
    }

    store.shutdown();
    print_shutdown();
    Ok(())
}

fn sample_conversion(args: &[String]) -> (f64, String, String) {
    match args {
        [amount, from, to, ..] => (
            amount.parse().unwrap_or(1.5),
            from.to_uppercase(),
            to.to_uppercase(),
        ),
        _ => (1.5, "ETH".to_string(), "USDC".to_string()),
    }
}

fn print_banner(config: &FeedConfig, amount: f64, from: &str, to: &str) {
    info!("");
    info!("========================================");
    info!("Starting Swap Rate Monitor");
    info!("Feed: {}", config.endpoint);
    info!("Refresh interval: {}s", config.refresh_interval_secs);
    info!("Watching: {} {} -> {}", amount, from, to);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

fn print_shutdown() {
    info!("");
    info!("========================================");
    info!("Swap Rate Monitor stopped gracefully");
    info!("========================================");
}
