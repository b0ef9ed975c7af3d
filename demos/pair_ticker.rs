use pair_stats_sdk::{DexScreenerClient, StatsTicker, TickerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // DEXSCREENER_PAIR_ID is required; chain and interval have defaults
    let config = TickerConfig::from_env()?;

    println!("DexScreener Live Stats");
    println!("======================");
    println!(
        "Pair: {}/{} (every {}s)",
        config.chain_id,
        config.pair_id,
        config.poll_interval.as_secs()
    );

    let client = Arc::new(DexScreenerClient::new()?);
    let ticker = StatsTicker::new(client, config);
    ticker.start();

    let mut state = ticker.subscribe_state();

    // Watch loop
    for _ in 0..10 {
        if state.changed().await.is_err() {
            break;
        }
        let current = state.borrow_and_update().clone();

        if current.is_loading {
            continue;
        }

        println!("\n{:-<50}", "");
        if let Some(stats) = &current.stats {
            let formatted = stats.formatted();
            println!("{:<14} {}", "Price", formatted.price);
            println!("{:<14} {}", "24h Change", formatted.price_change_24h);
            println!("{:<14} {}", "Market Cap", formatted.market_cap);
            println!("{:<14} {}", "FDV", formatted.fdv);
            println!("{:<14} {}", "Liquidity", formatted.liquidity);
            println!("{:<14} {}", "24h Volume", formatted.volume_24h);
            println!("{:<14} {}", "Chart", stats.dex_url);
            println!("{:<14} {}", "Updated", stats.last_updated.format("%H:%M:%S"));
        }
        if let Some(error) = &current.error {
            println!("Market data unavailable: {}", error);
        }
    }

    let health = ticker.health_check().await;
    println!("\nHealth: {:?} ({})", health.status, health.message.unwrap_or_default());

    ticker.stop();
    Ok(())
}
