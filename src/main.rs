use std::sync::Arc;

use clap::Parser;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

use crypto_exchange::config::Settings;
use crypto_exchange::metrics::install_recorder;
use crypto_exchange::settlement::MemoryLedger;
use crypto_exchange::{Exchange, Side};

#[derive(Parser, Debug)]
#[command(name = "exchange")]
struct Args {
    #[arg(long, default_value = "config/example.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let _prom = install_recorder()?;

    let args = Args::parse();
    let settings = Settings::load(&args.config)?;
    let Some(market) = settings.markets.first().map(|m| m.symbol.clone()) else {
        anyhow::bail!("no markets configured");
    };

    let ledger = Arc::new(MemoryLedger::new());
    for account in [6, 7, 8] {
        ledger.credit(account, dec!(100));
    }
    let exchange = Exchange::new(&settings, ledger.clone());

    exchange.place_limit_order(&market, 6, Side::Ask, dec!(5_000), dec!(12))?;
    exchange.place_limit_order(&market, 7, Side::Ask, dec!(7_000), dec!(5))?;

    let events = exchange
        .place_market_order(&market, 8, Side::Bid, dec!(14))
        .await?;
    for event in &events {
        println!(
            "filled {} @ {} (maker order {}, taker order {})",
            event.size, event.price, event.maker_order_id, event.taker_order_id
        );
    }

    let snapshot = exchange.book_snapshot(&market, settings.snapshot_depth)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    println!(
        "balances: 6={} 7={} 8={}",
        ledger.balance(6),
        ledger.balance(7),
        ledger.balance(8)
    );
    Ok(())
}
