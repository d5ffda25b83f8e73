use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub mod names {
    pub const LIMIT_ORDERS_PLACED: &str = "exchange_limit_orders_placed_total";
    pub const MARKET_ORDERS_PLACED: &str = "exchange_market_orders_placed_total";
    pub const ORDERS_CANCELED: &str = "exchange_orders_canceled_total";
    pub const FILLS: &str = "exchange_fills_total";
}

pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_counter!(names::LIMIT_ORDERS_PLACED, "Limit orders accepted and rested");
    describe_counter!(names::MARKET_ORDERS_PLACED, "Market orders accepted");
    describe_counter!(names::ORDERS_CANCELED, "Resting orders canceled");
    describe_counter!(names::FILLS, "Fills produced by market-order matching");
    Ok(handle)
}
