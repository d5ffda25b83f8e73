use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub markets: Vec<MarketConfig>,
    pub snapshot_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub symbol: String,
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path));
        Ok(builder.build()?.try_deserialize()?)
    }
}
