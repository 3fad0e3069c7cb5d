use anyhow::{Context, Result};
use gridplay_core::ChartLayout;
use std::{fs, net::SocketAddr, path::Path};

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub chart: ChartLayout,
}

impl ServerConfig {
    /// GRIDPLAY_BIND and GRIDPLAY_CHART_CONFIG; both optional.
    pub fn from_env() -> Result<Self> {
        let bind_raw = std::env::var("GRIDPLAY_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .with_context(|| format!("invalid GRIDPLAY_BIND {}", bind_raw))?;

        let chart = match std::env::var("GRIDPLAY_CHART_CONFIG") {
            Ok(path) => load_chart_layout(Path::new(&path))?,
            Err(_) => ChartLayout::default(),
        };

        Ok(Self { bind, chart })
    }
}

pub fn load_chart_layout(path: &Path) -> Result<ChartLayout> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read chart config at {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("invalid chart config JSON in {}", path.display()))
}
