use clap::Parser;
use std::net::SocketAddr;
use ticker_stats::AggregatorConfig;

/// Command-line and environment configuration for the gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "gateway")]
#[command(about = "HTTP gateway for the ticker statistics service")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "TICKER_STATS_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Interval between statistics rebuilds, in milliseconds
    #[arg(long, env = "INDEX_UPDATE_PERIOD_MS", default_value = "500")]
    pub rebuild_period_ms: u64,
}

impl Args {
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig::with_period_millis(self.rebuild_period_ms)
    }
}
