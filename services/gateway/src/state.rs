use std::sync::Arc;
use ticker_stats::StatisticsAggregator;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<StatisticsAggregator>,
}

impl AppState {
    pub fn new(aggregator: Arc<StatisticsAggregator>) -> Self {
        Self { aggregator }
    }
}
