use async_trait::async_trait;
use crate::CoreResult;

/// Maps free text to a compound sentiment score in [-1, 1].
///
/// Implementations must be pure: the same text always yields the same score,
/// and empty text yields 0.
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

/// Supplies already-fetched market inputs for a symbol.
///
/// Failures surface as `PredictionError::UpstreamFetchFailure`; callers do not retry.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Most recent intraday open price for `symbol`.
    async fn open_price(&self, symbol: &str) -> CoreResult<f64>;

    /// Top headlines matching `query` (usually the company name).
    async fn headlines(&self, query: &str) -> CoreResult<Vec<String>>;
}
