use crate::alpha_vantage::AlphaVantageClient;
use crate::news_api::NewsApiClient;
use analysis_core::{CoreResult, MarketDataProvider};
use async_trait::async_trait;
use std::time::Duration;

/// Keys and limits for the live fetch clients.
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    pub alpha_vantage_api_key: String,
    pub news_api_key: String,
    pub timeout: Duration,
    pub headline_limit: usize,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY").unwrap_or_default(),
            news_api_key: std::env::var("NEWS_API_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(
                std::env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            headline_limit: std::env::var("NEWS_HEADLINE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }
}

/// Alpha Vantage for prices plus NewsAPI for headlines. Each call is made
/// once; failures surface as `UpstreamFetchFailure` without retrying.
#[derive(Clone)]
pub struct LiveMarketData {
    prices: AlphaVantageClient,
    news: NewsApiClient,
    headline_limit: usize,
}

impl LiveMarketData {
    pub fn new(config: MarketDataConfig) -> Self {
        if config.alpha_vantage_api_key.is_empty() {
            tracing::warn!("ALPHA_VANTAGE_API_KEY not set; live price fetches will fail");
        }
        if config.news_api_key.is_empty() {
            tracing::warn!("NEWS_API_KEY not set; live headline fetches will fail");
        }
        Self {
            prices: AlphaVantageClient::new(config.alpha_vantage_api_key, config.timeout),
            news: NewsApiClient::new(config.news_api_key, config.timeout),
            headline_limit: config.headline_limit,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MarketDataConfig::default())
    }
}

#[async_trait]
impl MarketDataProvider for LiveMarketData {
    async fn open_price(&self, symbol: &str) -> CoreResult<f64> {
        self.prices.latest_open(symbol).await.map_err(|e| {
            tracing::warn!("Price fetch failed for {}: {}", symbol, e);
            e.into()
        })
    }

    async fn headlines(&self, query: &str) -> CoreResult<Vec<String>> {
        self.news
            .top_headlines(query, self.headline_limit)
            .await
            .map_err(|e| {
                tracing::warn!("Headline fetch failed for '{}': {}", query, e);
                e.into()
            })
    }
}
