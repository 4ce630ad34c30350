//! Live price and headline fetching for the prediction endpoint.

pub mod alpha_vantage;
pub mod error;
pub mod news_api;
pub mod provider;

pub use alpha_vantage::AlphaVantageClient;
pub use error::{MarketDataError, MarketDataResult};
pub use news_api::NewsApiClient;
pub use provider::{LiveMarketData, MarketDataConfig};
