use analysis_core::PredictionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{provider} error: {message}")]
    Provider { provider: &'static str, message: String },

    #[error("{provider} rate limit: {message}")]
    RateLimited { provider: &'static str, message: String },

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Unparsable price '{0}'")]
    InvalidPrice(String),

    #[error("{0} is not configured")]
    MissingApiKey(&'static str),
}

pub type MarketDataResult<T> = Result<T, MarketDataError>;

// Request URLs carry the API key in the query string.
impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        MarketDataError::Http(err.without_url())
    }
}

impl From<MarketDataError> for PredictionError {
    fn from(err: MarketDataError) -> Self {
        PredictionError::UpstreamFetchFailure(err.to_string())
    }
}
