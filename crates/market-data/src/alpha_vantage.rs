use crate::error::{MarketDataError, MarketDataResult};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";
const SERIES_KEY: &str = "Time Series (1min)";

/// Intraday quotes from Alpha Vantage.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Open of the most recent one-minute bar for `symbol`.
    pub async fn latest_open(&self, symbol: &str) -> MarketDataResult<f64> {
        if self.api_key.is_empty() {
            return Err(MarketDataError::MissingApiKey("ALPHA_VANTAGE_API_KEY"));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_INTRADAY"),
                ("symbol", symbol),
                ("interval", "1min"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketDataError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let json: Value = response.json().await?;
        let open = parse_latest_open(&json)?;
        tracing::debug!("Alpha Vantage open for {}: {}", symbol, open);
        Ok(open)
    }
}

/// Pull the `1. open` field of the latest bar out of an intraday payload.
pub fn parse_latest_open(json: &Value) -> MarketDataResult<f64> {
    if let Some(error) = json.get("Error Message") {
        return Err(MarketDataError::Provider {
            provider: PROVIDER,
            message: value_text(error),
        });
    }
    for key in ["Note", "Information"] {
        if let Some(note) = json.get(key) {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER,
                message: value_text(note),
            });
        }
    }

    let series = json
        .get(SERIES_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| MarketDataError::MissingData(format!("no '{}' in response", SERIES_KEY)))?;

    // Timestamps are "YYYY-MM-DD HH:MM:SS", so the lexicographic max is the latest bar.
    let (_, bar) = series
        .iter()
        .max_by(|a, b| a.0.cmp(b.0))
        .ok_or_else(|| MarketDataError::MissingData("empty intraday series".to_string()))?;

    let raw = bar
        .get("1. open")
        .and_then(Value::as_str)
        .ok_or_else(|| MarketDataError::MissingData("latest bar has no open".to_string()))?;

    let open: f64 = raw
        .trim()
        .parse()
        .map_err(|_| MarketDataError::InvalidPrice(raw.to_string()))?;
    if !open.is_finite() || open <= 0.0 {
        return Err(MarketDataError::InvalidPrice(raw.to_string()));
    }
    Ok(open)
}

fn value_text(value: &Value) -> String {
    value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_latest_bar() {
        let payload = json!({
            "Meta Data": { "2. Symbol": "AAPL" },
            "Time Series (1min)": {
                "2024-05-31 19:58:00": { "1. open": "191.9000", "4. close": "191.95" },
                "2024-05-31 19:59:00": { "1. open": "192.0100", "4. close": "192.20" },
                "2024-05-31 19:57:00": { "1. open": "191.5000", "4. close": "191.90" }
            }
        });
        assert_eq!(parse_latest_open(&payload).unwrap(), 192.01);
    }

    #[test]
    fn test_error_message_payload() {
        let payload = json!({ "Error Message": "Invalid API call." });
        assert!(matches!(
            parse_latest_open(&payload),
            Err(MarketDataError::Provider { .. })
        ));
    }

    #[test]
    fn test_rate_limit_payload() {
        let payload = json!({ "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute." });
        assert!(matches!(
            parse_latest_open(&payload),
            Err(MarketDataError::RateLimited { .. })
        ));
    }

    #[test]
    fn test_missing_and_bad_series() {
        assert!(matches!(
            parse_latest_open(&json!({})),
            Err(MarketDataError::MissingData(_))
        ));
        assert!(matches!(
            parse_latest_open(&json!({ "Time Series (1min)": {} })),
            Err(MarketDataError::MissingData(_))
        ));
        let bad = json!({ "Time Series (1min)": { "2024-01-02 09:30:00": { "1. open": "n/a" } } });
        assert!(matches!(parse_latest_open(&bad), Err(MarketDataError::InvalidPrice(_))));
        let zero = json!({ "Time Series (1min)": { "2024-01-02 09:30:00": { "1. open": "0.0" } } });
        assert!(matches!(parse_latest_open(&zero), Err(MarketDataError::InvalidPrice(_))));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client = AlphaVantageClient::new(String::new(), Duration::from_secs(1));
        assert!(matches!(
            client.latest_open("AAPL").await,
            Err(MarketDataError::MissingApiKey(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_error_hides_api_key() {
        let client = AlphaVantageClient::new("SECRETKEY123".to_string(), Duration::from_secs(2))
            .with_base_url("http://127.0.0.1:9/query");
        let err = client.latest_open("AAPL").await.unwrap_err();
        assert!(matches!(err, MarketDataError::Http(_)));
        assert!(!err.to_string().contains("SECRETKEY123"), "{err}");

        let upstream = analysis_core::PredictionError::from(err);
        assert!(!upstream.to_string().contains("SECRETKEY123"));
    }
}
