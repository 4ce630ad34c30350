use crate::error::{MarketDataError, MarketDataResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://newsapi.org/v2/everything";
const PROVIDER: &str = "NewsAPI";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
}

/// Headline search against NewsAPI's `everything` endpoint.
#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl NewsApiClient {
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

    /// Titles of the `limit` most relevant English articles matching `query`.
    pub async fn top_headlines(&self, query: &str, limit: usize) -> MarketDataResult<Vec<String>> {
        if self.api_key.is_empty() {
            return Err(MarketDataError::MissingApiKey("NEWS_API_KEY"));
        }

        let page_size = limit.clamp(1, 100).to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("language", "en"),
                ("sortBy", "relevancy"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let headlines = parse_headlines(&body, limit).map_err(|e| match e {
            // keep the HTTP status when the body isn't a NewsAPI payload
            MarketDataError::MissingData(_) if !status.is_success() => MarketDataError::Status {
                status: status.as_u16(),
                body,
            },
            other => other,
        })?;

        tracing::debug!("NewsAPI returned {} headlines for '{}'", headlines.len(), query);
        Ok(headlines)
    }
}

/// Extract up to `limit` non-empty titles from an `everything` response body.
pub fn parse_headlines(body: &str, limit: usize) -> MarketDataResult<Vec<String>> {
    let parsed: EverythingResponse = serde_json::from_str(body)
        .map_err(|e| MarketDataError::MissingData(format!("unreadable response: {}", e)))?;

    if parsed.status != "ok" {
        let message = parsed.message.unwrap_or_else(|| "unknown error".to_string());
        return Err(match parsed.code.as_deref() {
            Some("rateLimited") => MarketDataError::RateLimited {
                provider: PROVIDER,
                message,
            },
            _ => MarketDataError::Provider {
                provider: PROVIDER,
                message,
            },
        });
    }

    Ok(parsed
        .articles
        .into_iter()
        .filter_map(|a| a.title)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t != "[Removed]")
        .take(limit)
        .collect())
}
