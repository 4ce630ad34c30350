use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of model input columns.
pub const N_FEATURES: usize = 5;

/// Model input column order. The fitted model is only valid for vectors laid
/// out exactly like this.
pub const FEATURE_COLUMNS: [&str; N_FEATURES] = [
    "open",
    "positive_sentiment",
    "negative_sentiment",
    "positive_relevance",
    "negative_relevance",
];

/// One day of price history for one symbol.
///
/// Open/close are optional because the historical dataset has blank cells for
/// days a symbol did not trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPricePoint {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: Option<f64>,
}

impl HistoricalPricePoint {
    /// Intraday percent change `(close - open) / open * 100`.
    /// `None` when either price is missing or open is zero.
    pub fn percent_change(&self) -> Option<f64> {
        match (self.open, self.close) {
            (Some(open), Some(close)) if open != 0.0 => Some((close - open) / open * 100.0),
            _ => None,
        }
    }
}

/// Descriptive attributes of a listed company, keyed by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Shortname", default)]
    pub short_name: String,
    #[serde(rename = "Longname", default)]
    pub long_name: String,
    #[serde(rename = "Sector", default)]
    pub sector: String,
    #[serde(rename = "Industry", default)]
    pub industry: String,
}

/// A single headline. Historical items carry a date, live ones do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub headline: String,
}

/// Model input row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub open_price: f64,
    /// Compound score when positive, else 0.
    pub positive_sentiment: f64,
    /// Compound score when negative, else 0.
    pub negative_sentiment: f64,
    pub positive_relevance: f64,
    pub negative_relevance: f64,
}

impl FeatureVector {
    /// Lay the vector out in `FEATURE_COLUMNS` order.
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.open_price,
            self.positive_sentiment,
            self.negative_sentiment,
            self.positive_relevance,
            self.negative_relevance,
        ]
    }

    pub fn from_array(values: [f64; N_FEATURES]) -> Self {
        Self {
            open_price: values[0],
            positive_sentiment: values[1],
            negative_sentiment: values[2],
            positive_relevance: values[3],
            negative_relevance: values[4],
        }
    }

    /// Replace non-finite components with 0.
    pub fn sanitized(&self) -> Self {
        let mut values = self.to_array();
        for v in values.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
        Self::from_array(values)
    }
}

/// Output of a single prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_percent_change: f64,
    pub sentiment_score: f64,
}

/// Coarse label for a compound sentiment score, as shown to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.25 {
            SentimentLabel::Positive
        } else if score < -0.25 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}
