//! Prediction Routes
//!
//! `POST /api/predict` scores caller-supplied inputs. `GET /get_stock_prediction`
//! fetches the live open price and headlines first, and answers in the flat
//! shape the web client reads.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use analysis_core::{PredictionError, SentimentLabel};
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppError, AppState};

pub fn prediction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/api/health", get(health))
        .route("/api/predict", post(predict))
        .route("/get_stock_prediction", get(get_stock_prediction))
}

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the stock prediction API",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub reference_symbols: usize,
}

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        reference_symbols: state.predictor.reference().len(),
    }))
}

#[derive(Deserialize)]
pub struct PredictRequest {
    pub symbol: String,
    pub open_price: f64,
    #[serde(default)]
    pub headlines: Vec<String>,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub symbol: String,
    pub predicted_percent_change: f64,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PredictResponse>>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!("Rejected predict body: {}", rejection.body_text());
        AppError::bad_request("Request body must be JSON with symbol and open_price")
    })?;
    let symbol = req.symbol.trim().to_uppercase();
    let result = state
        .predictor
        .predict(req.open_price, &symbol, &req.headlines)?;

    tracing::info!(
        "Predicted {:+.3}% for {} from {} headlines",
        result.predicted_percent_change,
        symbol,
        req.headlines.len()
    );

    Ok(Json(ApiResponse::success(PredictResponse {
        symbol,
        predicted_percent_change: result.predicted_percent_change,
        sentiment_score: result.sentiment_score,
        sentiment_label: SentimentLabel::from_score(result.sentiment_score),
    })))
}

#[derive(Deserialize)]
pub struct StockPredictionQuery {
    pub symbol: String,
    /// Headline search term; falls back to the company's short name.
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Serialize)]
pub struct StockPredictionResponse {
    pub symbol: String,
    pub company_name: String,
    pub open_price: f64,
    pub headlines: Vec<String>,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    /// Formatted as `"{:.2}%"`.
    pub predicted_change: String,
    pub predicted_percent_change: f64,
}

async fn get_stock_prediction(
    State(state): State<AppState>,
    query: Result<Query<StockPredictionQuery>, QueryRejection>,
) -> Result<Json<StockPredictionResponse>, AppError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!("Rejected stock prediction query: {}", rejection.body_text());
        AppError::bad_request("symbol is required")
    })?;
    let symbol = query.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::bad_request("symbol is required"));
    }

    // Unknown symbols are rejected before spending any upstream calls.
    let entry = state.predictor.reference().get(&symbol)?;
    let company_name = query
        .company_name
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| {
            if entry.short_name.is_empty() {
                symbol.clone()
            } else {
                entry.short_name.clone()
            }
        });

    let (open_price, headlines) = tokio::join!(
        state.provider.open_price(&symbol),
        state.provider.headlines(&company_name)
    );
    let open_price = open_price?;
    let headlines = headlines?;

    let result = state.predictor.predict(open_price, &symbol, &headlines)?;
    if !result.predicted_percent_change.is_finite() {
        return Err(PredictionError::Internal("non-finite prediction".to_string()).into());
    }

    tracing::info!(
        "Live prediction for {} ({}): open {:.2}, sentiment {:.3}, change {:+.3}%",
        symbol,
        company_name,
        open_price,
        result.sentiment_score,
        result.predicted_percent_change
    );

    Ok(Json(StockPredictionResponse {
        symbol,
        company_name,
        open_price,
        headlines,
        sentiment_score: result.sentiment_score,
        sentiment_label: SentimentLabel::from_score(result.sentiment_score),
        predicted_change: format!("{:.2}%", result.predicted_percent_change),
        predicted_percent_change: result.predicted_percent_change,
    }))
}
