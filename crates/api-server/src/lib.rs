//! HTTP boundary for the prediction service.
//!
//! Every failure leaves the server as `{ "success": false, "error": { "category", "message" } }`
//! with a status derived from the error category. Internal failures are logged
//! in full and reported without detail.

pub mod prediction_routes;

use analysis_core::{MarketDataProvider, PredictionError};
use anyhow::Context;
use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError, Json, Router,
};
use market_data::LiveMarketData;
use ml_engine::{Predictor, PredictorConfig};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared, read-only request context.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub provider: Arc<dyn MarketDataProvider>,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    category: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    category: &'static str,
    message: String,
}

impl AppError {
    pub fn with_status(status: StatusCode, category: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            category,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn category(&self) -> &'static str {
        self.category
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        let category = err.category();
        match err {
            PredictionError::UnknownSymbol(_) => {
                Self::with_status(StatusCode::NOT_FOUND, category, err.to_string())
            }
            PredictionError::InvalidOpenPrice(_) => {
                Self::with_status(StatusCode::UNPROCESSABLE_ENTITY, category, err.to_string())
            }
            PredictionError::UpstreamFetchFailure(_) => {
                tracing::warn!("Upstream fetch failed: {}", err);
                Self::with_status(
                    StatusCode::BAD_GATEWAY,
                    category,
                    "Upstream data provider request failed",
                )
            }
            PredictionError::ModelLoadFailure(_) | PredictionError::ReferenceDataLoadFailure(_) => {
                tracing::error!("Prediction unavailable: {}", err);
                Self::with_status(
                    StatusCode::SERVICE_UNAVAILABLE,
                    category,
                    "Prediction service is not ready",
                )
            }
            PredictionError::Internal(_) => {
                tracing::error!("Internal prediction error: {}", err);
                Self::with_status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    category,
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                category: self.category,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::with_status(StatusCode::REQUEST_TIMEOUT, "timeout", "Request timed out")
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        AppError::with_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal server error",
        )
    }
}

/// Build the application router around an already-loaded state.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(prediction_routes::prediction_routes())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let http_timeout = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            // price and news fetches each get the HTTP timeout, plus headroom
            request_timeout: Duration::from_secs(http_timeout * 2 + 5),
        }
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=info,ml_engine=info,news_features=info,market_data=warn,tower_http=info".into()),
        )
        .init();

    let predictor_config = PredictorConfig::default();
    let predictor = Predictor::load(&predictor_config).with_context(|| {
        format!(
            "failed to load prediction context (model {}, reference {})",
            predictor_config.model_path.display(),
            predictor_config.reference_data_path.display()
        )
    })?;

    let state = AppState {
        predictor: Arc::new(predictor),
        provider: Arc::new(LiveMarketData::with_defaults()),
    };

    let config = ServerConfig::default();
    let app = create_router(state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Prediction API listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
