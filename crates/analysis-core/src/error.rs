use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetchFailure(String),

    #[error("Stock symbol '{0}' not found in reference data")]
    UnknownSymbol(String),

    #[error("Invalid open price: {0}")]
    InvalidOpenPrice(String),

    #[error("Model load failed: {0}")]
    ModelLoadFailure(String),

    #[error("Reference data load failed: {0}")]
    ReferenceDataLoadFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PredictionError {
    /// Stable machine-readable category, used in structured error responses.
    pub fn category(&self) -> &'static str {
        match self {
            PredictionError::UpstreamFetchFailure(_) => "upstream_fetch_failure",
            PredictionError::UnknownSymbol(_) => "unknown_symbol",
            PredictionError::InvalidOpenPrice(_) => "invalid_open_price",
            PredictionError::ModelLoadFailure(_) => "model_load_failure",
            PredictionError::ReferenceDataLoadFailure(_) => "reference_data_load_failure",
            PredictionError::Internal(_) => "internal",
        }
    }
}

pub type CoreResult<T> = Result<T, PredictionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_distinct() {
        let errors = [
            PredictionError::UpstreamFetchFailure("x".into()),
            PredictionError::UnknownSymbol("x".into()),
            PredictionError::InvalidOpenPrice("x".into()),
            PredictionError::ModelLoadFailure("x".into()),
            PredictionError::ReferenceDataLoadFailure("x".into()),
            PredictionError::Internal("x".into()),
        ];
        let mut categories: Vec<&str> = errors.iter().map(|e| e.category()).collect();
        categories.sort();
        categories.dedup();
        assert_eq!(categories.len(), errors.len());
    }

    #[test]
    fn test_unknown_symbol_message() {
        let err = PredictionError::UnknownSymbol("ZZZZ".into());
        assert_eq!(err.to_string(), "Stock symbol 'ZZZZ' not found in reference data");
    }
}
