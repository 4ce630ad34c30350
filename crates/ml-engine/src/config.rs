use std::path::PathBuf;

/// Where the inference context loads its artifacts from.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub model_path: PathBuf,
    pub reference_data_path: PathBuf,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/stock_model.json".to_string())
                .into(),
            reference_data_path: std::env::var("REFERENCE_DATA_PATH")
                .unwrap_or_else(|_| "data/sp500_companies.csv".to_string())
                .into(),
        }
    }
}
