//! Inference context: the reference table, the sentiment scorer and the fitted
//! model, loaded once and shared read-only between requests.

use crate::artifact::ModelArtifact;
use crate::config::PredictorConfig;
use crate::model::Regressor;
use analysis_core::{CoreResult, PredictionError, PredictionResult};
use news_features::{FeatureBuilder, InferenceFeatures, ReferenceTable};
use sentiment_analysis::VaderScorer;
use std::sync::Arc;
use tracing::info;

pub struct Predictor {
    features: FeatureBuilder,
    model: Arc<dyn Regressor>,
}

impl Predictor {
    pub fn new(features: FeatureBuilder, model: Arc<dyn Regressor>) -> Self {
        Self { features, model }
    }

    /// Load the reference table and model artifact. Either failing is fatal
    /// for the caller.
    pub fn load(config: &PredictorConfig) -> CoreResult<Self> {
        let reference = ReferenceTable::load_csv(&config.reference_data_path)?;

        let artifact = ModelArtifact::load(&config.model_path).map_err(|e| {
            PredictionError::ModelLoadFailure(format!("{}: {}", config.model_path.display(), e))
        })?;
        let trained_at = artifact.trained_at;
        let model = artifact.into_model().map_err(|e| {
            PredictionError::ModelLoadFailure(format!("{}: {}", config.model_path.display(), e))
        })?;
        info!(
            "Loaded model from {} ({} trees, trained {})",
            config.model_path.display(),
            model.trees().len(),
            trained_at
        );

        let features = FeatureBuilder::new(reference, Arc::new(VaderScorer::new()));
        Ok(Self::new(features, Arc::new(model)))
    }

    pub fn reference(&self) -> &ReferenceTable {
        self.features.reference()
    }

    /// Predict the percent change for `symbol` opening at `open_price` given
    /// today's headlines.
    pub fn predict<S: AsRef<str>>(
        &self,
        open_price: f64,
        symbol: &str,
        headlines: &[S],
    ) -> CoreResult<PredictionResult> {
        let InferenceFeatures { vector, sentiment } =
            self.features.build(open_price, symbol, headlines)?;

        let row = vector.sanitized().to_array();
        let predicted = self.model.predict_row(&row);
        if !predicted.is_finite() {
            return Err(PredictionError::Internal(format!(
                "model produced non-finite output for {}",
                symbol
            )));
        }

        Ok(PredictionResult {
            predicted_percent_change: predicted,
            sentiment_score: sentiment.compound,
        })
    }
}
