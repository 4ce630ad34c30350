//! On-disk form of a trained gradient boosting model.
//!
//! ```json
//! {
//!   "model_type": "gradient_boosted_regressor",
//!   "feature_names": ["open", "positive_sentiment", ...],
//!   "n_features": 5,
//!   "params": { "n_estimators": 100, "learning_rate": 0.1, ... },
//!   "init_value": 0.042,
//!   "trees": [ { "nodes": [ { "feature": 0, "threshold": 12.5, "left": 1, "right": 2, "value": 0.0 }, ... ] } ],
//!   "trained_at": "2024-06-01T12:00:00Z",
//!   "metrics": { "mae": 1.1, "rmse": 1.6, "r2": 0.02, "n_samples": 812 }
//! }
//! ```
//!
//! Feature names are checked on load so an artifact trained against a
//! different column layout is rejected instead of silently mispredicting.

use crate::error::{MLError, MLResult};
use crate::gbm::{GbmParams, GradientBoostingRegressor};
use crate::metrics::EvalMetrics;
use crate::tree::RegressionTree;
use analysis_core::FEATURE_COLUMNS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MODEL_TYPE: &str = "gradient_boosted_regressor";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_type: String,
    pub feature_names: Vec<String>,
    pub n_features: usize,
    pub params: GbmParams,
    pub init_value: f64,
    pub trees: Vec<RegressionTree>,
    pub trained_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<EvalMetrics>,
}

impl ModelArtifact {
    pub fn from_model(model: &GradientBoostingRegressor, metrics: Option<EvalMetrics>) -> MLResult<Self> {
        if !model.is_trained() {
            return Err(MLError::NotTrained);
        }
        if model.n_features() != FEATURE_COLUMNS.len() {
            return Err(MLError::InvalidData(format!(
                "model has {} features, expected {}",
                model.n_features(),
                FEATURE_COLUMNS.len()
            )));
        }
        Ok(Self {
            model_type: MODEL_TYPE.to_string(),
            feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            n_features: model.n_features(),
            params: *model.params(),
            init_value: model.init_value(),
            trees: model.trees().to_vec(),
            trained_at: Utc::now(),
            metrics,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> MLResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!("Saved model artifact to {} ({} trees)", path.display(), self.trees.len());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> MLResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> MLResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the artifact and rebuild the ensemble.
    pub fn into_model(self) -> MLResult<GradientBoostingRegressor> {
        if self.model_type != MODEL_TYPE {
            return Err(MLError::InvalidArtifact(format!(
                "expected model_type '{}', got '{}'",
                MODEL_TYPE, self.model_type
            )));
        }
        if self.feature_names.len() != FEATURE_COLUMNS.len()
            || self.feature_names.iter().zip(FEATURE_COLUMNS.iter()).any(|(a, b)| a != b)
        {
            return Err(MLError::InvalidArtifact(format!(
                "feature layout {:?} does not match {:?}",
                self.feature_names, FEATURE_COLUMNS
            )));
        }
        if self.n_features != FEATURE_COLUMNS.len() {
            return Err(MLError::InvalidArtifact(format!(
                "n_features is {}, expected {}",
                self.n_features,
                FEATURE_COLUMNS.len()
            )));
        }
        if self.trees.len() != self.params.n_estimators {
            return Err(MLError::InvalidArtifact(format!(
                "n_estimators ({}) doesn't match tree count ({})",
                self.params.n_estimators,
                self.trees.len()
            )));
        }
        GradientBoostingRegressor::from_parts(self.params, self.init_value, self.trees, self.n_features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Regressor;

    fn trained() -> GradientBoostingRegressor {
        let x: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let f = i as f64;
                vec![100.0 + f, (f / 40.0), -(f % 3.0) / 3.0, (f % 5.0) / 5.0, 0.1]
            })
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 2.0 * r[1] + r[2]).collect();
        let mut model = GradientBoostingRegressor::new(GbmParams {
            n_estimators: 12,
            ..GbmParams::default()
        });
        model.fit(&x, &y).unwrap();
        model
    }

    #[test]
    fn test_save_load_preserves_predictions() {
        let model = trained();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("stock_model.json");

        ModelArtifact::from_model(&model, None).unwrap().save(&path).unwrap();
        let restored = ModelArtifact::load(&path).unwrap().into_model().unwrap();

        let row = [150.0, 0.4, -0.2, 0.2, 0.1];
        assert_eq!(model.predict_row(&row).to_bits(), restored.predict_row(&row).to_bits());
    }

    #[test]
    fn test_rejects_wrong_feature_layout() {
        let mut artifact = ModelArtifact::from_model(&trained(), None).unwrap();
        artifact.feature_names.swap(1, 2);
        assert!(matches!(artifact.into_model(), Err(MLError::InvalidArtifact(_))));
    }

    #[test]
    fn test_rejects_wrong_model_type() {
        let mut artifact = ModelArtifact::from_model(&trained(), None).unwrap();
        artifact.model_type = "random_forest".to_string();
        assert!(artifact.into_model().is_err());
    }

    #[test]
    fn test_rejects_truncated_ensemble() {
        let mut artifact = ModelArtifact::from_model(&trained(), None).unwrap();
        artifact.trees.pop();
        assert!(artifact.into_model().is_err());
    }

    #[test]
    fn test_untrained_model_cannot_be_saved() {
        let model = GradientBoostingRegressor::new(GbmParams::default());
        assert!(matches!(ModelArtifact::from_model(&model, None), Err(MLError::NotTrained)));
    }

    #[test]
    fn test_garbage_json_is_an_error() {
        assert!(ModelArtifact::from_json_str("{ not json").is_err());
    }
}
