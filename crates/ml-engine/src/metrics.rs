use analysis_core::stats::{mean_absolute_error, r2_score};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Held-out regression metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub n_samples: usize,
}

impl EvalMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        let n = y_true.len().min(y_pred.len());
        let mse = if n == 0 {
            0.0
        } else {
            y_true
                .iter()
                .zip(y_pred)
                .map(|(t, p)| (t - p).powi(2))
                .sum::<f64>()
                / n as f64
        };
        Self {
            mae: mean_absolute_error(y_true, y_pred),
            rmse: mse.sqrt(),
            r2: r2_score(y_true, y_pred),
            n_samples: n,
        }
    }
}

impl fmt::Display for EvalMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE={:.4} RMSE={:.4} R2={:.4} (n={})",
            self.mae, self.rmse, self.r2, self.n_samples
        )
    }
}
