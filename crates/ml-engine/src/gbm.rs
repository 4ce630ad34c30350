//! Gradient boosted regression trees with squared loss.
//!
//! Starts from the training mean and adds `n_estimators` shallow trees, each
//! fitted to the current residuals and shrunk by `learning_rate`.

use crate::error::{MLError, MLResult};
use crate::model::{validate_training_data, Regressor};
use crate::tree::{RegressionTree, TreeParams};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl GbmParams {
    pub fn validate(&self) -> MLResult<()> {
        if self.n_estimators == 0 {
            return Err(MLError::InvalidData("n_estimators must be positive".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(MLError::InvalidData(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(MLError::InvalidData("max_depth must be positive".to_string()));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: Some(self.max_depth),
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GradientBoostingRegressor {
    params: GbmParams,
    init_value: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoostingRegressor {
    pub fn new(params: GbmParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Reassemble a fitted ensemble from stored parts.
    pub fn from_parts(
        params: GbmParams,
        init_value: f64,
        trees: Vec<RegressionTree>,
        n_features: usize,
    ) -> MLResult<Self> {
        params.validate()?;
        if !init_value.is_finite() {
            return Err(MLError::InvalidArtifact("init_value is not finite".to_string()));
        }
        if trees.is_empty() {
            return Err(MLError::InvalidArtifact("ensemble has no trees".to_string()));
        }
        for tree in &trees {
            tree.validate(n_features)?;
        }
        Ok(Self {
            params,
            init_value,
            trees,
            n_features,
        })
    }

    pub fn params(&self) -> &GbmParams {
        &self.params
    }

    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl Regressor for GradientBoostingRegressor {
    fn name(&self) -> &str {
        "Gradient Boosting"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> MLResult<()> {
        self.params.validate()?;
        let width = validate_training_data(x, y)?;

        let n = y.len();
        let init_value = y.iter().sum::<f64>() / n as f64;
        let mut current = vec![init_value; n];
        let mut residuals = vec![0.0; n];
        let indices: Vec<usize> = (0..n).collect();
        let tree_params = self.params.tree_params();
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for round in 0..self.params.n_estimators {
            for i in 0..n {
                residuals[i] = y[i] - current[i];
            }
            let tree = RegressionTree::fit(x, &residuals, &indices, &tree_params);
            for i in 0..n {
                current[i] += self.params.learning_rate * tree.predict_row(&x[i]);
            }
            trees.push(tree);

            if (round + 1) % 25 == 0 {
                let mse = residuals.iter().map(|r| r * r).sum::<f64>() / n as f64;
                tracing::debug!(round = round + 1, mse, "Boosting progress");
            }
        }

        self.init_value = init_value;
        self.trees = trees;
        self.n_features = width;
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let lr = self.params.learning_rate;
        self.trees
            .iter()
            .fold(self.init_value, |acc, tree| acc + lr * tree.predict_row(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64 / n as f64, ((i * 37) % 11) as f64 / 11.0])
            .collect();
        let y = x.iter().map(|r| 3.0 * r[0] - 2.0 * r[1] + 0.5).collect();
        (x, y)
    }

    #[test]
    fn test_defaults() {
        let p = GbmParams::default();
        assert_eq!(p.n_estimators, 100);
        assert_eq!(p.learning_rate, 0.1);
        assert_eq!(p.max_depth, 3);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_fit_reduces_error() {
        let (x, y) = linear_data(200);
        let mut model = GradientBoostingRegressor::new(GbmParams::default());
        model.fit(&x, &y).unwrap();

        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let baseline: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
        let fitted: f64 = model
            .predict(&x)
            .iter()
            .zip(&y)
            .map(|(p, t)| (p - t).powi(2))
            .sum();
        assert!(fitted < baseline * 0.05, "fitted {fitted} baseline {baseline}");
        assert_eq!(model.trees().len(), 100);
        assert!((model.init_value() - mean).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y = vec![2.5; 10];
        let mut model = GradientBoostingRegressor::new(GbmParams {
            n_estimators: 5,
            ..GbmParams::default()
        });
        model.fit(&x, &y).unwrap();
        assert!((model.predict_row(&[42.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_params() {
        let (x, y) = linear_data(10);
        let mut model = GradientBoostingRegressor::new(GbmParams {
            learning_rate: 0.0,
            ..GbmParams::default()
        });
        assert!(model.fit(&x, &y).is_err());
        assert!(!model.is_trained());
    }

    #[test]
    fn test_from_parts_round_trip() {
        let (x, y) = linear_data(50);
        let params = GbmParams {
            n_estimators: 10,
            ..GbmParams::default()
        };
        let mut model = GradientBoostingRegressor::new(params);
        model.fit(&x, &y).unwrap();

        let rebuilt = GradientBoostingRegressor::from_parts(
            params,
            model.init_value(),
            model.trees().to_vec(),
            2,
        )
        .unwrap();
        for row in &x {
            assert_eq!(model.predict_row(row).to_bits(), rebuilt.predict_row(row).to_bits());
        }
        assert!(GradientBoostingRegressor::from_parts(params, f64::NAN, model.trees().to_vec(), 2).is_err());
        assert!(GradientBoostingRegressor::from_parts(params, 0.0, Vec::new(), 2).is_err());
    }
}
