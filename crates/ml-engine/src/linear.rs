use crate::error::{MLError, MLResult};
use crate::model::{validate_training_data, Regressor};
use nalgebra::{DMatrix, DVector};

/// Ordinary least squares with an intercept, solved through SVD so that
/// collinear columns do not break the fit.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl Regressor for LinearRegression {
    fn name(&self) -> &str {
        "Linear Regression"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> MLResult<()> {
        let width = validate_training_data(x, y)?;
        let n = x.len();

        let design = DMatrix::from_fn(n, width + 1, |r, c| if c == 0 { 1.0 } else { x[r][c - 1] });
        let target = DVector::from_column_slice(y);

        let solution = design
            .svd(true, true)
            .solve(&target, 1e-10)
            .map_err(|e| MLError::TrainingFailed(format!("least squares solve failed: {}", e)))?;

        if solution.iter().any(|v| !v.is_finite()) {
            return Err(MLError::TrainingFailed("non-finite coefficients".to_string()));
        }

        self.intercept = solution[0];
        self.coefficients = solution.iter().skip(1).copied().collect();
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .fold(self.intercept, |acc, (w, v)| acc + w * v)
    }
}
