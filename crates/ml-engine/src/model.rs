use crate::error::{MLError, MLResult};

/// A regression model over fixed-width numeric rows.
pub trait Regressor: Send + Sync {
    fn name(&self) -> &str;

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> MLResult<()>;

    fn predict_row(&self, row: &[f64]) -> f64;

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Check shapes and values of a training set. Returns the row width.
pub fn validate_training_data(x: &[Vec<f64>], y: &[f64]) -> MLResult<usize> {
    if x.is_empty() {
        return Err(MLError::InvalidData("empty training set".to_string()));
    }
    if x.len() != y.len() {
        return Err(MLError::InvalidData(format!(
            "{} feature rows but {} labels",
            x.len(),
            y.len()
        )));
    }

    let width = x[0].len();
    if width == 0 {
        return Err(MLError::InvalidData("rows have no features".to_string()));
    }
    for (i, row) in x.iter().enumerate() {
        if row.len() != width {
            return Err(MLError::InvalidData(format!(
                "row {} has {} features, expected {}",
                i,
                row.len(),
                width
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(MLError::InvalidData(format!("row {} has non-finite features", i)));
        }
    }
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return Err(MLError::InvalidData(format!("label {} is non-finite", i)));
    }

    Ok(width)
}
