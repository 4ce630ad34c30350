//! Small statistics helpers shared by the training pipeline and model evaluation.

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Mean of the present, finite values. `None` when there are none.
pub fn mean_of_present(data: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = data
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(mean(&present))
    }
}

/// Replace missing or non-finite values with the column mean.
/// A column with no usable values is filled with 0.
pub fn fill_with_mean(data: &[Option<f64>]) -> Vec<f64> {
    let fill = mean_of_present(data).unwrap_or(0.0);
    data.iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => *x,
            _ => fill,
        })
        .collect()
}

/// Mean absolute error between labels and predictions.
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n as f64
}

/// Coefficient of determination. Returns 0.0 when labels have no variance.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return 0.0;
    }
    let m = mean(&y_true[..n]);
    let ss_tot: f64 = y_true[..n].iter().map(|t| (t - m).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}
