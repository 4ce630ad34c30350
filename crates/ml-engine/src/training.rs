//! Fit and evaluate models on an assembled feature table.

use crate::error::{MLError, MLResult};
use crate::forest::RandomForestRegressor;
use crate::gbm::{GbmParams, GradientBoostingRegressor};
use crate::linear::LinearRegression;
use crate::metrics::EvalMetrics;
use crate::model::Regressor;
use crate::split::{take, train_test_split, SplitIndices};
use crate::tree::{DecisionTreeRegressor, TreeParams};
use analysis_core::FeatureVector;
use tracing::info;

/// Feature rows with their percent-change labels, already imputed.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    rows: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl TrainingSet {
    pub fn new(features: &[FeatureVector], labels: Vec<f64>) -> MLResult<Self> {
        if features.len() != labels.len() {
            return Err(MLError::InvalidData(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        Ok(Self {
            rows: features.iter().map(|f| f.to_array().to_vec()).collect(),
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    fn partition(&self, split: &SplitIndices) -> Partition {
        Partition {
            x_train: take(&self.rows, &split.train),
            y_train: take(&self.labels, &split.train),
            x_test: take(&self.rows, &split.test),
            y_test: take(&self.labels, &split.test),
        }
    }
}

struct Partition {
    x_train: Vec<Vec<f64>>,
    y_train: Vec<f64>,
    x_test: Vec<Vec<f64>>,
    y_test: Vec<f64>,
}

impl Partition {
    fn fit_and_score(&self, model: &mut dyn Regressor) -> MLResult<EvalMetrics> {
        model.fit(&self.x_train, &self.y_train)?;
        let predictions = model.predict(&self.x_test);
        Ok(EvalMetrics::compute(&self.y_test, &predictions))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SplitConfig {
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: GradientBoostingRegressor,
    pub metrics: EvalMetrics,
    pub n_train: usize,
}

/// Fit gradient boosting on the training partition and score it on the held-out rows.
pub fn train_gradient_boosting(
    set: &TrainingSet,
    params: GbmParams,
    split: SplitConfig,
) -> MLResult<TrainingOutcome> {
    let indices = train_test_split(set.len(), split.test_size, split.seed)?;
    let partition = set.partition(&indices);

    info!(
        "Training gradient boosting on {} rows, holding out {} ({} estimators, lr {}, depth {})",
        partition.y_train.len(),
        partition.y_test.len(),
        params.n_estimators,
        params.learning_rate,
        params.max_depth
    );

    let mut model = GradientBoostingRegressor::new(params);
    let metrics = partition.fit_and_score(&mut model)?;
    info!("Gradient boosting held-out metrics: {}", metrics);

    Ok(TrainingOutcome {
        model,
        metrics,
        n_train: partition.y_train.len(),
    })
}

/// Fit every comparison candidate on the same split and report held-out metrics.
pub fn compare_candidates(
    set: &TrainingSet,
    params: GbmParams,
    split: SplitConfig,
) -> MLResult<Vec<(String, EvalMetrics)>> {
    let indices = train_test_split(set.len(), split.test_size, split.seed)?;
    let partition = set.partition(&indices);

    let mut candidates: Vec<Box<dyn Regressor>> = vec![
        Box::new(LinearRegression::new()),
        Box::new(DecisionTreeRegressor::new(TreeParams::default())),
        Box::new(RandomForestRegressor::new(100, TreeParams::default(), split.seed)),
        Box::new(GradientBoostingRegressor::new(params)),
    ];

    let mut results = Vec::with_capacity(candidates.len());
    for model in candidates.iter_mut() {
        let metrics = partition.fit_and_score(model.as_mut())?;
        info!("{:<20} MAE={:.4} R2={:.4}", model.name(), metrics.mae, metrics.r2);
        results.push((model.name().to_string(), metrics));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// label = 4*pos_sent + 2*neg_sent + 3*pos_rel - neg_rel
    fn synthetic(n: usize) -> TrainingSet {
        let mut features = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let f = i as f64;
            let v = FeatureVector {
                open_price: 50.0 + (i % 17) as f64,
                positive_sentiment: ((i * 7) % 10) as f64 / 10.0,
                negative_sentiment: -(((i * 3) % 10) as f64) / 10.0,
                positive_relevance: ((i * 11) % 13) as f64 / 13.0,
                negative_relevance: (f % 5.0) / 5.0,
            };
            labels.push(
                4.0 * v.positive_sentiment + 2.0 * v.negative_sentiment + 3.0 * v.positive_relevance
                    - v.negative_relevance,
            );
            features.push(v);
        }
        TrainingSet::new(&features, labels).unwrap()
    }

    #[test]
    fn test_training_round_trip_fits_known_relation() {
        let set = synthetic(400);
        let params = GbmParams {
            n_estimators: 300,
            ..GbmParams::default()
        };
        let outcome = train_gradient_boosting(&set, params, SplitConfig::default()).unwrap();
        assert_eq!(outcome.n_train, 320);
        assert_eq!(outcome.metrics.n_samples, 80);

        let predictions = outcome.model.predict(set.rows());
        let fit = EvalMetrics::compute(set.labels(), &predictions);
        assert!(fit.r2 > 0.95, "r2 was {}", fit.r2);
        assert!(fit.mae < 0.5, "mae was {}", fit.mae);
        assert!(predictions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_training_is_deterministic() {
        let set = synthetic(120);
        let params = GbmParams {
            n_estimators: 20,
            ..GbmParams::default()
        };
        let a = train_gradient_boosting(&set, params, SplitConfig::default()).unwrap();
        let b = train_gradient_boosting(&set, params, SplitConfig::default()).unwrap();
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn test_compare_candidates_reports_all_models() {
        let set = synthetic(150);
        let params = GbmParams {
            n_estimators: 30,
            ..GbmParams::default()
        };
        let results = compare_candidates(&set, params, SplitConfig::default()).unwrap();
        let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["Linear Regression", "Decision Tree", "Random Forest", "Gradient Boosting"]
        );
        // the relation is linear, so OLS should be near-perfect
        assert!(results[0].1.r2 > 0.999);
    }

    #[test]
    fn test_mismatched_lengths() {
        let v = FeatureVector::from_array([1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(TrainingSet::new(&[v], vec![]).is_err());
    }

    #[test]
    fn test_too_few_rows() {
        let v = FeatureVector::from_array([1.0, 0.0, 0.0, 0.0, 0.0]);
        let set = TrainingSet::new(&[v], vec![1.0]).unwrap();
        assert!(train_gradient_boosting(&set, GbmParams::default(), SplitConfig::default()).is_err());
    }
}
