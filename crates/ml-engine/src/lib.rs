//! Native regression models for next-session percent-change prediction.
//!
//! The persisted model is a gradient boosted ensemble of CART regression
//! trees. Linear regression, a single tree and a random forest are kept as
//! comparison candidates for the training job. [`Predictor`] bundles the
//! loaded model with the feature builder for the live path.

pub mod artifact;
pub mod config;
pub mod error;
pub mod forest;
pub mod gbm;
pub mod linear;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod split;
pub mod training;
pub mod tree;

pub use artifact::ModelArtifact;
pub use config::PredictorConfig;
pub use error::{MLError, MLResult};
pub use forest::RandomForestRegressor;
pub use gbm::{GbmParams, GradientBoostingRegressor};
pub use linear::LinearRegression;
pub use metrics::EvalMetrics;
pub use model::Regressor;
pub use predictor::Predictor;
pub use split::train_test_split;
pub use training::{compare_candidates, train_gradient_boosting, SplitConfig, TrainingOutcome, TrainingSet};
pub use tree::{DecisionTreeRegressor, RegressionTree, TreeParams};
