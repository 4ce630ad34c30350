//! Feature pipeline shared by training and inference.
//!
//! Both paths build their model inputs through this crate so that column
//! order and scaling cannot drift between the fitted model and live requests.

pub mod aggregate;
pub mod builder;
pub mod reference;
pub mod relevance;

pub use aggregate::{aggregate_by_date, canonical_blob, DailyNews};
pub use builder::{assemble, training_features, FeatureBuilder, InferenceFeatures};
pub use reference::ReferenceTable;
pub use relevance::{relevance, RelevancePair, SubjectTerms};
