//! Model input assembly.
//!
//! [`assemble`] is the single place where the feature columns are laid out.
//! The live path ([`FeatureBuilder::build`]) and the training path
//! ([`training_features`]) both go through it.
//!
//! The two paths deliberately differ in which text feeds relevance: live
//! requests score both sides against the one joined headline blob with the
//! symbol/industry/sector terms, while training rows score each side against
//! that day's sign-filtered blob with the full term list. The fitted model
//! expects this distribution, so changing either side requires retraining.

use crate::aggregate::{canonical_blob, DailyNews};
use crate::reference::ReferenceTable;
use crate::relevance::{RelevancePair, SubjectTerms};
use analysis_core::{CoreResult, FeatureVector, PredictionError, ReferenceEntry, SentimentScorer};
use sentiment_analysis::SentimentSplit;
use std::sync::Arc;

/// Lay out one model input row.
pub fn assemble(
    open_price: f64,
    positive_sentiment: f64,
    negative_sentiment: f64,
    relevance: RelevancePair,
) -> FeatureVector {
    FeatureVector {
        open_price,
        positive_sentiment,
        negative_sentiment,
        positive_relevance: relevance.positive.clamp(0.0, 1.0),
        negative_relevance: relevance.negative.clamp(0.0, 1.0),
    }
}

/// Training row for one (symbol, date). A missing open is carried as NaN and
/// imputed later with the column mean.
pub fn training_features(open: Option<f64>, entry: &ReferenceEntry, day: &DailyNews) -> FeatureVector {
    let terms = SubjectTerms::for_training(entry);
    let relevance = RelevancePair::score(&terms, &day.positive_text, &day.negative_text);
    assemble(
        open.unwrap_or(f64::NAN),
        day.positive_sentiment,
        day.negative_sentiment,
        relevance,
    )
}

/// Live features plus the sentiment they were derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceFeatures {
    pub vector: FeatureVector,
    pub sentiment: SentimentSplit,
}

/// Builds live feature vectors from already-fetched inputs.
pub struct FeatureBuilder {
    reference: ReferenceTable,
    scorer: Arc<dyn SentimentScorer>,
}

impl FeatureBuilder {
    pub fn new(reference: ReferenceTable, scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { reference, scorer }
    }

    pub fn reference(&self) -> &ReferenceTable {
        &self.reference
    }

    /// Build the feature vector for `symbol` at `open_price` given `headlines`.
    ///
    /// Fails with `UnknownSymbol` when the symbol is not in the reference table
    /// and with `InvalidOpenPrice` unless the price is finite and positive.
    /// An empty headline list is valid and yields zero sentiment and relevance.
    pub fn build<S: AsRef<str>>(
        &self,
        open_price: f64,
        symbol: &str,
        headlines: &[S],
    ) -> CoreResult<InferenceFeatures> {
        let entry = self.reference.get(symbol)?;

        if !open_price.is_finite() || open_price <= 0.0 {
            return Err(PredictionError::InvalidOpenPrice(format!(
                "{} for {}",
                open_price, symbol
            )));
        }

        let blob = canonical_blob(headlines);
        let sentiment = SentimentSplit::score(self.scorer.as_ref(), &blob);

        let terms = SubjectTerms::for_inference(entry);
        let relevance = RelevancePair::score(&terms, &blob, &blob);

        let vector = assemble(open_price, sentiment.positive, sentiment.negative, relevance);
        tracing::debug!(symbol = %symbol, ?vector, "Built inference features");

        Ok(InferenceFeatures { vector, sentiment })
    }
}
