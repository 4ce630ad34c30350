//! Headline sentiment scoring.
//!
//! Uses the VADER lexicon-and-rules analyzer (punctuation emphasis, capitalization,
//! negation, degree modifiers and "but" shifts) to produce a compound score in
//! [-1, 1], and splits that score into the positive and negative model inputs.

use analysis_core::SentimentScorer;
use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

/// VADER-backed scorer. Stateless after construction and safe to share.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        let compound = scores.get("compound").copied().unwrap_or(0.0);
        if compound.is_finite() {
            compound.clamp(-1.0, 1.0)
        } else {
            tracing::warn!("Non-finite compound score, treating as neutral");
            0.0
        }
    }
}

/// A compound score together with its sign-split components.
///
/// Exactly one of `positive`/`negative` is non-zero, unless the compound is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSplit {
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
}

impl SentimentSplit {
    pub fn from_compound(compound: f64) -> Self {
        Self {
            compound,
            positive: if compound > 0.0 { compound } else { 0.0 },
            negative: if compound < 0.0 { compound } else { 0.0 },
        }
    }

    /// Score `text` and split the result.
    pub fn score(scorer: &dyn SentimentScorer, text: &str) -> Self {
        Self::from_compound(scorer.compound(text))
    }

    pub fn is_positive(&self) -> bool {
        self.compound > 0.0
    }

    pub fn is_negative(&self) -> bool {
        self.compound < 0.0
    }
}
