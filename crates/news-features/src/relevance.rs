//! Lexical relevance of headline text to a company.
//!
//! Relevance is the number of distinct subject terms that occur as an exact,
//! case-insensitive whitespace token of the text, divided by the token count.
//! No stemming or punctuation stripping is applied, so `"apple,"` does not
//! match `"apple"` and multi-word terms such as `"consumer electronics"` never
//! match a single token.

use analysis_core::ReferenceEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lower-cased, distinct, non-empty terms describing one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectTerms {
    terms: Vec<String>,
}

impl SubjectTerms {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().to_lowercase())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    /// Terms used on the live path: symbol, industry, sector.
    pub fn for_inference(entry: &ReferenceEntry) -> Self {
        Self::new([&entry.symbol, &entry.industry, &entry.sector])
    }

    /// Terms used when building the training set: symbol, both company names,
    /// sector, industry.
    pub fn for_training(entry: &ReferenceEntry) -> Self {
        Self::new([
            &entry.symbol,
            &entry.short_name,
            &entry.long_name,
            &entry.sector,
            &entry.industry,
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Fraction of `text` tokens explained by matching subject terms, in [0, 1].
/// Empty text scores 0.
pub fn relevance(terms: &SubjectTerms, text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let vocabulary: HashSet<&str> = words.iter().copied().collect();
    let matches = terms.iter().filter(|t| vocabulary.contains(t)).count();

    (matches as f64 / words.len() as f64).clamp(0.0, 1.0)
}

/// Relevance of the positive-side and negative-side text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelevancePair {
    pub positive: f64,
    pub negative: f64,
}

impl RelevancePair {
    pub fn score(terms: &SubjectTerms, positive_text: &str, negative_text: &str) -> Self {
        Self {
            positive: relevance(terms, positive_text),
            negative: relevance(terms, negative_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> ReferenceEntry {
        ReferenceEntry {
            symbol: "AAPL".into(),
            short_name: "Apple".into(),
            long_name: "Apple Inc.".into(),
            sector: "Technology".into(),
            industry: "Consumer Electronics".into(),
        }
    }

    #[test]
    fn test_empty_text_scores_zero() {
        let terms = SubjectTerms::new(["aapl"]);
        assert_eq!(relevance(&terms, ""), 0.0);
        assert_eq!(relevance(&terms, "   "), 0.0);
    }

    #[test]
    fn test_no_match_scores_zero() {
        let terms = SubjectTerms::new(["aapl", "technology"]);
        assert_eq!(relevance(&terms, "Oil prices climb again"), 0.0);
    }

    #[test]
    fn test_exact_ratio() {
        let terms = SubjectTerms::new(["AAPL", "Technology"]);
        // 2 matching distinct terms over 5 tokens
        let score = relevance(&terms, "aapl leads technology stocks higher");
        assert!((score - 2.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_token_counts_once_per_term() {
        let terms = SubjectTerms::new(["aapl"]);
        let score = relevance(&terms, "AAPL AAPL AAPL up");
        assert!((score - 1.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_case_insensitive_but_punctuation_sensitive() {
        let terms = SubjectTerms::new(["Apple"]);
        assert!(relevance(&terms, "APPLE rallies") > 0.0);
        assert_eq!(relevance(&terms, "Apple's rally"), 0.0);
        assert_eq!(relevance(&terms, "apple, rallies"), 0.0);
    }

    #[test]
    fn test_multi_word_term_never_matches() {
        let terms = SubjectTerms::new(["Consumer Electronics"]);
        assert_eq!(relevance(&terms, "consumer electronics demand"), 0.0);
    }

    #[test]
    fn test_terms_are_distinct_and_lowercased() {
        let terms = SubjectTerms::new(["Tech", "tech", "", "TECH", "Energy"]);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms.iter().collect::<Vec<_>>(), vec!["tech", "energy"]);
    }

    #[test]
    fn test_inference_and_training_terms() {
        let entry = apple();
        let inference = SubjectTerms::for_inference(&entry);
        assert_eq!(
            inference.iter().collect::<Vec<_>>(),
            vec!["aapl", "consumer electronics", "technology"]
        );
        let training = SubjectTerms::for_training(&entry);
        assert!(training.iter().any(|t| t == "apple"));
        assert!(training.iter().any(|t| t == "apple inc."));
        assert_eq!(training.len(), 5);
    }

    #[test]
    fn test_score_never_exceeds_one() {
        let terms = SubjectTerms::new(["a", "b", "c"]);
        assert!((relevance(&terms, "a b c") - 1.0).abs() < 1e-12);
        assert!((relevance(&terms, "a") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_scores_each_side() {
        let terms = SubjectTerms::new(["aapl"]);
        let pair = RelevancePair::score(&terms, "aapl gains", "market slides");
        assert!((pair.positive - 0.5).abs() < 1e-12);
        assert_eq!(pair.negative, 0.0);
    }
}
