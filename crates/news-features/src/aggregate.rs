//! Per-date aggregation of a historical headline corpus.

use analysis_core::{NewsItem, SentimentScorer};
use chrono::NaiveDate;
use rayon::prelude::*;
use sentiment_analysis::SentimentSplit;
use std::collections::BTreeMap;

/// Join headlines in a canonical (sorted) order so the resulting text does not
/// depend on the order the headlines arrived in.
pub fn canonical_blob<S: AsRef<str>>(headlines: &[S]) -> String {
    let mut sorted: Vec<&str> = headlines.iter().map(|h| h.as_ref()).collect();
    sorted.sort_unstable();
    sorted.join(" ")
}

/// Sentiment totals and sign-filtered text for one calendar day of news.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyNews {
    /// Sum of the positive components of every headline that day.
    pub positive_sentiment: f64,
    /// Sum of the negative components of every headline that day.
    pub negative_sentiment: f64,
    /// Headlines whose own compound score was positive.
    pub positive_text: String,
    /// Headlines whose own compound score was negative.
    pub negative_text: String,
    pub headline_count: usize,
}

/// Score every dated headline and group the results by date.
/// Undated items are skipped.
pub fn aggregate_by_date(
    items: &[NewsItem],
    scorer: &dyn SentimentScorer,
) -> BTreeMap<NaiveDate, DailyNews> {
    let scored: Vec<(NaiveDate, &str, SentimentSplit)> = items
        .par_iter()
        .filter_map(|item| {
            let date = item.date?;
            let split = SentimentSplit::score(scorer, &item.headline);
            Some((date, item.headline.as_str(), split))
        })
        .collect();

    struct Accumulator<'a> {
        positive_sentiment: f64,
        negative_sentiment: f64,
        positive_headlines: Vec<&'a str>,
        negative_headlines: Vec<&'a str>,
        count: usize,
    }

    let mut by_date: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for (date, headline, split) in scored {
        let acc = by_date.entry(date).or_insert_with(|| Accumulator {
            positive_sentiment: 0.0,
            negative_sentiment: 0.0,
            positive_headlines: Vec::new(),
            negative_headlines: Vec::new(),
            count: 0,
        });
        acc.positive_sentiment += split.positive;
        acc.negative_sentiment += split.negative;
        if split.is_positive() {
            acc.positive_headlines.push(headline);
        } else if split.is_negative() {
            acc.negative_headlines.push(headline);
        }
        acc.count += 1;
    }

    tracing::debug!("Aggregated {} headlines into {} dates", items.len(), by_date.len());

    by_date
        .into_iter()
        .map(|(date, acc)| {
            (
                date,
                DailyNews {
                    positive_sentiment: acc.positive_sentiment,
                    negative_sentiment: acc.negative_sentiment,
                    positive_text: canonical_blob(&acc.positive_headlines),
                    negative_text: canonical_blob(&acc.negative_headlines),
                    headline_count: acc.count,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keyword scorer: "good" is +0.5, "bad" is -0.5 per occurrence.
    struct KeywordScorer;

    impl SentimentScorer for KeywordScorer {
        fn compound(&self, text: &str) -> f64 {
            let lower = text.to_lowercase();
            let good = lower.matches("good").count() as f64;
            let bad = lower.matches("bad").count() as f64;
            ((good - bad) * 0.5).clamp(-1.0, 1.0)
        }
    }

    fn item(date: Option<(i32, u32, u32)>, headline: &str) -> NewsItem {
        NewsItem {
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            headline: headline.to_string(),
        }
    }

    #[test]
    fn test_canonical_blob_is_order_independent() {
        let a = canonical_blob(&["b headline", "a headline", "c headline"]);
        let b = canonical_blob(&["c headline", "b headline", "a headline"]);
        assert_eq!(a, b);
        assert_eq!(a, "a headline b headline c headline");
        assert_eq!(canonical_blob::<&str>(&[]), "");
    }

    #[test]
    fn test_aggregate_splits_by_sign() {
        let items = vec![
            item(Some((2015, 1, 5)), "good earnings"),
            item(Some((2015, 1, 5)), "bad weather"),
            item(Some((2015, 1, 5)), "neutral filing"),
            item(Some((2015, 1, 6)), "good good day"),
            item(None, "good but undated"),
        ];
        let days = aggregate_by_date(&items, &KeywordScorer);
        assert_eq!(days.len(), 2);

        let jan5 = &days[&NaiveDate::from_ymd_opt(2015, 1, 5).unwrap()];
        assert_eq!(jan5.headline_count, 3);
        assert!((jan5.positive_sentiment - 0.5).abs() < 1e-12);
        assert!((jan5.negative_sentiment + 0.5).abs() < 1e-12);
        assert_eq!(jan5.positive_text, "good earnings");
        assert_eq!(jan5.negative_text, "bad weather");

        let jan6 = &days[&NaiveDate::from_ymd_opt(2015, 1, 6).unwrap()];
        assert!((jan6.positive_sentiment - 1.0).abs() < 1e-12);
        assert_eq!(jan6.negative_sentiment, 0.0);
        assert_eq!(jan6.negative_text, "");
    }

    #[test]
    fn test_aggregate_text_is_sorted() {
        let items = vec![
            item(Some((2016, 2, 1)), "zeta good"),
            item(Some((2016, 2, 1)), "alpha good"),
        ];
        let days = aggregate_by_date(&items, &KeywordScorer);
        let day = days.values().next().unwrap();
        assert_eq!(day.positive_text, "alpha good zeta good");
    }
}
