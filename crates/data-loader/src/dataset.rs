//! Loading the historical inputs and joining them into a training table.

use analysis_core::stats::fill_with_mean;
use analysis_core::{FeatureVector, HistoricalPricePoint, NewsItem, N_FEATURES};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use news_features::{training_features, DailyNews, ReferenceTable};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Half-open date range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date < self.to
    }
}

/// Accepts `YYYY-MM-DD` with an optional time suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[derive(Debug, Deserialize)]
struct PriceRecord {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open", default)]
    open: Option<f64>,
    #[serde(rename = "Close", default)]
    close: Option<f64>,
}

pub fn load_prices(path: &Path) -> Result<Vec<HistoricalPricePoint>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_prices(file).with_context(|| format!("Failed to read prices from {}", path.display()))
}

/// Price history CSV (`Symbol,Date,Open,Close`, extra columns ignored, blank
/// price cells allowed).
pub fn read_prices<R: Read>(reader: R) -> Result<Vec<HistoricalPricePoint>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut points = Vec::new();

    for (i, record) in csv_reader.deserialize::<PriceRecord>().enumerate() {
        let record = record.with_context(|| format!("Bad price row {}", i + 1))?;
        let date = parse_date(&record.date)
            .with_context(|| format!("Bad date '{}' on price row {}", record.date, i + 1))?;
        points.push(HistoricalPricePoint {
            symbol: record.symbol.trim().to_uppercase(),
            date,
            open: record.open,
            close: record.close,
        });
    }
    Ok(points)
}

pub fn load_companies(path: &Path) -> Result<ReferenceTable> {
    ReferenceTable::load_csv(path).with_context(|| format!("Failed to load companies from {}", path.display()))
}

#[derive(Debug, Deserialize)]
struct NewsRecord {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    headline: Option<String>,
}

pub fn load_news(path: &Path) -> Result<Vec<NewsItem>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_news(BufReader::new(file)).with_context(|| format!("Failed to read news from {}", path.display()))
}

/// Newline-delimited JSON news corpus. Only `date` and `headline` are used;
/// records missing either are dropped.
pub fn read_news<R: BufRead>(reader: R) -> Result<Vec<NewsItem>> {
    let mut items = Vec::new();
    let mut dropped = 0usize;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: NewsRecord =
            serde_json::from_str(&line).with_context(|| format!("Bad JSON on news line {}", i + 1))?;

        let date = record.date.as_deref().and_then(parse_date);
        match (date, record.headline) {
            (Some(date), Some(headline)) if !headline.trim().is_empty() => items.push(NewsItem {
                date: Some(date),
                headline,
            }),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::warn!("Dropped {} news records without a date or headline", dropped);
    }
    Ok(items)
}

/// Imputed feature rows and labels ready for fitting.
#[derive(Debug, Default)]
pub struct AssembledDataset {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<f64>,
    pub price_rows_in_window: usize,
    pub missing_symbol_rows: usize,
    pub missing_news_rows: usize,
}

/// Inner-join price rows with the reference table (on symbol) and the per-date
/// news aggregates (on date), compute one feature row per match, then fill
/// missing values column by column with the column mean.
pub fn assemble_dataset(
    prices: &[HistoricalPricePoint],
    reference: &ReferenceTable,
    days: &BTreeMap<NaiveDate, DailyNews>,
    window: DateWindow,
) -> Result<AssembledDataset> {
    let in_window: Vec<&HistoricalPricePoint> =
        prices.iter().filter(|p| window.contains(p.date)).collect();

    let mut missing_symbol_rows = 0usize;
    let mut missing_news_rows = 0usize;
    let mut joined = Vec::with_capacity(in_window.len());
    for point in &in_window {
        let Ok(entry) = reference.get(&point.symbol) else {
            missing_symbol_rows += 1;
            continue;
        };
        let Some(day) = days.get(&point.date) else {
            missing_news_rows += 1;
            continue;
        };
        joined.push((*point, entry, day));
    }

    if joined.is_empty() {
        bail!(
            "No rows left after joining {} price rows in {}..{} with companies and news",
            in_window.len(),
            window.from,
            window.to
        );
    }

    let raw: Vec<(FeatureVector, Option<f64>)> = joined
        .par_iter()
        .map(|(point, entry, day)| (training_features(point.open, entry, day), point.percent_change()))
        .collect();

    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(raw.len()); N_FEATURES];
    let mut labels = Vec::with_capacity(raw.len());
    for (features, label) in &raw {
        for (column, value) in columns.iter_mut().zip(features.to_array()) {
            column.push(Some(value));
        }
        labels.push(*label);
    }

    let filled: Vec<Vec<f64>> = columns.iter().map(|c| fill_with_mean(c)).collect();
    let features = (0..raw.len())
        .map(|row| {
            let mut values = [0.0; N_FEATURES];
            for (col, value) in values.iter_mut().enumerate() {
                *value = filled[col][row];
            }
            FeatureVector::from_array(values)
        })
        .collect();

    Ok(AssembledDataset {
        features,
        labels: fill_with_mean(&labels),
        price_rows_in_window: in_window.len(),
        missing_symbol_rows,
        missing_news_rows,
    })
}
