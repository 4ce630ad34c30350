//! data-loader: Build the news-sentiment training table and fit the percent-change model.
//!
//! Joins daily price history with company reference data and a dated headline
//! corpus, computes the five model features per (symbol, date), and writes a
//! gradient boosting artifact for the API server to load.
//!
//! Usage:
//!   cargo run -p data-loader -- --prices sp500_stocks.csv --companies sp500_companies.csv \
//!       --news News_Category_Dataset_v3.json
//!   cargo run -p data-loader -- ... --compare            # also score the other candidates
//!   cargo run -p data-loader -- ... --from 2014-01-01 --to 2020-01-01 --out models/m.json

mod dataset;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use dataset::{assemble_dataset, load_companies, load_news, load_prices, parse_date, DateWindow};
use ml_engine::{compare_candidates, train_gradient_boosting, GbmParams, ModelArtifact, SplitConfig, TrainingSet};
use news_features::aggregate_by_date;
use sentiment_analysis::VaderScorer;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DEFAULT_FROM: &str = "2012-01-01";
const DEFAULT_TO: &str = "2022-01-01";
const DEFAULT_OUT: &str = "models/stock_model.json";

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn parsed_flag<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> anyhow::Result<T> {
    match flag_value(args, name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid value '{}' for {}", raw, name)),
        None => Ok(default),
    }
}

fn date_flag(args: &[String], name: &str, default: &str) -> anyhow::Result<NaiveDate> {
    let raw = flag_value(args, name).unwrap_or(default);
    parse_date(raw).with_context(|| format!("Invalid date '{}' for {}", raw, name))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  data-loader --prices FILE --companies FILE --news FILE [options]");
    eprintln!();
    eprintln!("Inputs:");
    eprintln!("  --prices FILE        Price history CSV (Symbol, Date, Open, Close)");
    eprintln!("  --companies FILE     Company CSV (Symbol, Shortname, Longname, Sector, Industry)");
    eprintln!("  --news FILE          Newline-delimited JSON headlines (date, headline)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --out PATH           Model artifact path (default: {})", DEFAULT_OUT);
    eprintln!("  --from DATE          First date included (default: {})", DEFAULT_FROM);
    eprintln!("  --to DATE            First date excluded (default: {})", DEFAULT_TO);
    eprintln!("  --test-size F        Held-out fraction (default: 0.2)");
    eprintln!("  --seed N             Split seed (default: 42)");
    eprintln!("  --n-estimators N     Boosting rounds (default: 100)");
    eprintln!("  --max-depth N        Tree depth (default: 3)");
    eprintln!("  --learning-rate F    Shrinkage (default: 0.1)");
    eprintln!("  --compare            Also fit linear, tree and forest candidates and log metrics");
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "data_loader=info,ml_engine=info,news_features=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let (Some(prices_path), Some(companies_path), Some(news_path)) = (
        flag_value(&args, "--prices"),
        flag_value(&args, "--companies"),
        flag_value(&args, "--news"),
    ) else {
        print_usage();
        std::process::exit(1);
    };

    let window = DateWindow {
        from: date_flag(&args, "--from", DEFAULT_FROM)?,
        to: date_flag(&args, "--to", DEFAULT_TO)?,
    };
    if window.from >= window.to {
        bail!("--from {} must be before --to {}", window.from, window.to);
    }

    let out = PathBuf::from(flag_value(&args, "--out").unwrap_or(DEFAULT_OUT));
    let compare = args.iter().any(|a| a == "--compare");
    let split = SplitConfig {
        test_size: parsed_flag(&args, "--test-size", 0.2)?,
        seed: parsed_flag(&args, "--seed", 42)?,
    };
    let defaults = GbmParams::default();
    let params = GbmParams {
        n_estimators: parsed_flag(&args, "--n-estimators", defaults.n_estimators)?,
        max_depth: parsed_flag(&args, "--max-depth", defaults.max_depth)?,
        learning_rate: parsed_flag(&args, "--learning-rate", defaults.learning_rate)?,
        ..defaults
    };
    params.validate().context("Invalid model parameters")?;

    let start = Instant::now();

    let prices = load_prices(Path::new(prices_path))?;
    tracing::info!("Loaded {} price rows from {}", prices.len(), prices_path);

    let reference = load_companies(Path::new(companies_path))?;

    let news = load_news(Path::new(news_path))?;
    tracing::info!("Loaded {} dated headlines from {}", news.len(), news_path);

    let scorer = VaderScorer::new();
    let days = aggregate_by_date(&news, &scorer);
    tracing::info!("Scored headlines into {} news days", days.len());

    let data = assemble_dataset(&prices, &reference, &days, window)?;
    tracing::info!(
        "Training table: {} rows ({} price rows in {}..{}, {} without company data, {} without news)",
        data.features.len(),
        data.price_rows_in_window,
        window.from,
        window.to,
        data.missing_symbol_rows,
        data.missing_news_rows
    );

    let set = TrainingSet::new(&data.features, data.labels)?;

    if compare {
        let results = compare_candidates(&set, params, split)?;
        if let Some((best, metrics)) = results
            .iter()
            .min_by(|a, b| a.1.mae.total_cmp(&b.1.mae))
        {
            tracing::info!("Lowest MAE: {} ({})", best, metrics);
        }
    }

    let outcome = train_gradient_boosting(&set, params, split)?;
    let artifact = ModelArtifact::from_model(&outcome.model, Some(outcome.metrics))?;
    artifact
        .save(&out)
        .with_context(|| format!("Failed to write model to {}", out.display()))?;

    tracing::info!(
        "Done in {:.1}s: {} training rows, held-out {}",
        start.elapsed().as_secs_f64(),
        outcome.n_train,
        outcome.metrics
    );
    Ok(())
}
