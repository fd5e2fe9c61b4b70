//! OfferScope — offer A/B test comparison dashboard.
//!
//! Loads a warehouse export of first-purchase/first-show events, runs the
//! offer comparison pipeline, and renders the comparison tables.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;

use offerscope_core::config::AppConfig;
use offerscope_core::types::{EventDataset, RawOfferEvent};
use offerscope_render::{DivergingScale, RenderTable, ValueFormat};
use offerscope_reporting::{CompareParams, OfferComparisonReport, ReportStore};

#[derive(Parser, Debug)]
#[command(name = "offerscope")]
#[command(about = "Offer A/B test comparison dashboard")]
#[command(version)]
struct Cli {
    /// JSON file with an array of offer event records
    records: PathBuf,

    /// Retention window in days (overrides config)
    #[arg(long, env = "OFFERSCOPE__PIPELINE__WINDOW_DAYS")]
    window_days: Option<i64>,

    /// Number of offers to compare beyond the allow-list (overrides config)
    #[arg(long, env = "OFFERSCOPE__PIPELINE__TOP_N_OFFERS")]
    top_n: Option<usize>,

    /// Keep only records from this platform
    #[arg(long)]
    platform: Option<String>,

    /// Keep only records from these country tiers (repeatable)
    #[arg(long = "country-tier")]
    country_tiers: Vec<String>,

    /// Offer ids that always keep their own bucket (repeatable; overrides
    /// the configured allow-list when given)
    #[arg(long = "always-keep")]
    always_keep: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offerscope=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let params = CompareParams {
        window_days: cli.window_days.unwrap_or(config.pipeline.window_days),
        top_n_offers: cli.top_n.unwrap_or(config.pipeline.top_n_offers),
        always_keep: if cli.always_keep.is_empty() {
            config.pipeline.always_keep.iter().cloned().collect()
        } else {
            cli.always_keep.iter().cloned().collect()
        },
    };

    let raw = fs::read_to_string(&cli.records)
        .with_context(|| format!("reading records file {}", cli.records.display()))?;
    let mut records: Vec<RawOfferEvent> =
        serde_json::from_str(&raw).context("parsing records file")?;

    if let Some(platform) = &cli.platform {
        records.retain(|r| r.platform.as_deref() == Some(platform.as_str()));
    }
    if !cli.country_tiers.is_empty() {
        records.retain(|r| {
            r.country_tier
                .as_deref()
                .is_some_and(|tier| cli.country_tiers.iter().any(|t| t == tier))
        });
    }
    info!(
        records = records.len(),
        show_event = %config.pipeline.show_event,
        "Loaded event records"
    );

    let dataset = EventDataset::from_records(records)?;
    let store = ReportStore::new();
    let dataset_id = store.register_dataset(dataset);
    let report = store.compare(&dataset_id, params)?;

    match cli.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for table in render_report(&report, &config) {
                println!("{}", table.to_text());
            }
        }
    }

    Ok(())
}

/// Shape every report table, substituting skip placeholders where the
/// pipeline had no data.
fn render_report(report: &OfferComparisonReport, config: &AppConfig) -> Vec<RenderTable> {
    let share_scale = DivergingScale::symmetric(config.highlight.share_range);
    let time_scale = DivergingScale::inverted(config.highlight.time_range);

    let skip_reason = |table: &str| {
        report
            .skipped
            .iter()
            .find(|s| s.table == table)
            .map(|s| s.reason.clone())
            .unwrap_or_else(|| "not computed".to_string())
    };

    let mut tables = Vec::new();

    tables.push(match &report.revenue_share {
        Some(table) => RenderTable::revenue(
            "Revenue per offer, % from total",
            table,
            ValueFormat::Percent2,
            &share_scale,
        ),
        None => RenderTable::skipped("Revenue per offer, % from total", &skip_reason("revenue share")),
    });

    tables.push(match &report.paying_share {
        Some(rows) => {
            RenderTable::comparison("Paying share, %", rows, ValueFormat::Percent2, &share_scale)
        }
        None => RenderTable::skipped("Paying share, %", &skip_reason("paying share")),
    });

    tables.push(match &report.payment_latency {
        Some(rows) => {
            RenderTable::comparison("Payment time, hours", rows, ValueFormat::Hours1, &time_scale)
        }
        None => RenderTable::skipped("Payment time, hours", &skip_reason("payment latency")),
    });

    tables.push(match &report.first_show_latency {
        Some(rows) => RenderTable::comparison(
            "First show time, hours",
            rows,
            ValueFormat::Hours0,
            &time_scale,
        ),
        None => RenderTable::skipped("First show time, hours", &skip_reason("first show latency")),
    });

    tables.push(RenderTable::prices("Offer prices", &report.offer_prices));

    tables
}
