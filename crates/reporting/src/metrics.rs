//! Comparison metric tables — revenue share, paying share, latency medians,
//! and the offer pricing summary.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use offerscope_core::error::{OfferError, OfferResult};
use offerscope_core::types::{AbGroup, OfferBucket, OfferEvent};

use crate::taxonomy::OfferTaxonomy;

/// One bucket's metric values for control and test, plus the signed
/// difference (`test − control`). Share metrics always carry both sides
/// (an absent bucket contributes zero); latency medians leave a side `None`
/// when no measurable record exists, and the diff is `None` unless both
/// sides are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub bucket: OfferBucket,
    pub control: Option<f64>,
    pub test: Option<f64>,
    pub diff: Option<f64>,
}

/// Revenue share table plus the unrounded absolute totals per group, kept
/// for display alongside the percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueShareTable {
    pub rows: Vec<ComparisonRow>,
    pub control_total_usd: f64,
    pub test_total_usd: f64,
}

/// Descriptive pricing statistics for one bucket; no control/test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub bucket: OfferBucket,
    pub mean_usd: Option<f64>,
    pub median_usd: Option<f64>,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub(crate) fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Percentage of each group's total revenue attributable to each bucket,
/// rounded to 2 decimals. Diffs are taken over the rounded values so that
/// `control + diff == test` holds exactly on what is displayed. Rows are
/// sorted ascending by control share (ties by bucket label), and this order
/// is reused by the other comparison tables.
pub fn revenue_share(
    eligible: &[&OfferEvent],
    taxonomy: &OfferTaxonomy,
    window_days: i64,
) -> OfferResult<RevenueShareTable> {
    let mut control_sums: HashMap<OfferBucket, f64> = HashMap::new();
    let mut test_sums: HashMap<OfferBucket, f64> = HashMap::new();
    let (mut control_total, mut test_total) = (0.0, 0.0);

    for event in eligible {
        let value = event.purchase_value.unwrap_or(0.0);
        let bucket = taxonomy.bucket_for(&event.offer_id);
        match event.group {
            AbGroup::Control => {
                *control_sums.entry(bucket).or_insert(0.0) += value;
                control_total += value;
            }
            AbGroup::Test => {
                *test_sums.entry(bucket).or_insert(0.0) += value;
                test_total += value;
            }
        }
    }

    if control_total <= 0.0 || test_total <= 0.0 {
        return Err(OfferError::NoData {
            table: "revenue share".to_string(),
            window_days,
        });
    }

    let buckets: BTreeSet<OfferBucket> = control_sums
        .keys()
        .chain(test_sums.keys())
        .cloned()
        .collect();

    let mut rows: Vec<ComparisonRow> = buckets
        .into_iter()
        .map(|bucket| {
            let control =
                round_to(control_sums.get(&bucket).copied().unwrap_or(0.0) / control_total * 100.0, 2);
            let test =
                round_to(test_sums.get(&bucket).copied().unwrap_or(0.0) / test_total * 100.0, 2);
            ComparisonRow {
                bucket,
                control: Some(control),
                test: Some(test),
                diff: Some(round_to(test - control, 2)),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.control
            .unwrap_or(0.0)
            .total_cmp(&b.control.unwrap_or(0.0))
            .then_with(|| a.bucket.cmp(&b.bucket))
    });

    Ok(RevenueShareTable {
        rows,
        control_total_usd: control_total,
        test_total_usd: test_total,
    })
}

/// Share of each group's eligible first purchases per bucket (a proxy for
/// paying users). Rows follow the revenue table's bucket order so the
/// tables line up visually.
pub fn paying_share(
    eligible: &[&OfferEvent],
    taxonomy: &OfferTaxonomy,
    order: &[OfferBucket],
    window_days: i64,
) -> OfferResult<Vec<ComparisonRow>> {
    let mut control_counts: HashMap<OfferBucket, u64> = HashMap::new();
    let mut test_counts: HashMap<OfferBucket, u64> = HashMap::new();
    let (mut control_total, mut test_total) = (0u64, 0u64);

    for event in eligible {
        let bucket = taxonomy.bucket_for(&event.offer_id);
        match event.group {
            AbGroup::Control => {
                *control_counts.entry(bucket).or_insert(0) += 1;
                control_total += 1;
            }
            AbGroup::Test => {
                *test_counts.entry(bucket).or_insert(0) += 1;
                test_total += 1;
            }
        }
    }

    if control_total == 0 || test_total == 0 {
        return Err(OfferError::NoData {
            table: "paying share".to_string(),
            window_days,
        });
    }

    Ok(order
        .iter()
        .map(|bucket| {
            let control = round_to(
                control_counts.get(bucket).copied().unwrap_or(0) as f64 / control_total as f64
                    * 100.0,
                2,
            );
            let test = round_to(
                test_counts.get(bucket).copied().unwrap_or(0) as f64 / test_total as f64 * 100.0,
                2,
            );
            ComparisonRow {
                bucket: bucket.clone(),
                control: Some(control),
                test: Some(test),
                diff: Some(round_to(test - control, 2)),
            }
        })
        .collect())
}

/// Median latency in hours per (group, bucket), for any per-record latency
/// extractor. Records where the extractor yields `None` (missing timestamp,
/// no qualifying show) are excluded from the median, never treated as zero.
/// `decimals` is display granularity, not a pipeline invariant.
pub fn latency_medians<F>(
    eligible: &[&OfferEvent],
    taxonomy: &OfferTaxonomy,
    order: &[OfferBucket],
    decimals: i32,
    extract: F,
) -> Vec<ComparisonRow>
where
    F: Fn(&OfferEvent) -> Option<f64>,
{
    let mut control_samples: HashMap<OfferBucket, Vec<f64>> = HashMap::new();
    let mut test_samples: HashMap<OfferBucket, Vec<f64>> = HashMap::new();

    for event in eligible {
        let Some(latency_secs) = extract(event) else {
            continue;
        };
        let bucket = taxonomy.bucket_for(&event.offer_id);
        let samples = match event.group {
            AbGroup::Control => &mut control_samples,
            AbGroup::Test => &mut test_samples,
        };
        samples.entry(bucket).or_default().push(latency_secs);
    }

    order
        .iter()
        .map(|bucket| {
            let control = control_samples
                .remove(bucket)
                .and_then(median)
                .map(|secs| round_to(secs / 3600.0, decimals));
            let test = test_samples
                .remove(bucket)
                .and_then(median)
                .map(|secs| round_to(secs / 3600.0, decimals));
            let diff = match (control, test) {
                (Some(c), Some(t)) => Some(round_to(t - c, decimals)),
                _ => None,
            };
            ComparisonRow {
                bucket: bucket.clone(),
                control,
                test,
                diff,
            }
        })
        .collect()
}

/// Mean and median purchase value per bucket over *all* records, unwindowed.
/// Named buckets come out in lexicographic order with `Other` last.
pub fn price_summary(events: &[OfferEvent], taxonomy: &OfferTaxonomy) -> Vec<PriceRow> {
    let mut values: BTreeMap<OfferBucket, Vec<f64>> = BTreeMap::new();
    for event in events {
        let bucket = taxonomy.bucket_for(&event.offer_id);
        let entry = values.entry(bucket).or_default();
        if let Some(value) = event.purchase_value {
            entry.push(value);
        }
    }

    values
        .into_iter()
        .map(|(bucket, samples)| {
            let mean_usd = if samples.is_empty() {
                None
            } else {
                Some(samples.iter().sum::<f64>() / samples.len() as f64)
            };
            let median_usd = median(samples);
            PriceRow {
                bucket,
                mean_usd,
                median_usd,
            }
        })
        .collect()
}
