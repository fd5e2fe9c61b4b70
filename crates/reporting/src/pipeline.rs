//! Report assembly — runs the taxonomy reduction, the windowed filter, and
//! every metric table for one dataset + parameter set.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use offerscope_core::error::{OfferError, OfferResult};
use offerscope_core::types::{EventDataset, OfferBucket};

use crate::cohort;
use crate::metrics::{self, ComparisonRow, PriceRow, RevenueShareTable};
use crate::taxonomy::OfferTaxonomy;

/// Analyst-chosen parameters for one comparison run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareParams {
    /// Retention window in days; first purchases on day `window_days` or
    /// later are out, and users observable for fewer days are out entirely.
    pub window_days: i64,
    /// Number of offers (beyond the allow-list) that keep their own bucket.
    pub top_n_offers: usize,
    /// Offers that always keep their own bucket regardless of popularity.
    pub always_keep: BTreeSet<String>,
}

impl CompareParams {
    pub fn validate(&self) -> OfferResult<()> {
        if self.window_days <= 0 {
            return Err(OfferError::InvalidParams(format!(
                "window_days must be positive, got {}",
                self.window_days
            )));
        }
        Ok(())
    }
}

/// A table that could not be computed, with the reason it was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// The full comparison report for one dataset + parameter set.
///
/// Table slots are `None` when that table was skipped; the corresponding
/// [`SkippedTable`] entry carries the reason. The pricing summary is
/// unwindowed and therefore always present (it may simply be empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferComparisonReport {
    pub id: Uuid,
    pub dataset_id: Uuid,
    pub params: CompareParams,
    /// Bucket order established by the revenue table and shared by the
    /// paying-share and latency tables.
    pub bucket_order: Vec<OfferBucket>,
    pub revenue_share: Option<RevenueShareTable>,
    pub paying_share: Option<Vec<ComparisonRow>>,
    pub payment_latency: Option<Vec<ComparisonRow>>,
    pub first_show_latency: Option<Vec<ComparisonRow>>,
    pub offer_prices: Vec<PriceRow>,
    pub skipped: Vec<SkippedTable>,
    pub generated_at: DateTime<Utc>,
}

const WINDOWED_TABLES: [&str; 4] = [
    "revenue share",
    "paying share",
    "payment latency",
    "first show latency",
];

/// The offer comparison pipeline. Pure transformation of an in-memory
/// dataset; owns no shared state, so separate parameter sets can run
/// concurrently against the same dataset.
#[derive(Debug, Clone)]
pub struct OfferComparisonPipeline {
    params: CompareParams,
}

impl OfferComparisonPipeline {
    pub fn new(params: CompareParams) -> OfferResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &CompareParams {
        &self.params
    }

    pub fn run(&self, dataset: &EventDataset) -> OfferComparisonReport {
        info!(
            dataset_id = %dataset.id,
            records = dataset.len(),
            window_days = self.params.window_days,
            top_n_offers = self.params.top_n_offers,
            "Running offer comparison"
        );

        let taxonomy = OfferTaxonomy::reduce(dataset.events(), &self.params);
        let eligible = cohort::eligible(dataset.events(), self.params.window_days);
        debug!(
            observed_offers = taxonomy.observed_offers(),
            named_offers = taxonomy.named_offers(),
            eligible = eligible.len(),
            "Reduced taxonomy and windowed cohort"
        );

        let mut skipped = Vec::new();
        let mut bucket_order = Vec::new();
        let mut revenue_table = None;
        let mut paying = None;
        let mut payment_latency = None;
        let mut first_show_latency = None;

        match metrics::revenue_share(&eligible, &taxonomy, self.params.window_days) {
            Ok(table) => {
                bucket_order = table.rows.iter().map(|r| r.bucket.clone()).collect();
                revenue_table = Some(table);

                match metrics::paying_share(
                    &eligible,
                    &taxonomy,
                    &bucket_order,
                    self.params.window_days,
                ) {
                    Ok(rows) => paying = Some(rows),
                    Err(e) => {
                        warn!(error = %e, "Skipping paying share table");
                        skipped.push(SkippedTable {
                            table: "paying share".to_string(),
                            reason: e.to_string(),
                        });
                    }
                }

                payment_latency = Some(metrics::latency_medians(
                    &eligible,
                    &taxonomy,
                    &bucket_order,
                    1,
                    |e| e.payment_latency_secs(),
                ));
                first_show_latency = Some(metrics::latency_medians(
                    &eligible,
                    &taxonomy,
                    &bucket_order,
                    0,
                    |e| e.first_show_latency_secs(),
                ));
            }
            Err(e) => {
                // Without revenue data there is no bucket order to align the
                // remaining windowed tables against; skip them all.
                warn!(error = %e, "No windowed data; skipping comparison tables");
                let reason = e.to_string();
                for table in WINDOWED_TABLES {
                    skipped.push(SkippedTable {
                        table: table.to_string(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        let offer_prices = metrics::price_summary(dataset.events(), &taxonomy);

        OfferComparisonReport {
            id: Uuid::new_v4(),
            dataset_id: dataset.id,
            params: self.params.clone(),
            bucket_order,
            revenue_share: revenue_table,
            paying_share: paying,
            payment_latency,
            first_show_latency,
            offer_prices,
            skipped,
            generated_at: Utc::now(),
        }
    }
}
