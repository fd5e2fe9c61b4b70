//! Offer A/B comparison pipeline — offer taxonomy reduction, windowed cohort
//! filtering, revenue/paying-share and latency comparison tables, and offer
//! pricing summaries.

pub mod cohort;
pub mod metrics;
pub mod pipeline;
pub mod store;
pub mod taxonomy;

pub use metrics::{ComparisonRow, PriceRow, RevenueShareTable};
pub use pipeline::{CompareParams, OfferComparisonPipeline, OfferComparisonReport, SkippedTable};
pub use store::ReportStore;
pub use taxonomy::OfferTaxonomy;
