//! In-memory dataset and report registry.

use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use offerscope_core::error::{OfferError, OfferResult};
use offerscope_core::types::EventDataset;

use crate::pipeline::{CompareParams, OfferComparisonPipeline, OfferComparisonReport};

/// Holds loaded datasets and the reports computed from them, so an analyst
/// can re-run the comparison with different parameters without reloading.
pub struct ReportStore {
    datasets: DashMap<Uuid, EventDataset>,
    reports: DashMap<Uuid, OfferComparisonReport>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self {
            datasets: DashMap::new(),
            reports: DashMap::new(),
        }
    }

    /// Register a dataset and return its id.
    pub fn register_dataset(&self, dataset: EventDataset) -> Uuid {
        let id = dataset.id;
        info!(dataset_id = %id, records = dataset.len(), "Dataset registered");
        self.datasets.insert(id, dataset);
        id
    }

    pub fn get_dataset(&self, id: &Uuid) -> Option<EventDataset> {
        self.datasets.get(id).map(|d| d.clone())
    }

    /// Run the comparison pipeline against a registered dataset and retain
    /// the report.
    pub fn compare(
        &self,
        dataset_id: &Uuid,
        params: CompareParams,
    ) -> OfferResult<OfferComparisonReport> {
        let dataset = self
            .datasets
            .get(dataset_id)
            .ok_or(OfferError::UnknownDataset(*dataset_id))?;
        let pipeline = OfferComparisonPipeline::new(params)?;
        let report = pipeline.run(&dataset);
        self.reports.insert(report.id, report.clone());
        Ok(report)
    }

    pub fn get_report(&self, id: &Uuid) -> Option<OfferComparisonReport> {
        self.reports.get(id).map(|r| r.clone())
    }

    pub fn list_reports(&self) -> Vec<OfferComparisonReport> {
        self.reports.iter().map(|r| r.value().clone()).collect()
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offerscope_core::types::RawOfferEvent;
    use std::collections::BTreeSet;

    fn raw(user: &str, group: &str, offer: &str, value: f64) -> RawOfferEvent {
        RawOfferEvent {
            user_id: user.to_string(),
            group: group.to_string(),
            platform: None,
            country_tier: None,
            offer_id: offer.to_string(),
            purchase_rank: 1,
            retention_day: 1,
            max_observable_day: 30,
            purchase_value: Some(value),
            registration_time: None,
            purchase_time: None,
            first_show_time: None,
        }
    }

    fn params() -> CompareParams {
        CompareParams {
            window_days: 7,
            top_n_offers: 5,
            always_keep: BTreeSet::new(),
        }
    }

    #[test]
    fn test_register_compare_and_fetch() {
        let store = ReportStore::new();
        let dataset = EventDataset::from_records(vec![
            raw("c1", "0", "A", 10.0),
            raw("t1", "1", "A", 20.0),
        ])
        .unwrap();
        let dataset_id = store.register_dataset(dataset);

        let report = store.compare(&dataset_id, params()).unwrap();
        assert_eq!(report.dataset_id, dataset_id);
        assert!(store.get_report(&report.id).is_some());
        assert_eq!(store.list_reports().len(), 1);
    }

    #[test]
    fn test_unknown_dataset_errors() {
        let store = ReportStore::new();
        let missing = Uuid::new_v4();
        assert!(matches!(
            store.compare(&missing, params()),
            Err(OfferError::UnknownDataset(id)) if id == missing
        ));
    }
}
