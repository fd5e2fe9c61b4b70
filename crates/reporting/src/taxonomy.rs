//! Offer taxonomy reduction — named offers plus the "Other" fold bucket.

use std::collections::{HashMap, HashSet};

use offerscope_core::types::{AbGroup, OfferBucket, OfferEvent};

use crate::pipeline::CompareParams;

/// Total mapping from observed offer ids to reduced comparison buckets.
///
/// Popularity is ranked over the *control* group's first purchases only, so
/// the reduction itself is not biased by the treatment's effect on offer
/// frequency. Ties are broken by first-purchase count descending, then
/// lexicographic ascending offer id, which makes the mapping deterministic
/// regardless of input row order.
#[derive(Debug, Clone)]
pub struct OfferTaxonomy {
    mapping: HashMap<String, OfferBucket>,
}

impl OfferTaxonomy {
    pub fn reduce(events: &[OfferEvent], params: &CompareParams) -> Self {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for event in events {
            if event.group == AbGroup::Control
                && event.purchase_rank == 1
                && event.retention_day < params.window_days
                && !params.always_keep.contains(&event.offer_id)
            {
                *counts.entry(event.offer_id.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let kept: HashSet<&str> = ranked
            .iter()
            .take(params.top_n_offers)
            .map(|(offer_id, _)| *offer_id)
            .collect();

        let mut mapping = HashMap::new();
        for event in events {
            let offer_id = event.offer_id.as_str();
            if mapping.contains_key(offer_id) {
                continue;
            }
            let bucket = if params.always_keep.contains(offer_id) || kept.contains(offer_id) {
                OfferBucket::Named(offer_id.to_string())
            } else {
                OfferBucket::Other
            };
            mapping.insert(offer_id.to_string(), bucket);
        }

        Self { mapping }
    }

    /// Resolve an offer id to its bucket. Ids never observed during
    /// reduction fold into `Other`.
    pub fn bucket_for(&self, offer_id: &str) -> OfferBucket {
        self.mapping
            .get(offer_id)
            .cloned()
            .unwrap_or(OfferBucket::Other)
    }

    /// Number of distinct offer ids the mapping covers.
    pub fn observed_offers(&self) -> usize {
        self.mapping.len()
    }

    /// Number of offers that kept their own bucket.
    pub fn named_offers(&self) -> usize {
        self.mapping
            .values()
            .filter(|b| matches!(b, OfferBucket::Named(_)))
            .count()
    }
}
