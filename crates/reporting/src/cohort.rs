//! Windowed cohort filter.

use offerscope_core::types::OfferEvent;

/// True when the record counts toward windowed aggregates: a first purchase
/// within the retention window, from a user registered long enough ago to
/// have been observable past the window. The observability clause keeps
/// too-recent cohorts from biasing rates toward zero.
pub fn is_eligible(event: &OfferEvent, window_days: i64) -> bool {
    event.purchase_rank == 1
        && event.retention_day < window_days
        && event.max_observable_day > window_days
}

/// Restrict a dataset to its windowed-eligible records.
pub fn eligible(events: &[OfferEvent], window_days: i64) -> Vec<&OfferEvent> {
    events
        .iter()
        .filter(|e| is_eligible(e, window_days))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use offerscope_core::types::AbGroup;

    fn event(rank: u32, retention_day: i64, max_observable_day: i64) -> OfferEvent {
        OfferEvent {
            user_id: "u1".to_string(),
            group: AbGroup::Control,
            platform: None,
            country_tier: None,
            offer_id: "A".to_string(),
            purchase_rank: rank,
            retention_day,
            max_observable_day,
            purchase_value: Some(1.0),
            registration_time: None,
            purchase_time: None,
            first_show_time: None,
        }
    }

    #[test]
    fn test_first_purchase_within_window_passes() {
        assert!(is_eligible(&event(1, 3, 30), 7));
    }

    #[test]
    fn test_later_purchases_are_excluded() {
        assert!(!is_eligible(&event(2, 3, 30), 7));
    }

    #[test]
    fn test_retention_window_is_exclusive() {
        assert!(is_eligible(&event(1, 6, 30), 7));
        assert!(!is_eligible(&event(1, 7, 30), 7));
    }

    #[test]
    fn test_too_recent_cohort_is_excluded() {
        // Registered 6 days ago: cannot have reached day 7 yet, so the
        // record is out regardless of its purchase data.
        assert!(!is_eligible(&event(1, 2, 5), 7));
        // The boundary is strict: observable exactly `window` days is out.
        assert!(!is_eligible(&event(1, 2, 7), 7));
        assert!(is_eligible(&event(1, 2, 8), 7));
    }

    #[test]
    fn test_eligible_keeps_input_order() {
        let events = vec![event(1, 1, 30), event(2, 1, 30), event(1, 2, 30)];
        let kept = eligible(&events, 7);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].retention_day, 1);
        assert_eq!(kept[1].retention_day, 2);
    }
}
