//! End-to-end flow: raw JSON records → dataset → comparison report →
//! rendered tables.

use chrono::{Duration, TimeZone, Utc};

use offerscope_core::types::{EventDataset, OfferBucket, RawOfferEvent};
use offerscope_render::{DivergingScale, RenderTable, ValueFormat};
use offerscope_reporting::{CompareParams, ReportStore};

fn record_json(
    user: &str,
    group: &str,
    offer: &str,
    value: f64,
    purchase_hours: i64,
) -> serde_json::Value {
    let reg = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
    serde_json::json!({
        "user_id": user,
        "group": group,
        "platform": "Android",
        "country_tier": "T0",
        "offer_id": offer,
        "purchase_rank": 1,
        "retention_day": 1,
        "max_observable_day": 30,
        "purchase_value": value,
        "registration_time": reg,
        "purchase_time": reg + Duration::hours(purchase_hours),
    })
}

fn params(top_n: usize) -> CompareParams {
    CompareParams {
        window_days: 7,
        top_n_offers: top_n,
        always_keep: Default::default(),
    }
}

#[test]
fn full_flow_from_json_to_rendered_tables() {
    let payload = serde_json::json!([
        record_json("c1", "0", "al.2x2startofer", 80.0, 2),
        record_json("c2", "0", "coins.small", 20.0, 10),
        record_json("t1", "1", "al.2x2startofer", 60.0, 4),
        record_json("t2", "1", "coins.small", 40.0, 6),
    ]);
    let records: Vec<RawOfferEvent> = serde_json::from_value(payload).unwrap();
    let dataset = EventDataset::from_records(records).unwrap();

    let store = ReportStore::new();
    let dataset_id = store.register_dataset(dataset);
    let report = store.compare(&dataset_id, params(2)).unwrap();

    assert!(report.skipped.is_empty());
    let revenue = report.revenue_share.as_ref().unwrap();
    assert_eq!(revenue.rows.len(), 2);
    assert_eq!(revenue.control_total_usd, 100.0);

    // Both offers kept their own bucket at top_n = 2.
    assert!(report
        .bucket_order
        .iter()
        .all(|b| matches!(b, OfferBucket::Named(_))));

    let table = RenderTable::revenue(
        "Revenue per offer, % from total",
        revenue,
        ValueFormat::Percent2,
        &DivergingScale::symmetric(10.0),
    );
    let text = table.to_text();
    assert!(text.contains("al.2x2startofer"));
    assert!(text.contains("Control total $100.00"));

    // Report JSON round-trips with flat bucket labels.
    let json = serde_json::to_value(&report).unwrap();
    let labels: Vec<&str> = json["bucket_order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(labels.contains(&"coins.small"));
}

#[test]
fn rerunning_same_parameters_reproduces_tables() {
    let payload = serde_json::json!([
        record_json("c1", "0", "a.offer", 10.0, 1),
        record_json("c2", "0", "b.offer", 30.0, 2),
        record_json("c3", "0", "c.offer", 5.0, 3),
        record_json("t1", "1", "a.offer", 25.0, 2),
        record_json("t2", "1", "b.offer", 15.0, 4),
    ]);
    let records: Vec<RawOfferEvent> = serde_json::from_value(payload).unwrap();
    let dataset = EventDataset::from_records(records).unwrap();

    let store = ReportStore::new();
    let dataset_id = store.register_dataset(dataset);
    let first = store.compare(&dataset_id, params(1)).unwrap();
    let second = store.compare(&dataset_id, params(1)).unwrap();

    assert_eq!(first.bucket_order, second.bucket_order);
    assert_eq!(
        serde_json::to_value(&first.revenue_share).unwrap(),
        serde_json::to_value(&second.revenue_share).unwrap()
    );
    assert_eq!(
        serde_json::to_value(&first.payment_latency).unwrap(),
        serde_json::to_value(&second.payment_latency).unwrap()
    );
    assert_eq!(store.list_reports().len(), 2);
}

#[test]
fn group_conflict_fails_dataset_construction() {
    let payload = serde_json::json!([
        record_json("u1", "0", "a.offer", 10.0, 1),
        record_json("u1", "1", "a.offer", 10.0, 1),
    ]);
    let records: Vec<RawOfferEvent> = serde_json::from_value(payload).unwrap();
    assert!(EventDataset::from_records(records).is_err());
}
