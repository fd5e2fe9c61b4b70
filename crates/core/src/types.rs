//! Domain types for the offer comparison pipeline.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{OfferError, OfferResult};

/// The two arms of the A/B assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbGroup {
    Control,
    Test,
}

impl AbGroup {
    /// Parse a raw warehouse group label. The export layer historically used
    /// `"0"` for control and `"1"` for test; spelled-out labels are accepted
    /// case-insensitively.
    pub fn parse(label: &str) -> OfferResult<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "0" | "control" => Ok(AbGroup::Control),
            "1" | "test" => Ok(AbGroup::Test),
            _ => Err(OfferError::InvalidGroup(label.to_string())),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AbGroup::Control => "Control",
            AbGroup::Test => "Test",
        }
    }
}

/// One first-relevant-event row as exported from the warehouse, before
/// group-label validation. This is the wire format the CLI loads from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOfferEvent {
    pub user_id: String,
    pub group: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub country_tier: Option<String>,
    pub offer_id: String,
    /// 1-based ordinal of this purchase within the user's purchase history.
    pub purchase_rank: u32,
    /// Days between registration and the event.
    pub retention_day: i64,
    /// Days the user's cohort has been observable (days since registration,
    /// minus one). Caps window eligibility.
    pub max_observable_day: i64,
    #[serde(default)]
    pub purchase_value: Option<f64>,
    #[serde(default)]
    pub registration_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub purchase_time: Option<DateTime<Utc>>,
    /// First qualifying show of this offer before the user's first purchase;
    /// absent when no such show event was found.
    #[serde(default)]
    pub first_show_time: Option<DateTime<Utc>>,
}

/// A validated event row. Identical to [`RawOfferEvent`] except the group
/// label has been resolved to an [`AbGroup`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferEvent {
    pub user_id: String,
    pub group: AbGroup,
    pub platform: Option<String>,
    pub country_tier: Option<String>,
    pub offer_id: String,
    pub purchase_rank: u32,
    pub retention_day: i64,
    pub max_observable_day: i64,
    pub purchase_value: Option<f64>,
    pub registration_time: Option<DateTime<Utc>>,
    pub purchase_time: Option<DateTime<Utc>>,
    pub first_show_time: Option<DateTime<Utc>>,
}

impl OfferEvent {
    /// Seconds from registration to first purchase, when both timestamps are
    /// present.
    pub fn payment_latency_secs(&self) -> Option<f64> {
        let reg = self.registration_time?;
        let pay = self.purchase_time?;
        Some((pay - reg).num_milliseconds() as f64 / 1000.0)
    }

    /// Seconds from registration to the first qualifying offer show.
    pub fn first_show_latency_secs(&self) -> Option<f64> {
        let reg = self.registration_time?;
        let show = self.first_show_time?;
        Some((show - reg).num_milliseconds() as f64 / 1000.0)
    }
}

/// An in-memory event dataset for one pipeline invocation.
///
/// Construction validates every group label and enforces the one-group-per-
/// user invariant; a dataset that violates either cannot be compared safely
/// and is rejected outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDataset {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    events: Vec<OfferEvent>,
}

impl EventDataset {
    pub fn from_records(records: Vec<RawOfferEvent>) -> OfferResult<Self> {
        let mut assignments: HashMap<String, AbGroup> = HashMap::new();
        let mut events = Vec::with_capacity(records.len());

        for record in records {
            let group = AbGroup::parse(&record.group)?;
            match assignments.get(&record.user_id) {
                Some(assigned) if *assigned != group => {
                    return Err(OfferError::GroupConflict {
                        user_id: record.user_id,
                    });
                }
                Some(_) => {}
                None => {
                    assignments.insert(record.user_id.clone(), group);
                }
            }
            events.push(OfferEvent {
                user_id: record.user_id,
                group,
                platform: record.platform,
                country_tier: record.country_tier,
                offer_id: record.offer_id,
                purchase_rank: record.purchase_rank,
                retention_day: record.retention_day,
                max_observable_day: record.max_observable_day,
                purchase_value: record.purchase_value,
                registration_time: record.registration_time,
                purchase_time: record.purchase_time,
                first_show_time: record.first_show_time,
            });
        }

        tracing::debug!(
            records = events.len(),
            users = assignments.len(),
            "Validated event dataset"
        );
        Ok(Self {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            events,
        })
    }

    pub fn events(&self) -> &[OfferEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The reduced offer category used for comparison: a named offer kept
/// distinct, or the `"Other"` fold bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OfferBucket {
    Named(String),
    Other,
}

pub const OTHER_BUCKET_LABEL: &str = "Other";

impl OfferBucket {
    pub fn label(&self) -> &str {
        match self {
            OfferBucket::Named(id) => id,
            OfferBucket::Other => OTHER_BUCKET_LABEL,
        }
    }
}

impl fmt::Display for OfferBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for OfferBucket {
    fn from(label: &str) -> Self {
        if label == OTHER_BUCKET_LABEL {
            OfferBucket::Other
        } else {
            OfferBucket::Named(label.to_string())
        }
    }
}

// Buckets serialize as their plain label so report JSON stays flat.
impl Serialize for OfferBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for OfferBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(OfferBucket::from(label.as_str()))
    }
}
