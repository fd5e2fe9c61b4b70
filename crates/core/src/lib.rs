//! OfferScope core — shared domain types, errors, and configuration for the
//! offer A/B comparison pipeline.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{OfferError, OfferResult};
pub use types::{AbGroup, EventDataset, OfferBucket, OfferEvent, RawOfferEvent};
