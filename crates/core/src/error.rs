use thiserror::Error;

pub type OfferResult<T> = Result<T, OfferError>;

#[derive(Error, Debug)]
pub enum OfferError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unrecognized experiment group label: {0:?}")]
    InvalidGroup(String),

    #[error("User {user_id} is assigned to both experiment groups")]
    GroupConflict { user_id: String },

    #[error("No eligible data for {table} within a {window_days}-day window")]
    NoData { table: String, window_days: i64 },

    #[error("Invalid parameter: {0}")]
    InvalidParams(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(uuid::Uuid),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
