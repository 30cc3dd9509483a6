use thiserror::Error;

use crate::spam::Label;

#[derive(Error, Debug)]
pub enum SpamError {
    #[error("No {label} messages have been trained; cannot score label {label}")]
    EmptyStore { label: Label },

    #[error("No messages have been trained")]
    EmptyTotal,

    #[error("Invalid label: {0:?} (expected \"spam\" or \"ham\")")]
    InvalidLabel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SpamError>;
