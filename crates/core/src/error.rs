use thiserror::Error;

pub type BrokerResult<T> = Result<T, BrokerError>;

/// Fatal engine errors. Domain-level rejections (unknown format, slot
/// mismatch, targeting violations) are carried inside `DomainResult`
/// instead, so the envelope mapper can derive a lifecycle status from
/// them; only conditions that make the request unprocessable end up here.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed targeting classification table: {0}")]
    ClassificationTable(String),

    #[error("Corrupted format registry entry for '{format_id}': {detail}")]
    CorruptedRegistry { format_id: String, detail: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
