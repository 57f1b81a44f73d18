// Source trait for dashboard data snapshots
use crate::domain::metrics::DataSnapshot;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("data request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("data endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode data snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the latest snapshot (metrics, dashboard config, status fields)
    async fn fetch(&self) -> Result<DataSnapshot, SourceError>;
}
