// HTTP data source for the dashboard's JSON endpoint
use crate::application::snapshot_source::{SnapshotSource, SourceError};
use crate::domain::metrics::DataSnapshot;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Decode a response body. Some servers return the snapshot as a JSON-encoded
/// string rather than an object, so both forms are accepted.
pub fn decode_snapshot(body: &str) -> Result<DataSnapshot, SourceError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let snapshot = match value {
        serde_json::Value::String(inner) => serde_json::from_str(&inner)?,
        other => serde_json::from_value(other)?,
    };
    Ok(snapshot)
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<DataSnapshot, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        let body = response.text().await?;
        let snapshot = decode_snapshot(&body)?;

        tracing::debug!(
            "Fetched snapshot from {} (last_updated={}, config_ts={:?})",
            self.url,
            snapshot.last_updated,
            snapshot.config_ts
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_object_body() {
        let snapshot = decode_snapshot(r#"{"last_updated": 5, "configured": true}"#).unwrap();
        assert_eq!(snapshot.last_updated, 5);
        assert_eq!(snapshot.configured, Some(true));
    }

    #[test]
    fn test_decode_string_wrapped_body() {
        let body = serde_json::to_string(r#"{"last_updated": 7, "total": {"import": 3}}"#).unwrap();
        let snapshot = decode_snapshot(&body).unwrap();
        assert_eq!(snapshot.last_updated, 7);
        assert_eq!(snapshot.total.unwrap().import, 3.0);
    }

    #[test]
    fn test_decode_error() {
        assert!(matches!(decode_snapshot("not json"), Err(SourceError::Decode(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let source = HttpSnapshotSource::new("http://localhost:8090/data/".to_string());
        assert_eq!(source.url(), "http://localhost:8090/data");
    }
}
