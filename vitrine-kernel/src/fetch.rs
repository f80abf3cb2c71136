//! Récupération du snapshot télémétrie.
//!
//! Un GET par tick vers l'endpoint cgijson du scanner. Tout échec
//! (transport, statut non-2xx, corps non-JSON) abandonne le cycle :
//! l'état précédent reste en place et le tick suivant réessaie seul.

use crate::models::Snapshot;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint a répondu {0}")]
    Status(reqwest::StatusCode),
    #[error("payload illisible: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct SnapshotFetcher {
    client: reqwest::Client,
    url: String,
}

impl SnapshotFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = resp.text().await?;
        let snapshot = serde_json::from_str(&body)?;
        Ok(snapshot)
    }
}
