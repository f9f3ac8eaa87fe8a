//! Sending change batches to the server.

use std::future::Future;

use manuscript_common::SyncConfig;
use serde_json::Value;

use crate::error::SyncError;

/// Delivers one sync request body.
///
/// `Ok` means the server acknowledged every change in the body.
pub trait ChangeTransport {
    fn send(&self, body: Value) -> impl Future<Output = Result<(), SyncError>>;
}

/// POSTs the change array as JSON to `{endpoint}/manuscripts/{id}/changes`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(config: &SyncConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &SyncConfig) -> Self {
        Self {
            client,
            url: config.changes_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ChangeTransport for HttpTransport {
    async fn send(&self, body: Value) -> Result<(), SyncError> {
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
