//! HTTP client for the send worker, behind the [`SendWorker`] trait.
//!
//! Every request carries a timeout; a timeout or connection failure is
//! reported as [`WorkerApiError::Unreachable`] so the caller can map it
//! to the upstream-unavailable error kind instead of hanging or
//! guessing a status.

use std::time::Duration;

use async_trait::async_trait;

use crate::wire::{BatchStatusResponse, BatchSubmission, SubmitResponse};

/// Errors from the send-worker API layer.
#[derive(Debug, thiserror::Error)]
pub enum WorkerApiError {
    /// The worker did not produce a usable answer (network failure,
    /// timeout, or an unparseable body).
    #[error("send worker unreachable: {0}")]
    Unreachable(String),

    /// The worker answered with a non-2xx status code.
    #[error("send worker error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, for logs only.
        body: String,
    },
}

impl From<reqwest::Error> for WorkerApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unreachable(err.to_string())
    }
}

/// The seam between the orchestrator and the external worker.
///
/// Production uses [`HttpSendWorker`]; tests script an in-memory fake.
#[async_trait]
pub trait SendWorker: Send + Sync {
    /// Hand a batch to the worker. Returns the worker's reference.
    async fn submit(&self, batch: &BatchSubmission) -> Result<SubmitResponse, WorkerApiError>;

    /// Poll the current state of a batch.
    async fn status(&self, reference: &str) -> Result<BatchStatusResponse, WorkerApiError>;

    /// Ask the worker to stop a batch. Taking effect is asynchronous;
    /// the resulting `cancelled` state is observed via [`Self::status`].
    async fn cancel(&self, reference: &str) -> Result<(), WorkerApiError>;

    /// Liveness probe, independent of any batch.
    async fn health(&self) -> bool;
}

/// Reqwest-backed [`SendWorker`] for a single worker instance.
pub struct HttpSendWorker {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSendWorker {
    /// Create a client for the worker at `base_url` (e.g.
    /// `http://worker:9100`). All requests share the given timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, WorkerApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkerApiError::Unreachable(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or [`WorkerApiError::Api`] with
    /// the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, WorkerApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(WorkerApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WorkerApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SendWorker for HttpSendWorker {
    async fn submit(&self, batch: &BatchSubmission) -> Result<SubmitResponse, WorkerApiError> {
        let response = self
            .client
            .post(format!("{}/batches", self.base_url))
            .json(batch)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn status(&self, reference: &str) -> Result<BatchStatusResponse, WorkerApiError> {
        let response = self
            .client
            .get(format!("{}/batches/{}", self.base_url, reference))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn cancel(&self, reference: &str) -> Result<(), WorkerApiError> {
        let response = self
            .client
            .post(format!("{}/batches/{}/cancel", self.base_url, reference))
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn health(&self) -> bool {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await;

        match response {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
