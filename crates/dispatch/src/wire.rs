//! Wire DTOs for the send worker's HTTP API.
//!
//! The worker queues a batch per campaign send, reports progress when
//! polled, and accepts a cancellation signal. These types mirror its
//! JSON contract; everything else in the workspace uses the domain
//! types from `sandesh-core`.

use serde::{Deserialize, Serialize};

use sandesh_core::dispatch::JobState;

/// Payload for `POST /batches`: the full batch handed to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSubmission {
    pub recipients: Vec<Recipient>,
    /// Message bodies in campaign order.
    pub messages: Vec<String>,
}

/// One recipient within a batch submission.
#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    /// Normalized `+91` number.
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Response from `POST /batches` after the worker queued the batch.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Worker-assigned reference for the queued batch.
    pub batch_id: String,
}

/// Execution state as reported by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl WorkerState {
    /// Map the wire state onto the domain state machine.
    pub fn to_job_state(self) -> JobState {
        match self {
            Self::Queued => JobState::Queued,
            Self::Running => JobState::Running,
            Self::Completed => JobState::Completed,
            Self::Failed => JobState::Failed,
            Self::Cancelled => JobState::Cancelled,
        }
    }
}

/// Response from `GET /batches/{id}`.
#[derive(Debug, Deserialize)]
pub struct BatchStatusResponse {
    pub state: WorkerState,
    /// Messages delivered so far.
    #[serde(default)]
    pub sent: i32,
    /// Messages the worker gave up on.
    #[serde(default)]
    pub failed: i32,
    /// Worker-side failure description, if any.
    #[serde(default)]
    pub error: Option<String>,
}

impl BatchStatusResponse {
    pub fn is_terminal(&self) -> bool {
        self.state.to_job_state().is_terminal()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_state_maps_onto_domain_states() {
        assert_eq!(WorkerState::Queued.to_job_state(), JobState::Queued);
        assert_eq!(WorkerState::Running.to_job_state(), JobState::Running);
        assert_eq!(WorkerState::Completed.to_job_state(), JobState::Completed);
        assert_eq!(WorkerState::Failed.to_job_state(), JobState::Failed);
        assert_eq!(WorkerState::Cancelled.to_job_state(), JobState::Cancelled);
    }

    #[test]
    fn test_status_response_deserialization() {
        let json = r#"{"state":"running","sent":42,"failed":1,"error":null}"#;
        let status: BatchStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, WorkerState::Running);
        assert_eq!(status.sent, 42);
        assert_eq!(status.failed, 1);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_status_response_defaults() {
        // A minimal worker response still parses.
        let status: BatchStatusResponse =
            serde_json::from_str(r#"{"state":"completed"}"#).unwrap();
        assert_eq!(status.sent, 0);
        assert_eq!(status.failed, 0);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_recipient_skips_missing_name() {
        let recipient = Recipient {
            phone: "+919876543210".to_string(),
            name: None,
        };
        let json = serde_json::to_string(&recipient).unwrap();
        assert!(!json.contains("name"));
    }
}
