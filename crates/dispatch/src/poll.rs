//! Pull-based status polling.
//!
//! Job status is client-driven: callers poll on their own cadence. This
//! module provides the one shared loop, with the interval and the
//! cancellation token both owned by the caller, so nothing here decides
//! lifetimes on its own.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{SendWorker, WorkerApiError};
use crate::wire::BatchStatusResponse;

/// Poll a batch until the worker reports a terminal state.
///
/// Returns `Ok(Some(status))` with the terminal status, or `Ok(None)`
/// if `cancel` fired first. Worker errors propagate immediately; this
/// loop does not retry internally (the caller owns retry policy).
pub async fn poll_until_terminal(
    worker: &dyn SendWorker,
    reference: &str,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<Option<BatchStatusResponse>, WorkerApiError> {
    loop {
        let status = worker.status(reference).await?;
        if status.is_terminal() {
            return Ok(Some(status));
        }

        tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::wire::{BatchSubmission, SubmitResponse, WorkerState};

    /// Scripted fake worker: pops one status response per poll.
    struct ScriptedWorker {
        responses: Mutex<VecDeque<Result<BatchStatusResponse, WorkerApiError>>>,
    }

    impl ScriptedWorker {
        fn new(
            responses: impl IntoIterator<Item = Result<BatchStatusResponse, WorkerApiError>>,
        ) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
            }
        }
    }

    fn status(state: WorkerState, sent: i32) -> BatchStatusResponse {
        BatchStatusResponse {
            state,
            sent,
            failed: 0,
            error: None,
        }
    }

    #[async_trait]
    impl SendWorker for ScriptedWorker {
        async fn submit(&self, _: &BatchSubmission) -> Result<SubmitResponse, WorkerApiError> {
            unreachable!("poller never submits")
        }

        async fn status(&self, _: &str) -> Result<BatchStatusResponse, WorkerApiError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }

        async fn cancel(&self, _: &str) -> Result<(), WorkerApiError> {
            Ok(())
        }

        async fn health(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_polls_until_terminal() {
        let worker = ScriptedWorker::new([
            Ok(status(WorkerState::Queued, 0)),
            Ok(status(WorkerState::Running, 5)),
            Ok(status(WorkerState::Completed, 10)),
        ]);
        let cancel = CancellationToken::new();

        let result =
            poll_until_terminal(&worker, "batch-1", Duration::from_millis(1), &cancel)
                .await
                .unwrap();

        let terminal = result.expect("should reach terminal state");
        assert_eq!(terminal.state, WorkerState::Completed);
        assert_eq!(terminal.sent, 10);
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let worker = ScriptedWorker::new([Ok(status(WorkerState::Running, 0))]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result =
            poll_until_terminal(&worker, "batch-1", Duration::from_secs(3600), &cancel)
                .await
                .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_worker_error_propagates() {
        let worker = ScriptedWorker::new([Err(WorkerApiError::Unreachable(
            "connection refused".to_string(),
        ))]);
        let cancel = CancellationToken::new();

        let result =
            poll_until_terminal(&worker, "batch-1", Duration::from_millis(1), &cancel).await;

        assert_matches!(result, Err(WorkerApiError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_terminal_on_first_poll_returns_without_sleeping() {
        let worker = ScriptedWorker::new([Ok(status(WorkerState::Cancelled, 3))]);
        let cancel = CancellationToken::new();

        let result =
            poll_until_terminal(&worker, "batch-1", Duration::from_secs(3600), &cancel)
                .await
                .unwrap();

        assert_eq!(result.unwrap().state, WorkerState::Cancelled);
    }
}
