//! Dispatch-job state machine.
//!
//! A job tracks one execution attempt of sending a campaign's messages
//! by the external send worker:
//!
//! ```text
//! queued --> running --> completed
//!   |           |------> failed
//!   |------------------> cancelled (from queued or running)
//! ```
//!
//! `completed`, `failed`, and `cancelled` are terminal; no transition
//! leaves them. The worker is the authority on which transition
//! happened; this module only encodes which transitions are legal.

use serde::{Deserialize, Serialize};

/// Execution state of a dispatch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    /// Return the state name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a state string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// All valid state values.
    pub const ALL: &'static [&'static str] =
        &["queued", "running", "completed", "failed", "cancelled"];

    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns `true` if moving from `self` to `next` is a legal
    /// transition. Staying in place is not a transition.
    pub fn can_transition_to(self, next: JobState) -> bool {
        match (self, next) {
            (Self::Queued, Self::Running) => true,
            (Self::Queued, Self::Cancelled) => true,
            (Self::Queued, Self::Failed) => true,
            (Self::Running, Self::Completed) => true,
            (Self::Running, Self::Failed) => true,
            (Self::Running, Self::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_string_round_trip() {
        for name in JobState::ALL {
            let state = JobState::from_str(name).unwrap();
            assert_eq!(state.as_str(), *name);
        }
    }

    #[test]
    fn test_unknown_state_rejected() {
        assert_eq!(JobState::from_str("pending"), None);
        assert_eq!(JobState::from_str("Queued"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(JobState::Queued.can_transition_to(JobState::Running));
        assert!(JobState::Running.can_transition_to(JobState::Completed));
    }

    #[test]
    fn test_failure_and_cancellation_transitions() {
        assert!(JobState::Running.can_transition_to(JobState::Failed));
        assert!(JobState::Queued.can_transition_to(JobState::Cancelled));
        assert!(JobState::Running.can_transition_to(JobState::Cancelled));
        // A job the worker never accepted fails from the queue.
        assert!(JobState::Queued.can_transition_to(JobState::Failed));
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        for terminal in [JobState::Completed, JobState::Failed, JobState::Cancelled] {
            for next in [
                JobState::Queued,
                JobState::Running,
                JobState::Completed,
                JobState::Failed,
                JobState::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn test_no_backwards_transitions() {
        assert!(!JobState::Running.can_transition_to(JobState::Queued));
        assert!(!JobState::Queued.can_transition_to(JobState::Completed));
    }

    #[test]
    fn test_self_transition_is_not_a_transition() {
        assert!(!JobState::Queued.can_transition_to(JobState::Queued));
        assert!(!JobState::Running.can_transition_to(JobState::Running));
    }
}
