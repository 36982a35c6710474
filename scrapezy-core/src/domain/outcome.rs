//! Extraction outcome

use serde_json::Value;
use std::fmt;

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit extraction job";
pub const TIMED_OUT_MESSAGE: &str = "Extraction job timed out";
pub const CANCELLED_MESSAGE: &str = "Extraction job cancelled";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Terminal result of one extraction run
///
/// Every run produces exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The job finished and returned a payload of arbitrary shape
    Success { data: Value },
    Failure(ExtractionFailure),
}

impl ExtractionOutcome {
    pub fn success(data: Value) -> Self {
        Self::Success { data }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure(ExtractionFailure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure message, if this is a failure
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(&failure.message),
        }
    }
}

/// Why a run failed, kept for logging
///
/// All kinds surface to the caller the same way, as a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service answered but handed out no job identifier
    Submission,
    /// The submit call itself failed (network, HTTP or unreadable body)
    Transport,
    /// The job reached a terminal status without a result
    Job,
    /// The job was still pending after the last poll
    Timeout,
    /// The caller gave up before the job finished
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Submission => "submission",
            Self::Transport => "transport",
            Self::Job => "job",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    pub message: String,
}
