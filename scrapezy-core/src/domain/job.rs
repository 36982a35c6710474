//! Job domain types

use serde_json::Value;
use std::fmt;

/// Handle on a remote extraction job
///
/// Only lives for the duration of one polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
}

impl JobHandle {
    /// Reads a job identifier out of a raw `jobId` value
    ///
    /// Strings and numbers are accepted. `null`, an empty string or any
    /// other JSON type means the service did not hand out a usable job.
    pub fn from_value(value: &Value) -> Option<Self> {
        let job_id = match value {
            Value::String(s) if !s.trim().is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Self { job_id })
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.job_id)
    }
}

/// Remote job status as observed by one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    /// Interprets the `status` field of a poll response
    ///
    /// Only `"pending"` keeps the job alive. A missing or unrecognised
    /// status is terminal and counts as a failure.
    pub fn from_wire(status: Option<&str>) -> Self {
        match status {
            Some("pending") => Self::Pending,
            Some("completed") => Self::Completed,
            _ => Self::Failed,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}
