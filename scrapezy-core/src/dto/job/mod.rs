//! Job DTOs for the remote extraction API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::job::{JobHandle, JobStatus};
use crate::domain::outcome::UNKNOWN_ERROR_MESSAGE;
use crate::domain::request::ExtractionRequest;

/// Body of the job-creation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitJob {
    pub url: String,
    pub prompt: String,
}

impl From<&ExtractionRequest> for SubmitJob {
    fn from(req: &ExtractionRequest) -> Self {
        Self {
            url: req.url().to_string(),
            prompt: req.prompt().to_string(),
        }
    }
}

/// Response to the job-creation call
///
/// Rejections come back in the same shape without a `jobId`, usually with
/// an `error` field instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    #[serde(rename = "jobId", default)]
    pub job_id: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl SubmitJobResponse {
    pub fn job_handle(&self) -> Option<JobHandle> {
        self.job_id.as_ref().and_then(JobHandle::from_value)
    }
}

/// Response to a status query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollJobResponse {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl PollJobResponse {
    pub fn status(&self) -> JobStatus {
        JobStatus::from_wire(self.status.as_ref().and_then(Value::as_str))
    }

    /// Result payload, if the service reported a usable one
    ///
    /// `null`, `false`, `0` and `""` count as no payload; empty arrays and
    /// objects are still payloads.
    pub fn payload(&self) -> Option<&Value> {
        self.result.as_ref().filter(|value| is_truthy(value))
    }

    /// Error text reported by the service, or a generic fallback
    ///
    /// Empty or zero-like error values fall back the same way as a missing one.
    pub fn error_message(&self) -> String {
        match self.error.as_ref().filter(|value| is_truthy(value)) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Whether a value carries anything, with `null`, `false`, zero and the
/// empty string counting as nothing
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
