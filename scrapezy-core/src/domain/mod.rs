//! Core domain types
//!
//! These types describe a single extraction run: what was asked for, the
//! credential used to ask, the remote job that serves it and the outcome it
//! ends with. None of them are persisted.

pub mod credential;
pub mod job;
pub mod outcome;
pub mod request;

pub use credential::Credential;
pub use job::{JobHandle, JobStatus};
pub use outcome::{ExtractionFailure, ExtractionOutcome, FailureKind};
pub use request::{ExtractionRequest, RequestError};
