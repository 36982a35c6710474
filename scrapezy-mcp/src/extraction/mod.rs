//! Extraction layer
//!
//! Runs remote extraction jobs to completion and renders their outcome
//! for the calling agent.

pub mod poller;
pub mod presenter;

pub use poller::JobPoller;
