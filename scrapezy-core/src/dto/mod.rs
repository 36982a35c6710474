//! Data Transfer Objects for the remote extraction API
//!
//! The remote service is loose about its response shapes, so the response
//! DTOs keep most fields as raw JSON and leave interpretation to the domain
//! conversions.

pub mod job;
