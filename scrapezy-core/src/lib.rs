//! Scrapezy Core
//!
//! Core types shared by the Scrapezy extraction client and MCP server.
//!
//! This crate contains:
//! - Domain types: extraction requests, credentials, job handles and outcomes
//! - DTOs: wire bodies exchanged with the remote extraction API

pub mod domain;
pub mod dto;
