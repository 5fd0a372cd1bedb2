//! Core domain types
//!
//! These types are shared between the CLI (which polls and seals) and the
//! gateway (which seals on behalf of HTTP callers). Remote wire shapes never
//! leak past this layer: the client normalizes them into `JobSnapshot`.

pub mod envelope;
pub mod job;
