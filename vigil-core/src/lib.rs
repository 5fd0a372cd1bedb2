//! Vigil Core
//!
//! Core types and pure logic for the Vigil batch tooling.
//!
//! This crate contains:
//! - Domain types: job names, job states, status snapshots and sealed envelopes
//! - DTOs: wire shapes of the remote batch API, normalized at the boundary
//! - Hashing: canonical JSON serialization and content digests
//! - Preview: best-effort rendering of downloaded JSONL results

pub mod domain;
pub mod dto;
pub mod hashing;
pub mod preview;
