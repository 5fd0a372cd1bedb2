//! Scheduler layer for the CLI
//!
//! This layer watches a single remote batch job until it settles, handing
//! succeeded jobs to the materializer. Timing goes through the [`Clock`]
//! trait so the loop can be driven deterministically in tests.

pub mod poller;

pub use poller::{Clock, JobPoller, PollOutcome, PollPolicy, TokioClock};
