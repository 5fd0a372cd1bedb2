//! Data Transfer Objects for the remote batch API
//!
//! The remote service has shipped several response layouts over time. They
//! are modelled here as one tagged union and normalized into the domain
//! `JobSnapshot` before any logic looks at them.

pub mod batch;
