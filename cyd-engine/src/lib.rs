//! Dataset retrieval and load-sequence orchestration.
//!
//! The [`source::DataSource`] trait is the network seam: the real
//! [`source::HttpSource`] fetches over HTTP, while tests substitute
//! canned responses. [`loader`] converts raw payloads into typed record
//! sequences, and [`orchestrator::Orchestrator`] sequences the
//! dependent loads, commits each stage into the state store, applies
//! the averaged-prediction fallback policy, and mirrors job-queue
//! mutations to durable storage.

pub mod loader;
pub mod orchestrator;
pub mod paths;
pub mod source;
