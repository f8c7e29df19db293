//! Error taxonomy for dataset retrieval and decoding.

use std::fmt;

/// Errors that can occur while fetching or decoding a dataset.
///
/// These never propagate past the orchestrator: every variant is
/// converted into an empty-but-valid record sequence at the loader
/// boundary, so a missing dataset renders as "no data", not a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network-level failure: DNS, timeout, connection reset, abort.
    Transport(String),
    /// The server answered with a non-2xx status code.
    HttpStatus(u16),
    /// The payload could not be interpreted as the expected format.
    Decode(String),
    /// A record was missing a required key.
    MissingField(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "transport error: {}", msg),
            FetchError::HttpStatus(code) => write!(f, "http status {}", code),
            FetchError::Decode(msg) => write!(f, "decode error: {}", msg),
            FetchError::MissingField(field) => write!(f, "missing field: {}", field),
        }
    }
}

impl std::error::Error for FetchError {}
