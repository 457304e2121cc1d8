//! Error types for airscan.
//!
//! Uses `thiserror` for ergonomic error definitions. Every failure in the
//! scan pipeline maps to exactly one variant so the binary can print
//! targeted guidance per kind. None of these are retried automatically:
//! each one ends the current scan attempt.

use thiserror::Error;

/// Main error type for scanner operations.
#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("no scanner found on the local network")]
    NotFound,

    #[error("service discovery failed: {0}")]
    Discovery(String),

    #[error("scanner is busy (state: {0})")]
    Busy(String),

    #[error("scanner does not support {0}")]
    CapabilityMismatch(&'static str),

    #[error("could not parse region {spec:?}: {reason}")]
    RegionParse { spec: String, reason: String },

    #[error("scan job failed: {0}")]
    JobFailed(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed scanner status document: {0}")]
    StatusParse(#[from] quick_xml::DeError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<mdns_sd::Error> for ScannerError {
    fn from(e: mdns_sd::Error) -> Self {
        Self::Discovery(e.to_string())
    }
}

/// Result type alias for scanner operations.
pub type ScanResult<T> = Result<T, ScannerError>;
