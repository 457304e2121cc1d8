//! Pre-flight readiness checks.
//!
//! Before a job is created the device must be reachable, idle, and capable
//! of everything the request asks for. This is a precondition gate, not a
//! retryable step: any failure here ends the scan attempt.

use crate::config::ScanRequestConfig;
use crate::discovery::ScannerEndpoint;
use crate::error::{ScanResult, ScannerError};
use crate::status::StatusSnapshot;
use crate::transport::Transport;
use tracing::debug;

/// Validates a discovered scanner against one scan request.
pub struct CapabilitiesProbe<'a, T: Transport + ?Sized> {
    transport: &'a T,
    endpoint: &'a ScannerEndpoint,
}

impl<'a, T: Transport + ?Sized> CapabilitiesProbe<'a, T> {
    pub fn new(transport: &'a T, endpoint: &'a ScannerEndpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Run all checks. Must complete before any job is created.
    pub async fn ensure_ready(&self, config: &ScanRequestConfig) -> ScanResult<()> {
        // Reachability only; the capabilities document is not interpreted.
        self.transport.fetch_capabilities().await?;

        let snapshot = StatusSnapshot::parse(&self.transport.fetch_status().await?)?;
        if !snapshot.is_idle() {
            return Err(ScannerError::Busy(snapshot.state));
        }

        if config.duplex && !self.endpoint.duplex {
            return Err(ScannerError::CapabilityMismatch("duplex scanning"));
        }

        debug!("scanner is idle and capable");
        Ok(())
    }
}
