//! Scanner discovery over multicast DNS.
//!
//! Browses for `_uscan._tcp.local.` services and takes the first responder.
//! Discovery is a bounded wait, not a callback registry: the caller blocks
//! on the event channel, re-checking the deadline at a fixed poll interval,
//! and gets back a plain [`ScannerEndpoint`] or a not-found error.

use crate::error::{ScanResult, ScannerError};
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::debug;

/// eSCL scanners advertise under this service type.
pub const SERVICE_TYPE: &str = "_uscan._tcp.local.";

/// How long to wait for a responder before giving up.
pub const DISCOVERY_WINDOW: Duration = Duration::from_secs(10);

/// How often the wait loop re-checks its deadline.
pub const DISCOVERY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Resource root assumed when the TXT record omits `rs`.
const DEFAULT_RESOURCE_ROOT: &str = "/eSCL";

/// A discovered scanner. Immutable once discovery completes; everything in
/// here is derived from the mDNS service record.
#[derive(Debug, Clone)]
pub struct ScannerEndpoint {
    pub host: String,
    pub port: u16,
    /// Resource root path, always starting with `/`.
    pub root: String,
    /// Whether the TXT record advertises duplex support.
    pub duplex: bool,
    /// Service instance name with the service-type suffix stripped.
    pub name: String,
}

impl ScannerEndpoint {
    fn from_service(info: &ServiceInfo) -> Self {
        let props = info.get_properties();
        let root = props
            .get_property_val_str("rs")
            .map(normalize_root)
            .unwrap_or_else(|| DEFAULT_RESOURCE_ROOT.to_string());
        let duplex = props.get_property_val_str("duplex") == Some("T");

        Self {
            host: info.get_hostname().trim_end_matches('.').to_string(),
            port: info.get_port(),
            root,
            duplex,
            name: strip_service_suffix(info.get_fullname()).to_string(),
        }
    }

    /// Base address all protocol requests are issued against.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.root)
    }
}

fn normalize_root(rs: &str) -> String {
    if rs.starts_with('/') {
        rs.to_string()
    } else {
        format!("/{rs}")
    }
}

fn strip_service_suffix(fullname: &str) -> &str {
    fullname
        .strip_suffix(&format!(".{SERVICE_TYPE}"))
        .or_else(|| fullname.strip_suffix(SERVICE_TYPE).map(|n| n.trim_end_matches('.')))
        .unwrap_or(fullname)
}

/// Finds a scanner on the local network.
pub struct ServiceLocator {
    window: Duration,
    poll_interval: Duration,
}

impl Default for ServiceLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceLocator {
    pub fn new() -> Self {
        Self {
            window: DISCOVERY_WINDOW,
            poll_interval: DISCOVERY_POLL_INTERVAL,
        }
    }

    /// Override the discovery window (tests use short windows).
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Override the deadline poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Browse for a scanner, returning the first responder resolved within
    /// the window. Multiple responders are not ranked or disambiguated.
    pub async fn discover(&self) -> ScanResult<ScannerEndpoint> {
        let daemon = ServiceDaemon::new()?;
        let events = daemon.browse(SERVICE_TYPE)?;
        debug!(service_type = SERVICE_TYPE, "browsing for scanners");

        let deadline = Instant::now() + self.window;
        let mut found = None;

        while Instant::now() < deadline {
            match timeout(self.poll_interval, events.recv_async()).await {
                Ok(Ok(ServiceEvent::ServiceResolved(info))) => {
                    debug!(fullname = info.get_fullname(), "scanner resolved");
                    found = Some(ScannerEndpoint::from_service(&info));
                    break;
                }
                Ok(Ok(_)) => continue,
                // Event channel closed underneath us.
                Ok(Err(_)) => break,
                // Poll interval elapsed, re-check the deadline.
                Err(_) => continue,
            }
        }

        let _ = daemon.shutdown();
        found.ok_or(ScannerError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root("eSCL"), "/eSCL");
        assert_eq!(normalize_root("/eSCL"), "/eSCL");
    }

    #[test]
    fn test_strip_service_suffix() {
        assert_eq!(
            strip_service_suffix("Brother MFC-L2750DW._uscan._tcp.local."),
            "Brother MFC-L2750DW"
        );
        assert_eq!(strip_service_suffix("NoSuffix"), "NoSuffix");
    }

    #[test]
    fn test_base_url() {
        let endpoint = ScannerEndpoint {
            host: "printer.local".to_string(),
            port: 8080,
            root: "/eSCL".to_string(),
            duplex: true,
            name: "Printer".to_string(),
        };
        assert_eq!(endpoint.base_url(), "http://printer.local:8080/eSCL");
    }

    #[tokio::test]
    async fn test_discovery_times_out_quickly() {
        // No scanner should be answering in the test environment; a short
        // window must produce NotFound rather than hanging.
        let locator = ServiceLocator::new()
            .with_window(Duration::from_millis(200))
            .with_poll_interval(Duration::from_millis(20));
        match locator.discover().await {
            Err(ScannerError::NotFound) | Err(ScannerError::Discovery(_)) => {}
            other => panic!("expected discovery failure, got {other:?}"),
        }
    }
}
