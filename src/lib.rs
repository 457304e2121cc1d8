//! # airscan - eSCL/AirScan Network Scanner Client
//!
//! airscan drives a network-attached document scanner over the eSCL
//! protocol: it discovers a device via multicast DNS, verifies it is idle
//! and capable of the requested options, submits a scan job, retrieves the
//! produced pages, and reconciles the job's terminal status.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use airscan::config::{InputSource, OutputFormat, Resolution, ScanRequestConfig};
//! use airscan::discovery::ServiceLocator;
//! use airscan::job::ScanJobController;
//! use airscan::probe::CapabilitiesProbe;
//! use airscan::transport::TransportSession;
//!
//! #[tokio::main]
//! async fn main() -> airscan::error::ScanResult<()> {
//!     let config = ScanRequestConfig {
//!         source: InputSource::Automatic,
//!         format: OutputFormat::Pdf,
//!         resolution: Resolution::Dpi300,
//!         duplex: false,
//!         region: None,
//!         filename: "Scan.pdf".into(),
//!     };
//!
//!     let endpoint = ServiceLocator::new().discover().await?;
//!     let session = TransportSession::new(endpoint.base_url())?;
//!     CapabilitiesProbe::new(&session, &endpoint)
//!         .ensure_ready(&config)
//!         .await?;
//!
//!     let mut controller = ScanJobController::new(&session, &config, "Scan.pdf".into());
//!     let pages = controller.execute(None).await?;
//!     println!("scanned {pages} page(s)");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`discovery`] - mDNS service location with a bounded wait
//! - [`transport`] - pre-configured HTTP session and the `Transport` seam
//! - [`probe`] - pre-flight readiness and capability checks
//! - [`status`] - ScannerStatus document parsing and job lookup
//! - [`region`] - paper-size and rectangle parsing into device units
//! - [`job`] - job submission, the poll/retrieve loop, finalization
//! - [`config`] - the immutable per-scan request
//! - [`cli`] / [`output`] - argument surface and terminal output
//! - [`error`] - closed error enumeration

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod job;
pub mod output;
pub mod probe;
pub mod region;
pub mod status;
pub mod transport;

// Re-export commonly used types
pub use config::{InputSource, OutputFormat, Resolution, ScanRequestConfig};
pub use discovery::{ScannerEndpoint, ServiceLocator};
pub use error::{ScanResult, ScannerError};
pub use job::{JobPhase, ScanJob, ScanJobController};
pub use probe::CapabilitiesProbe;
pub use region::{parse_region, ScanRegion};
pub use status::{JobRecord, StatusSnapshot};
pub use transport::{Transport, TransportSession};
