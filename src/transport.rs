//! HTTP transport to the scanner.
//!
//! [`TransportSession`] is a pre-configured `reqwest` client bound to the
//! discovered base URL. Network scanners routinely present self-signed
//! certificates, so verification is disabled. The [`Transport`] trait is the
//! seam the probe and job controller are written against; tests drive them
//! with a simulated device instead of a socket.

use crate::error::{ScanResult, ScannerError};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Per-request timeout. Scanners can take a while to warm up a lamp, but a
/// single round-trip should never sit longer than this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Protocol operations against one scanner endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET {base}/ScannerCapabilities`. Reachability check only; the
    /// response body is not interpreted.
    async fn fetch_capabilities(&self) -> ScanResult<()>;

    /// `GET {base}/ScannerStatus`, returning the raw XML document.
    async fn fetch_status(&self) -> ScanResult<String>;

    /// `POST {base}/ScanJobs` with a settings document, returning the new
    /// job's URI from the `Location` header.
    async fn submit_job(&self, settings_xml: &str) -> ScanResult<String>;

    /// `GET {jobURI}/NextDocument`. `None` means the device has no further
    /// documents for this job (the 404 exhaustion signal).
    async fn fetch_next_document(&self, job_uri: &str) -> ScanResult<Option<Vec<u8>>>;
}

/// Live HTTP session against a discovered scanner.
pub struct TransportSession {
    client: Client,
    base_url: String,
}

impl TransportSession {
    /// Build a session for the given base URL (`http://host:port/root`).
    pub fn new(base_url: impl Into<String>) -> ScanResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve a possibly path-only `Location` value against this session's
    /// origin. Most devices return an absolute URL; some return just the
    /// path.
    fn absolute(&self, location: &str) -> String {
        if location.starts_with('/') {
            format!("{}{}", origin_of(&self.base_url), location)
        } else {
            location.to_string()
        }
    }
}

/// `scheme://host:port` portion of a base URL.
fn origin_of(base_url: &str) -> &str {
    let after_scheme = base_url.find("://").map(|i| i + 3).unwrap_or(0);
    match base_url[after_scheme..].find('/') {
        Some(i) => &base_url[..after_scheme + i],
        None => base_url,
    }
}

#[async_trait]
impl Transport for TransportSession {
    async fn fetch_capabilities(&self) -> ScanResult<()> {
        let url = self.url("/ScannerCapabilities");
        debug!(%url, "fetching capabilities");
        self.client.get(url).send().await?.error_for_status()?;
        Ok(())
    }

    async fn fetch_status(&self) -> ScanResult<String> {
        let url = self.url("/ScannerStatus");
        debug!(%url, "fetching status");
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }

    async fn submit_job(&self, settings_xml: &str) -> ScanResult<String> {
        let url = self.url("/ScanJobs");
        debug!(%url, "submitting scan job");
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/xml")
            .body(settings_xml.to_string())
            .send()
            .await?
            .error_for_status()?;

        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ScannerError::JobFailed("job creation response missing Location header".to_string())
            })?;
        Ok(self.absolute(location))
    }

    async fn fetch_next_document(&self, job_uri: &str) -> ScanResult<Option<Vec<u8>>> {
        let url = format!("{job_uri}/NextDocument");
        debug!(%url, "fetching next document");
        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp.error_for_status()?;
        Ok(Some(resp.bytes().await?.to_vec()))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! A scripted device for probe and job-controller tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Simulated scanner: a queue of status documents (the last one repeats
    /// once the queue runs dry) and a queue of page payloads followed by the
    /// 404 exhaustion signal.
    pub(crate) struct MockDevice {
        statuses: Mutex<VecDeque<String>>,
        documents: Mutex<VecDeque<Vec<u8>>>,
        pub(crate) location: String,
        pub(crate) jobs_submitted: AtomicUsize,
        pub(crate) document_fetches: AtomicUsize,
    }

    impl MockDevice {
        pub(crate) fn new(statuses: Vec<String>, documents: Vec<Vec<u8>>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                documents: Mutex::new(documents.into()),
                location: "http://device:80/eSCL/ScanJobs/job-1".to_string(),
                jobs_submitted: AtomicUsize::new(0),
                document_fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for MockDevice {
        async fn fetch_capabilities(&self) -> ScanResult<()> {
            Ok(())
        }

        async fn fetch_status(&self) -> ScanResult<String> {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.pop_front().unwrap())
            } else {
                statuses
                    .front()
                    .cloned()
                    .ok_or_else(|| ScannerError::JobFailed("mock has no statuses".to_string()))
            }
        }

        async fn submit_job(&self, _settings_xml: &str) -> ScanResult<String> {
            self.jobs_submitted.fetch_add(1, Ordering::SeqCst);
            Ok(self.location.clone())
        }

        async fn fetch_next_document(&self, _job_uri: &str) -> ScanResult<Option<Vec<u8>>> {
            self.document_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.documents.lock().unwrap().pop_front())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of() {
        assert_eq!(origin_of("http://printer.local:8080/eSCL"), "http://printer.local:8080");
        assert_eq!(origin_of("http://printer.local:8080"), "http://printer.local:8080");
    }

    #[test]
    fn test_absolute_location() {
        let session = TransportSession::new("http://printer.local:8080/eSCL").unwrap();
        assert_eq!(
            session.absolute("/eSCL/ScanJobs/abc"),
            "http://printer.local:8080/eSCL/ScanJobs/abc"
        );
        assert_eq!(
            session.absolute("http://printer.local:8080/eSCL/ScanJobs/abc"),
            "http://printer.local:8080/eSCL/ScanJobs/abc"
        );
    }
}
