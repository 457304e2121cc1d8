//! Scan job control.
//!
//! [`ScanJobController`] owns the whole job lifecycle:
//! `Created -> Submitted -> Polling -> {Completed, Aborted, Failed}`.
//! Submission posts a settings document and derives the job identifier from
//! the response's `Location`. The poll loop alternates status fetches and
//! document fetches until the device signals exhaustion, then finalization
//! reconciles the job's terminal reason against the status job list.

use crate::config::{OutputFormat, ScanRequestConfig, COLOR_MODE};
use crate::error::{ScanResult, ScannerError};
use crate::region::ScanRegion;
use crate::status::{StatusSnapshot, JOB_STATE_ABORTED, REASON_COMPLETED_SUCCESSFULLY};
use crate::transport::Transport;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Delay between poll iterations. The repetition is a data-availability
/// wait, not an error retry; this keeps the device from being hammered.
pub const JOB_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Created,
    Submitted,
    Polling,
    Completed,
    Aborted,
    Failed,
}

/// Runtime record of one accepted job. Discarded when the controller is
/// dropped; nothing persists beyond the process.
#[derive(Debug, Clone)]
pub struct ScanJob {
    /// Job URI from the creation response's `Location`.
    pub uri: String,
    /// Final path segment of the URI. Never changes once derived.
    pub id: String,
    /// Next page number to write. Starts at 1, strictly increasing.
    pub next_page: u32,
    /// Device state seen by the most recent poll.
    pub last_state: Option<String>,
}

/// Drives exactly one scan job end to end against one device.
pub struct ScanJobController<'a, T: Transport + ?Sized> {
    transport: &'a T,
    config: &'a ScanRequestConfig,
    /// Resolved output path for the combined file / page-file base name.
    output: PathBuf,
    poll_interval: Duration,
    phase: JobPhase,
    job: Option<ScanJob>,
}

impl<'a, T: Transport + ?Sized> ScanJobController<'a, T> {
    pub fn new(transport: &'a T, config: &'a ScanRequestConfig, output: PathBuf) -> Self {
        Self {
            transport,
            config,
            output,
            poll_interval: JOB_POLL_INTERVAL,
            phase: JobPhase::Created,
            job: None,
        }
    }

    /// Override the inter-poll delay (tests use zero).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn job(&self) -> Option<&ScanJob> {
        self.job.as_ref()
    }

    /// Submit the job settings document and record the accepted job.
    pub async fn submit(&mut self, region: Option<&ScanRegion>) -> ScanResult<()> {
        let settings = settings_xml(self.config, region);
        let uri = self.transport.submit_job(&settings).await?;
        let id = uri
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        debug!(%uri, %id, "scan job accepted");

        self.job = Some(ScanJob {
            uri,
            id,
            next_page: 1,
            last_state: None,
        });
        self.phase = JobPhase::Submitted;
        Ok(())
    }

    /// Poll the device and retrieve documents until exhaustion.
    ///
    /// Each iteration takes a fresh status snapshot, then attempts one
    /// document fetch. A "no more documents" signal stops the loop
    /// unconditionally; otherwise it continues while the device reports
    /// `Processing`, sleeping between iterations. Returns the number of
    /// pages written.
    pub async fn retrieve_pages(&mut self) -> ScanResult<u32> {
        let job = self
            .job
            .as_mut()
            .ok_or_else(|| ScannerError::JobFailed("job was never submitted".to_string()))?;
        self.phase = JobPhase::Polling;
        let mut pages_written = 0u32;

        loop {
            let snapshot = StatusSnapshot::parse(&self.transport.fetch_status().await?)?;
            job.last_state = Some(snapshot.state.clone());

            match self.transport.fetch_next_document(&job.uri).await? {
                None => {
                    debug!("device reports no further documents");
                    break;
                }
                Some(data) => {
                    let path = write_document(self.config.format, &self.output, &data, job.next_page)?;
                    info!(page = job.next_page, path = %path.display(), "page written");
                    job.next_page += 1;
                    pages_written += 1;
                }
            }

            if !snapshot.is_processing() {
                break;
            }
            sleep(self.poll_interval).await;
        }

        Ok(pages_written)
    }

    /// Take one last status snapshot and judge the job's outcome.
    ///
    /// The first listed completion reason is authoritative. An explicit
    /// non-success reason fails the job. With no reason at all, a job found
    /// in a `Completed` or `Aborted` terminal state passes; anything else
    /// fails with the best available state string.
    pub async fn finalize(&mut self) -> ScanResult<()> {
        let job_id = self
            .job
            .as_ref()
            .map(|j| j.id.clone())
            .ok_or_else(|| ScannerError::JobFailed("job was never submitted".to_string()))?;

        let snapshot = StatusSnapshot::parse(&self.transport.fetch_status().await?)?;
        let record = match snapshot.find_job(&job_id) {
            Some(record) => record,
            None => {
                self.phase = JobPhase::Failed;
                return Err(ScannerError::JobFailed(format!(
                    "job {job_id} not found in scanner status"
                )));
            }
        };

        match record.first_reason() {
            Some(REASON_COMPLETED_SUCCESSFULLY) => {
                self.phase = JobPhase::Completed;
                Ok(())
            }
            Some(reason) => {
                self.phase = JobPhase::Failed;
                Err(ScannerError::JobFailed(reason.to_string()))
            }
            None if record.is_terminal() => {
                // No reason on a terminal job counts as success.
                self.phase = if record.state.as_deref() == Some(JOB_STATE_ABORTED) {
                    JobPhase::Aborted
                } else {
                    JobPhase::Completed
                };
                Ok(())
            }
            None => {
                self.phase = JobPhase::Failed;
                Err(ScannerError::JobFailed(
                    record
                        .state
                        .clone()
                        .unwrap_or_else(|| "no completion reason reported".to_string()),
                ))
            }
        }
    }

    /// Run the whole job: submit, retrieve all pages, finalize.
    pub async fn execute(&mut self, region: Option<&ScanRegion>) -> ScanResult<u32> {
        self.submit(region).await?;
        let pages = self.retrieve_pages().await?;
        self.finalize().await?;
        Ok(pages)
    }
}

/// Build the eSCL ScanSettings document for one request.
fn settings_xml(config: &ScanRequestConfig, region: Option<&ScanRegion>) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <scan:ScanSettings xmlns:scan=\"http://schemas.hp.com/imaging/escl/2011/05/03\" \
         xmlns:pwg=\"http://www.pwg.org/schemas/2010/12/sm\">\n  \
         <pwg:Version>2.0</pwg:Version>\n  \
         <scan:Intent>TextAndGraphic</scan:Intent>\n  \
         <pwg:DocumentFormat>{format}</pwg:DocumentFormat>\n  \
         {source}\n  \
         <scan:ColorMode>{color}</scan:ColorMode>\n  \
         <scan:Duplex>{duplex}</scan:Duplex>\n  \
         <scan:XResolution>{dpi}</scan:XResolution>\n  \
         <scan:YResolution>{dpi}</scan:YResolution>",
        format = config.format.mime_type(),
        source = config.source.xml_fragment(),
        color = COLOR_MODE,
        duplex = config.duplex,
        dpi = config.resolution.dpi(),
    );
    if let Some(region) = region {
        xml.push_str(&region.to_xml());
    }
    xml.push_str("\n</scan:ScanSettings>");
    xml
}

/// Write one retrieved document. Single-file formats overwrite the one
/// combined target; per-page formats get a page-number suffix inserted
/// before the extension.
fn write_document(
    format: OutputFormat,
    output: &Path,
    data: &[u8],
    page: u32,
) -> ScanResult<PathBuf> {
    let path = if format.is_single_file() {
        output.to_path_buf()
    } else {
        page_path(output, page)
    };
    fs::write(&path, data)?;
    Ok(path)
}

/// `Scan.jpeg` -> `Scan-3.jpeg` for page 3.
fn page_path(output: &Path, page: u32) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scan");
    let name = match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-{page}.{ext}"),
        None => format!("{stem}-{page}"),
    };
    output.with_file_name(name)
}
