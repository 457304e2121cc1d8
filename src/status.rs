//! ScannerStatus document parsing.
//!
//! The device reports its state and a job list as XML. The wire structs
//! below carry the serde field-mapping table; [`StatusSnapshot`] is the
//! normalized form the rest of the crate consumes. One rule applies
//! uniformly: job entries are always list-shaped, even when the document
//! contains a single `scan:JobInfo` element or no `scan:Jobs` block at all.

use crate::error::ScanResult;
use serde::Deserialize;

/// Device state the probe requires before a job may be created.
pub const STATE_IDLE: &str = "Idle";
/// Device state that keeps the poll loop running.
pub const STATE_PROCESSING: &str = "Processing";

/// The one completion reason that counts as success.
pub const REASON_COMPLETED_SUCCESSFULLY: &str = "JobCompletedSuccessfully";

/// Terminal job states. Acceptable without a completion reason.
pub const JOB_STATE_COMPLETED: &str = "Completed";
pub const JOB_STATE_ABORTED: &str = "Aborted";

/// Scheme prefix devices prepend to advertised job identifiers.
const URN_UUID_PREFIX: &str = "urn:uuid:";

#[derive(Debug, Deserialize)]
struct RawStatus {
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Jobs")]
    jobs: Option<RawJobs>,
}

#[derive(Debug, Deserialize)]
struct RawJobs {
    #[serde(rename = "JobInfo", default)]
    entries: Vec<RawJobInfo>,
}

#[derive(Debug, Deserialize)]
struct RawJobInfo {
    #[serde(rename = "JobUuid", default)]
    uuid: String,
    #[serde(rename = "JobState")]
    state: Option<String>,
    #[serde(rename = "JobStateReasons")]
    reasons: Option<RawReasons>,
}

#[derive(Debug, Deserialize)]
struct RawReasons {
    #[serde(rename = "JobStateReason", default)]
    reasons: Vec<String>,
}

/// One job record from a status document.
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// Identifier as advertised, possibly `urn:uuid:`-prefixed.
    pub uuid: String,
    pub state: Option<String>,
    pub reasons: Vec<String>,
}

impl JobRecord {
    /// The authoritative completion reason: the first one listed.
    pub fn first_reason(&self) -> Option<&str> {
        self.reasons.first().map(String::as_str)
    }

    /// Whether the reported state is an acceptable terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state.as_deref(),
            Some(JOB_STATE_COMPLETED) | Some(JOB_STATE_ABORTED)
        )
    }

    /// Compare against a job identifier derived from a job URI, stripping
    /// the `urn:uuid:` scheme prefix the device may prepend.
    pub fn matches(&self, job_id: &str) -> bool {
        self.uuid
            .strip_prefix(URN_UUID_PREFIX)
            .unwrap_or(&self.uuid)
            == job_id
    }
}

/// Parsed result of one `GET {base}/ScannerStatus` round-trip. Never cached:
/// each poll produces a fresh snapshot.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// Top-level device state, e.g. `Idle` or `Processing`.
    pub state: String,
    /// All job records, list-shaped regardless of the wire representation.
    pub jobs: Vec<JobRecord>,
}

impl StatusSnapshot {
    /// Parse a ScannerStatus XML document.
    pub fn parse(xml: &str) -> ScanResult<Self> {
        let raw: RawStatus = quick_xml::de::from_str(xml)?;
        let jobs = raw
            .jobs
            .map(|j| j.entries)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| JobRecord {
                uuid: entry.uuid,
                state: entry.state,
                reasons: entry.reasons.map(|r| r.reasons).unwrap_or_default(),
            })
            .collect();
        Ok(Self {
            state: raw.state,
            jobs,
        })
    }

    pub fn is_idle(&self) -> bool {
        self.state == STATE_IDLE
    }

    pub fn is_processing(&self) -> bool {
        self.state == STATE_PROCESSING
    }

    /// Find this job's record by identifier.
    pub fn find_job(&self, job_id: &str) -> Option<&JobRecord> {
        self.jobs.iter().find(|job| job.matches(job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "xmlns:scan=\"http://schemas.hp.com/imaging/escl/2011/05/03\" \
                      xmlns:pwg=\"http://www.pwg.org/schemas/2010/12/sm\"";

    fn status_doc(state: &str, jobs: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <scan:ScannerStatus {NS}>\
             <pwg:Version>2.6</pwg:Version>\
             <pwg:State>{state}</pwg:State>\
             {jobs}\
             </scan:ScannerStatus>"
        )
    }

    fn job_info(uuid: &str, state: &str, reasons: &[&str]) -> String {
        let reasons_xml = if reasons.is_empty() {
            String::new()
        } else {
            let inner: String = reasons
                .iter()
                .map(|r| format!("<pwg:JobStateReason>{r}</pwg:JobStateReason>"))
                .collect();
            format!("<pwg:JobStateReasons>{inner}</pwg:JobStateReasons>")
        };
        format!(
            "<scan:JobInfo>\
             <pwg:JobUuid>{uuid}</pwg:JobUuid>\
             <pwg:JobState>{state}</pwg:JobState>\
             {reasons_xml}\
             </scan:JobInfo>"
        )
    }

    #[test]
    fn test_parse_without_jobs() {
        let snapshot = StatusSnapshot::parse(&status_doc("Idle", "")).unwrap();
        assert!(snapshot.is_idle());
        assert!(!snapshot.is_processing());
        assert!(snapshot.jobs.is_empty());
    }

    #[test]
    fn test_single_job_becomes_list() {
        let jobs = format!(
            "<scan:Jobs>{}</scan:Jobs>",
            job_info("urn:uuid:abc-123", "Processing", &[])
        );
        let snapshot = StatusSnapshot::parse(&status_doc("Processing", &jobs)).unwrap();
        assert!(snapshot.is_processing());
        assert_eq!(snapshot.jobs.len(), 1);
        assert_eq!(snapshot.jobs[0].uuid, "urn:uuid:abc-123");
    }

    #[test]
    fn test_multiple_jobs() {
        let jobs = format!(
            "<scan:Jobs>{}{}</scan:Jobs>",
            job_info("urn:uuid:first", "Completed", &["JobCompletedSuccessfully"]),
            job_info("urn:uuid:second", "Processing", &[])
        );
        let snapshot = StatusSnapshot::parse(&status_doc("Processing", &jobs)).unwrap();
        assert_eq!(snapshot.jobs.len(), 2);
    }

    #[test]
    fn test_find_job_strips_urn_prefix() {
        let jobs = format!(
            "<scan:Jobs>{}</scan:Jobs>",
            job_info("urn:uuid:abc-123", "Completed", &[])
        );
        let snapshot = StatusSnapshot::parse(&status_doc("Idle", &jobs)).unwrap();
        assert!(snapshot.find_job("abc-123").is_some());
        assert!(snapshot.find_job("urn:uuid:abc-123").is_none());
        assert!(snapshot.find_job("other").is_none());
    }

    #[test]
    fn test_unprefixed_uuid_still_matches() {
        let jobs = format!(
            "<scan:Jobs>{}</scan:Jobs>",
            job_info("abc-123", "Completed", &[])
        );
        let snapshot = StatusSnapshot::parse(&status_doc("Idle", &jobs)).unwrap();
        assert!(snapshot.find_job("abc-123").is_some());
    }

    #[test]
    fn test_first_reason_is_authoritative() {
        let jobs = format!(
            "<scan:Jobs>{}</scan:Jobs>",
            job_info(
                "urn:uuid:x",
                "Aborted",
                &["JobCanceledByUser", "JobCompletedWithErrors"]
            )
        );
        let snapshot = StatusSnapshot::parse(&status_doc("Idle", &jobs)).unwrap();
        let job = snapshot.find_job("x").unwrap();
        assert_eq!(job.first_reason(), Some("JobCanceledByUser"));
        assert!(job.is_terminal());
    }

    #[test]
    fn test_missing_reason_and_state_helpers() {
        let jobs = format!(
            "<scan:Jobs>{}</scan:Jobs>",
            job_info("urn:uuid:x", "Pending", &[])
        );
        let snapshot = StatusSnapshot::parse(&status_doc("Idle", &jobs)).unwrap();
        let job = snapshot.find_job("x").unwrap();
        assert_eq!(job.first_reason(), None);
        assert!(!job.is_terminal());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(StatusSnapshot::parse("not xml at all").is_err());
    }
}
