//! User-facing terminal output.
//!
//! Styled status lines plus the per-error-kind guidance printed when a scan
//! attempt fails, so the user gets one actionable hint instead of a bare
//! error string.

use crate::error::ScannerError;
use console::style;

/// Print an informational message.
pub fn print_info(message: &str) {
    println!("{} {}", style("::").cyan().bold(), message);
}

/// Print a warning to stderr.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("warning:").yellow().bold(), message);
}

/// Print an error with its guidance line to stderr.
pub fn print_error(error: &ScannerError) {
    eprintln!("{} {}", style("error:").red().bold(), error);
    if let Some(hint) = guidance(error) {
        eprintln!("{} {}", style("hint:").dim(), hint);
    }
}

/// Targeted guidance per failure kind.
fn guidance(error: &ScannerError) -> Option<&'static str> {
    match error {
        ScannerError::NotFound | ScannerError::Discovery(_) => Some(
            "make sure your scanner is powered on and connected to the same network",
        ),
        ScannerError::Busy(_) => {
            Some("wait for the scanner to finish its current operation and try again")
        }
        ScannerError::JobFailed(_) => Some(
            "check that there is paper in the scanner and that it is properly positioned",
        ),
        ScannerError::CapabilityMismatch(_)
        | ScannerError::RegionParse { .. }
        | ScannerError::InvalidConfig(_) => {
            Some("check your scan settings against the scanner's capabilities")
        }
        ScannerError::Transport(_) | ScannerError::StatusParse(_) | ScannerError::Io(_) => {
            Some("this may be a network issue or a scanner communication problem")
        }
    }
}
