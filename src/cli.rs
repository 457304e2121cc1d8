//! Command-line interface definitions for airscan.
//!
//! Uses `clap` derive macros. Every option reads its default from an
//! environment variable (dotenv-style `SCAN_*` names), with the command
//! line taking priority. Also owns output-path resolution: the optional
//! `SCAN_DIRECTORY` prefix, auto-incrementing names that already exist,
//! and suffix validation against the chosen format.

use crate::config::{InputSource, OutputFormat, Resolution, ScanRequestConfig};
use crate::error::{ScanResult, ScannerError};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Scan documents from eSCL/AirScan-compatible network scanners.
#[derive(Parser, Debug)]
#[command(name = "airscan")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan documents from network scanners", long_about = None)]
pub struct Cli {
    /// Document input source
    #[arg(short = 'S', long, value_enum, env = "SCAN_SOURCE", default_value = "automatic")]
    pub source: InputSource,

    /// Output format
    #[arg(short = 'f', long, value_enum, env = "SCAN_FORMAT", default_value = "pdf")]
    pub format: OutputFormat,

    /// Scan resolution in DPI
    #[arg(short = 'r', long, value_enum, env = "SCAN_RESOLUTION", default_value = "300")]
    pub resolution: Resolution,

    /// Scan both sides of each sheet (requires a duplex-capable scanner)
    #[arg(short = 'D', long, env = "SCAN_DUPLEX")]
    pub duplex: bool,

    /// Region to scan: a paper size name (e.g. "a4", "letter") or an
    /// "Xoffset:Yoffset:Width:Height" rectangle with unit-suffixed lengths,
    /// e.g. "1cm:1.5cm:10cm:20cm"
    #[arg(short = 'R', long, env = "SCAN_REGION", default_value = "letter")]
    pub region: Option<String>,

    /// Output file name
    #[arg(value_name = "FILENAME", env = "SCAN_FILENAME", default_value = "Scan.jpeg")]
    pub filename: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Freeze the parsed arguments into an immutable scan request.
    pub fn into_config(self) -> ScanRequestConfig {
        ScanRequestConfig {
            source: self.source,
            format: self.format,
            resolution: self.resolution,
            duplex: self.duplex,
            region: self.region,
            filename: self.filename,
        }
    }
}

/// Resolve the final output path for a request.
///
/// Prepends `SCAN_DIRECTORY` when set, then auto-increments (`name 1.ext`,
/// `name 2.ext`, ...) until the path does not exist, and finally validates
/// the suffix against the output format.
pub fn resolve_output_path(config: &ScanRequestConfig) -> ScanResult<PathBuf> {
    let mut path = config.filename.clone();
    if let Ok(dir) = std::env::var("SCAN_DIRECTORY") {
        if !dir.is_empty() {
            path = Path::new(&dir).join(path);
        }
    }

    let path = next_free_path(&path);
    validate_suffix(&path, config.format)?;
    Ok(path)
}

/// First path in the `name`, `name 1`, `name 2`, ... sequence that does not
/// exist yet.
fn next_free_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Scan");
    let ext = path.extension().and_then(|e| e.to_str());

    let mut counter = 0u32;
    loop {
        counter += 1;
        let name = match ext {
            Some(ext) => format!("{stem} {counter}.{ext}"),
            None => format!("{stem} {counter}"),
        };
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// JPEG output must carry a JPEG suffix (or none at all).
fn validate_suffix(path: &Path, format: OutputFormat) -> ScanResult<()> {
    if format != OutputFormat::Jpeg {
        return Ok(());
    }
    match path.extension().and_then(|e| e.to_str()) {
        None | Some("jpeg") | Some("jpg") => Ok(()),
        Some(other) => Err(ScannerError::InvalidConfig(format!(
            "improper file suffix .{other} for JPEG format"
        ))),
    }
}
