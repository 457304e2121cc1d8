//! Scan request configuration.
//!
//! [`ScanRequestConfig`] captures the user's intent for a single scan. It is
//! assembled once from the CLI/environment before any network activity and
//! never mutated afterwards.

use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

/// Color mode sent with every job. `Grayscale8` would select grayscale.
pub const COLOR_MODE: &str = "RGB24";

/// Document input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputSource {
    /// Let the scanner choose between feeder and flatbed.
    Automatic,
    /// Automatic document feeder (ADF).
    Feeder,
    /// Flatbed glass ("Platen" on the wire).
    Flatbed,
}

impl InputSource {
    /// XML fragment for the job settings document. `Automatic` omits the
    /// element entirely so the device picks the source itself.
    pub fn xml_fragment(self) -> &'static str {
        match self {
            Self::Automatic => "",
            Self::Feeder => "<pwg:InputSource>Feeder</pwg:InputSource>",
            Self::Flatbed => "<pwg:InputSource>Platen</pwg:InputSource>",
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::Feeder => write!(f, "feeder"),
            Self::Flatbed => write!(f, "flatbed"),
        }
    }
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Multi-page PDF, written as one combined file.
    Pdf,
    /// JPEG, written as one file per page.
    Jpeg,
}

impl OutputFormat {
    /// MIME type advertised in the job settings document.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Whether all pages land in a single output file.
    pub fn is_single_file(self) -> bool {
        matches!(self, Self::Pdf)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Scan resolution, restricted to the DPI steps eSCL devices commonly offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resolution {
    #[value(name = "75")]
    Dpi75,
    #[value(name = "100")]
    Dpi100,
    #[value(name = "200")]
    Dpi200,
    #[value(name = "300")]
    Dpi300,
    #[value(name = "600")]
    Dpi600,
}

impl Resolution {
    /// Numeric DPI value for the wire.
    pub fn dpi(self) -> u32 {
        match self {
            Self::Dpi75 => 75,
            Self::Dpi100 => 100,
            Self::Dpi200 => 200,
            Self::Dpi300 => 300,
            Self::Dpi600 => 600,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dpi", self.dpi())
    }
}

/// Immutable description of one requested scan.
#[derive(Debug, Clone)]
pub struct ScanRequestConfig {
    pub source: InputSource,
    pub format: OutputFormat,
    pub resolution: Resolution,
    pub duplex: bool,
    /// Region specification string: a paper-size name or `x:y:w:h` rectangle.
    pub region: Option<String>,
    /// Target filename before directory prefixing and auto-increment.
    pub filename: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(OutputFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert!(OutputFormat::Pdf.is_single_file());
        assert!(!OutputFormat::Jpeg.is_single_file());
    }

    #[test]
    fn test_input_source_fragments() {
        assert_eq!(InputSource::Automatic.xml_fragment(), "");
        assert!(InputSource::Feeder.xml_fragment().contains("Feeder"));
        assert!(InputSource::Flatbed.xml_fragment().contains("Platen"));
    }

    #[test]
    fn test_resolution_dpi() {
        assert_eq!(Resolution::Dpi75.dpi(), 75);
        assert_eq!(Resolution::Dpi600.dpi(), 600);
    }
}
