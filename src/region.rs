//! Scan region parsing.
//!
//! A region is given either as a named paper size (`a4`, `letter`, ...) or as
//! an `x:y:width:height` rectangle whose components carry a unit suffix
//! (`1cm:1.5cm:10cm:20cm`). Both forms resolve to device coordinates in
//! 1/300ths of an inch, the fixed unit eSCL uses for scan regions regardless
//! of the chosen resolution.

use crate::error::{ScanResult, ScannerError};

/// eSCL expresses region coordinates in `ThreeHundredthsOfInches`.
pub const DEVICE_UNITS_PER_INCH: f64 = 300.0;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Known paper sizes as (name, width, height) in inches. ISO sizes are
/// defined in millimetres; US sizes are exact in inches.
static PAPER_SIZES: &[(&str, f64, f64)] = &[
    ("a3", 297.0 / MM_PER_INCH, 420.0 / MM_PER_INCH),
    ("a4", 210.0 / MM_PER_INCH, 297.0 / MM_PER_INCH),
    ("a5", 148.0 / MM_PER_INCH, 210.0 / MM_PER_INCH),
    ("a6", 105.0 / MM_PER_INCH, 148.0 / MM_PER_INCH),
    ("b4", 250.0 / MM_PER_INCH, 353.0 / MM_PER_INCH),
    ("b5", 176.0 / MM_PER_INCH, 250.0 / MM_PER_INCH),
    ("letter", 8.5, 11.0),
    ("legal", 8.5, 14.0),
    ("tabloid", 11.0, 17.0),
    ("executive", 7.25, 10.5),
];

/// A scan region in device units (1/300 inch). All coordinates are
/// non-negative; offsets are measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScanRegion {
    /// XML fragment embedded in the job settings document.
    pub fn to_xml(&self) -> String {
        format!(
            "\n  <pwg:ScanRegions>\n    <pwg:ScanRegion>\n      \
             <pwg:ContentRegionUnits>escl:ThreeHundredthsOfInches</pwg:ContentRegionUnits>\n      \
             <pwg:XOffset>{}</pwg:XOffset>\n      \
             <pwg:YOffset>{}</pwg:YOffset>\n      \
             <pwg:Width>{}</pwg:Width>\n      \
             <pwg:Height>{}</pwg:Height>\n    \
             </pwg:ScanRegion>\n  </pwg:ScanRegions>",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Parse a region specification into device coordinates.
///
/// Named sizes resolve to a zero-offset rectangle covering the full page.
/// Rectangles must have exactly four colon-separated, unit-suffixed parts.
pub fn parse_region(spec: &str) -> ScanResult<ScanRegion> {
    let normalized = spec.trim().to_ascii_lowercase();

    if let Some(&(_, width_in, height_in)) =
        PAPER_SIZES.iter().find(|(name, _, _)| *name == normalized)
    {
        return Ok(ScanRegion {
            x: 0,
            y: 0,
            width: to_device_units(width_in),
            height: to_device_units(height_in),
        });
    }

    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() != 4 {
        return Err(region_error(
            spec,
            "expected a known paper size or x:y:width:height",
        ));
    }

    let mut inches = [0f64; 4];
    for (slot, part) in inches.iter_mut().zip(&parts) {
        *slot = parse_length(part).map_err(|reason| region_error(spec, &reason))?;
    }

    Ok(ScanRegion {
        x: to_device_units(inches[0]),
        y: to_device_units(inches[1]),
        width: to_device_units(inches[2]),
        height: to_device_units(inches[3]),
    })
}

/// Convert inches to device units, truncating toward zero.
fn to_device_units(inches: f64) -> u32 {
    (inches * DEVICE_UNITS_PER_INCH) as u32
}

/// Parse one unit-suffixed length token into inches.
fn parse_length(token: &str) -> Result<f64, String> {
    let token = token.trim();
    let split = token
        .find(|c: char| c.is_ascii_alphabetic())
        .ok_or_else(|| format!("length {token:?} is missing a unit suffix"))?;
    let (number, unit) = token.split_at(split);

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("could not parse length {token:?}"))?;
    if value < 0.0 {
        return Err(format!("length {token:?} is negative"));
    }

    let per_inch = match unit {
        "in" => 1.0,
        "ft" => 1.0 / 12.0,
        "pt" => POINTS_PER_INCH,
        "mm" => MM_PER_INCH,
        "cm" => MM_PER_INCH / 10.0,
        "dm" => MM_PER_INCH / 100.0,
        "m" => MM_PER_INCH / 1000.0,
        _ => return Err(format!("unknown unit {unit:?} in length {token:?}")),
    };

    Ok(value / per_inch)
}

fn region_error(spec: &str, reason: &str) -> ScannerError {
    ScannerError::RegionParse {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_dimensions() {
        let region = parse_region("letter").unwrap();
        assert_eq!(
            region,
            ScanRegion {
                x: 0,
                y: 0,
                width: 2550,
                height: 3300
            }
        );
    }

    #[test]
    fn test_named_sizes_have_zero_offset() {
        for (name, _, _) in PAPER_SIZES {
            let region = parse_region(name).unwrap();
            assert_eq!(region.x, 0, "{name}");
            assert_eq!(region.y, 0, "{name}");
            assert!(region.width > 0 && region.height > 0, "{name}");
        }
    }

    #[test]
    fn test_paper_size_is_case_insensitive() {
        assert_eq!(parse_region("Letter").unwrap(), parse_region("letter").unwrap());
        assert_eq!(parse_region(" A4 ").unwrap(), parse_region("a4").unwrap());
    }

    #[test]
    fn test_centimetre_rectangle() {
        let region = parse_region("1cm:1cm:2cm:2cm").unwrap();
        // 1 cm = 0.3937... in -> 118.11 device units, truncated toward zero.
        assert_eq!(region.x, 118);
        assert_eq!(region.y, 118);
        assert_eq!(region.width, 236);
        assert_eq!(region.height, 236);
        // Same input, same output.
        assert_eq!(region, parse_region("1cm:1cm:2cm:2cm").unwrap());
    }

    #[test]
    fn test_mixed_units() {
        let region = parse_region("0in:0in:10mm:1in").unwrap();
        assert_eq!(region.x, 0);
        assert_eq!(region.width, 118);
        assert_eq!(region.height, 300);
    }

    #[test]
    fn test_rejects_wrong_part_count() {
        assert!(matches!(
            parse_region("1cm:1cm:2cm"),
            Err(ScannerError::RegionParse { .. })
        ));
        assert!(matches!(
            parse_region("1cm:1cm:2cm:2cm:3cm"),
            Err(ScannerError::RegionParse { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_name() {
        assert!(matches!(
            parse_region("quarto"),
            Err(ScannerError::RegionParse { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_length_tokens() {
        for spec in [
            "x:1cm:2cm:2cm",
            "1:1cm:2cm:2cm",
            "1zz:1cm:2cm:2cm",
            "-1cm:1cm:2cm:2cm",
        ] {
            assert!(
                matches!(parse_region(spec), Err(ScannerError::RegionParse { .. })),
                "{spec} should fail"
            );
        }
    }

    #[test]
    fn test_region_xml() {
        let region = ScanRegion {
            x: 0,
            y: 0,
            width: 2550,
            height: 3300,
        };
        let xml = region.to_xml();
        assert!(xml.contains("escl:ThreeHundredthsOfInches"));
        assert!(xml.contains("<pwg:Width>2550</pwg:Width>"));
        assert!(xml.contains("<pwg:Height>3300</pwg:Height>"));
    }
}
