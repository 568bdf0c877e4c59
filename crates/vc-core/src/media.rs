//! Static catalogs: resolution tiers, quality presets and output formats.
//!
//! Tiers and presets are plain value records in fixed, ordered tables. They
//! are process-wide constants; lookups return `&'static` references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// ResolutionTier
// ---------------------------------------------------------------------------

/// A named resolution target.
///
/// The sentinels [`ORIGINAL`] and [`CUSTOM`] carry `0x0` and are resolved at
/// planning time (source dimensions and user dimensions respectively).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolutionTier {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
}

pub const ORIGINAL: ResolutionTier = ResolutionTier::new("ORIGINAL", 0, 0, "original");
pub const CUSTOM: ResolutionTier = ResolutionTier::new("CUSTOM", 0, 0, "custom");
pub const UHD_4K: ResolutionTier = ResolutionTier::new("UHD_4K", 3840, 2160, "4k");
pub const QHD: ResolutionTier = ResolutionTier::new("QHD", 2560, 1440, "1440p");
pub const FHD: ResolutionTier = ResolutionTier::new("FHD", 1920, 1080, "1080p");
pub const HD: ResolutionTier = ResolutionTier::new("HD", 1280, 720, "720p");
pub const SD: ResolutionTier = ResolutionTier::new("SD", 854, 480, "480p");
pub const LOW: ResolutionTier = ResolutionTier::new("LOW", 640, 360, "360p");

/// Every tier in declaration order.
pub const RESOLUTION_TIERS: &[ResolutionTier] = &[ORIGINAL, CUSTOM, UHD_4K, QHD, FHD, HD, SD, LOW];

impl ResolutionTier {
    const fn new(name: &'static str, width: u32, height: u32, label: &'static str) -> Self {
        Self {
            name,
            width,
            height,
            label,
        }
    }

    /// Look up a tier by its catalog name (`"FHD"`, `"ORIGINAL"`, ...).
    pub fn by_name(name: &str) -> Option<&'static ResolutionTier> {
        RESOLUTION_TIERS.iter().find(|t| t.name == name)
    }

    /// Whether this tier is resolved dynamically rather than carrying fixed
    /// dimensions.
    pub fn is_sentinel(&self) -> bool {
        self.name == ORIGINAL.name || self.name == CUSTOM.name
    }

    /// Whether the tier fits inside a `width x height` box (no upscaling).
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width <= width && self.height <= height
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Format dimensions the way results report them (`"1920x1080"`).
pub fn resolution_label(width: u32, height: u32) -> String {
    format!("{width}x{height}")
}

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

/// A named quality profile.
///
/// `quality_factor` is a constant-rate-factor style value: lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Preset {
    pub name: PresetName,
    pub target_bitrate_bps: u32,
    pub encoder_effort: &'static str,
    pub quality_factor: u8,
}

/// Fixed preset table, lowest quality first.
pub const PRESETS: &[Preset] = &[
    Preset {
        name: PresetName::Low,
        target_bitrate_bps: 500_000,
        encoder_effort: "slow",
        quality_factor: 28,
    },
    Preset {
        name: PresetName::Medium,
        target_bitrate_bps: 2_000_000,
        encoder_effort: "medium",
        quality_factor: 23,
    },
    Preset {
        name: PresetName::High,
        target_bitrate_bps: 5_000_000,
        encoder_effort: "veryslow",
        quality_factor: 18,
    },
];

/// Selector for an entry of [`PRESETS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresetName {
    Low,
    #[default]
    Medium,
    High,
}

impl PresetName {
    /// The preset record this name refers to.
    pub fn preset(self) -> &'static Preset {
        match self {
            Self::Low => &PRESETS[0],
            Self::Medium => &PRESETS[1],
            Self::High => &PRESETS[2],
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

impl FromStr for PresetName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            other => Err(Error::Validation(format!(
                "unknown preset '{other}' (expected LOW, MEDIUM or HIGH)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputFormat
// ---------------------------------------------------------------------------

/// Output container, or segmented (HLS) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Webm,
    Mkv,
    #[serde(alias = "m3u8")]
    Segmented,
}

impl OutputFormat {
    /// File extension of the planned output. Segmented output is named after
    /// its manifest type.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Mkv => "mkv",
            Self::Segmented => "m3u8",
        }
    }

    /// Name of the ffmpeg muxer for this format.
    pub fn muxer(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Mkv => "matroska",
            Self::Segmented => "hls",
        }
    }

    pub fn is_segmented(self) -> bool {
        self == Self::Segmented
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp4 => write!(f, "mp4"),
            Self::Webm => write!(f, "webm"),
            Self::Mkv => write!(f, "mkv"),
            Self::Segmented => write!(f, "segmented"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            "mkv" => Ok(Self::Mkv),
            "segmented" | "m3u8" | "hls" => Ok(Self::Segmented),
            other => Err(Error::Validation(format!(
                "unknown output format '{other}' (expected mp4, webm, mkv or segmented)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_lookup_by_name() {
        assert_eq!(ResolutionTier::by_name("FHD"), Some(&FHD));
        assert_eq!(ResolutionTier::by_name("HD").map(|t| t.label), Some("720p"));
        assert!(ResolutionTier::by_name("fhd").is_none());
        assert!(ResolutionTier::by_name("8K").is_none());
    }

    #[test]
    fn sentinels_carry_zero_dimensions() {
        for tier in RESOLUTION_TIERS.iter().filter(|t| t.is_sentinel()) {
            assert_eq!((tier.width, tier.height), (0, 0));
        }
        assert!(!HD.is_sentinel());
    }

    #[test]
    fn catalog_order_is_descending_after_sentinels() {
        let names: Vec<&str> = RESOLUTION_TIERS.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            ["ORIGINAL", "CUSTOM", "UHD_4K", "QHD", "FHD", "HD", "SD", "LOW"]
        );
    }

    #[test]
    fn fits_within_is_inclusive() {
        assert!(FHD.fits_within(1920, 1080));
        assert!(!FHD.fits_within(1920, 1079));
        assert!(!SD.fits_within(640, 480));
    }

    #[test]
    fn preset_table_values() {
        let medium = PresetName::Medium.preset();
        assert_eq!(medium.target_bitrate_bps, 2_000_000);
        assert_eq!(medium.encoder_effort, "medium");
        assert_eq!(medium.quality_factor, 23);
        assert_eq!(PresetName::Low.preset().quality_factor, 28);
        assert_eq!(PresetName::High.preset().encoder_effort, "veryslow");
        for p in PRESETS {
            assert_eq!(p.name.preset(), p);
        }
    }

    #[test]
    fn preset_name_parsing() {
        assert_eq!("medium".parse::<PresetName>().unwrap(), PresetName::Medium);
        assert_eq!("HIGH".parse::<PresetName>().unwrap(), PresetName::High);
        assert!("ULTRA".parse::<PresetName>().is_err());
        assert_eq!(PresetName::default(), PresetName::Medium);
    }

    #[test]
    fn preset_name_serde_uppercase() {
        let json = serde_json::to_string(&PresetName::Low).unwrap();
        assert_eq!(json, "\"LOW\"");
        let back: PresetName = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(back, PresetName::High);
    }

    #[test]
    fn output_format_parsing_and_extension() {
        assert_eq!("m3u8".parse::<OutputFormat>().unwrap(), OutputFormat::Segmented);
        assert_eq!(OutputFormat::Segmented.extension(), "m3u8");
        assert_eq!(OutputFormat::Mkv.muxer(), "matroska");
        assert!("avi".parse::<OutputFormat>().is_err());

        let fmt: OutputFormat = serde_json::from_str("\"m3u8\"").unwrap();
        assert!(fmt.is_segmented());
    }

    #[test]
    fn label_formatting() {
        assert_eq!(resolution_label(1280, 720), "1280x720");
    }
}
