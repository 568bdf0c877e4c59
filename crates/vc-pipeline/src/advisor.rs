//! Resolution discovery: which tiers make sense for a given source.

use vc_core::media::{self, ResolutionTier, RESOLUTION_TIERS};
use vc_core::SourceProbe;

/// Tiers offered for `probe`: ORIGINAL first, then every fixed tier that
/// fits inside the source, in catalog order. Never offers an upscale.
pub fn available_resolutions(probe: &SourceProbe) -> Vec<&'static ResolutionTier> {
    std::iter::once(&media::ORIGINAL)
        .chain(
            RESOLUTION_TIERS
                .iter()
                .filter(|tier| !tier.is_sentinel())
                .filter(|tier| tier.fits_within(probe.width, probe.height)),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(width: u32, height: u32) -> SourceProbe {
        SourceProbe {
            width,
            height,
            duration_seconds: 10,
            size_bytes: 1_000,
        }
    }

    fn names(tiers: &[&ResolutionTier]) -> Vec<&'static str> {
        tiers.iter().map(|t| t.name).collect()
    }

    #[test]
    fn full_hd_source() {
        let tiers = available_resolutions(&probe(1920, 1080));
        assert_eq!(names(&tiers), ["ORIGINAL", "FHD", "HD", "SD", "LOW"]);
    }

    #[test]
    fn uhd_source_offers_everything() {
        let tiers = available_resolutions(&probe(3840, 2160));
        assert_eq!(
            names(&tiers),
            ["ORIGINAL", "UHD_4K", "QHD", "FHD", "HD", "SD", "LOW"]
        );
    }

    #[test]
    fn small_source_only_original() {
        let tiers = available_resolutions(&probe(320, 240));
        assert_eq!(names(&tiers), ["ORIGINAL"]);
    }

    #[test]
    fn zero_probe_only_original() {
        let tiers = available_resolutions(&probe(0, 0));
        assert_eq!(names(&tiers), ["ORIGINAL"]);
    }

    #[test]
    fn portrait_source_checks_both_axes() {
        // 1080x1920 is wide enough for nothing above 1080 in width.
        let tiers = available_resolutions(&probe(1080, 1920));
        assert_eq!(names(&tiers), ["ORIGINAL", "SD", "LOW"]);
    }

    #[test]
    fn never_upscales() {
        for (w, h) in [(640, 360), (853, 480), (1280, 719), (2560, 1440), (7680, 4320)] {
            let source = probe(w, h);
            for tier in available_resolutions(&source).iter().skip(1) {
                assert!(tier.width <= w && tier.height <= h, "{tier} offered for {w}x{h}");
            }
        }
    }
}
