//! Resolution selector grammar.
//!
//! ```text
//! selector := TIER_NAME
//!           | "CUSTOM_" WIDTH "x" HEIGHT [ "_ASPECT" ]
//! ```
//!
//! `TIER_NAME` is any non-sentinel catalog name or `ORIGINAL`. WIDTH and
//! HEIGHT are plain ASCII digits with a positive value. Custom targets
//! force-scale unless `_ASPECT` is given; named tiers always preserve aspect
//! ratio.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use vc_core::media::{self, ResolutionTier};
use vc_core::Error;

static CUSTOM_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^CUSTOM_(?P<w>[0-9]+)x(?P<h>[0-9]+)(?P<aspect>_ASPECT)?$")
        .expect("custom selector pattern is valid")
});

/// A parsed resolution selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSelector {
    /// Keep the source dimensions.
    Original,
    /// A fixed catalog tier.
    Named(&'static ResolutionTier),
    /// User-supplied dimensions.
    Custom {
        width: u32,
        height: u32,
        maintain_aspect: bool,
    },
}

impl ResolutionSelector {
    /// Parse every selector, failing on the first invalid one.
    pub fn parse_all<'a>(
        selectors: impl IntoIterator<Item = &'a str>,
    ) -> vc_core::Result<Vec<ResolutionSelector>> {
        selectors.into_iter().map(str::parse).collect()
    }

    /// Whether the encode should letterbox into the target box.
    pub fn maintain_aspect_ratio(&self) -> bool {
        match self {
            Self::Original | Self::Named(_) => true,
            Self::Custom {
                maintain_aspect, ..
            } => *maintain_aspect,
        }
    }
}

impl FromStr for ResolutionSelector {
    type Err = Error;

    fn from_str(s: &str) -> vc_core::Result<Self> {
        if s.starts_with("CUSTOM_") {
            return parse_custom(s);
        }

        match ResolutionTier::by_name(s) {
            Some(tier) if tier.name == media::ORIGINAL.name => Ok(Self::Original),
            Some(tier) if tier.name == media::CUSTOM.name => Err(Error::invalid_selector(
                s,
                "CUSTOM requires dimensions, e.g. CUSTOM_640x360",
            )),
            Some(tier) => Ok(Self::Named(tier)),
            None => Err(Error::invalid_selector(s, "unknown resolution tier")),
        }
    }
}

fn parse_custom(s: &str) -> vc_core::Result<ResolutionSelector> {
    let caps = CUSTOM_SELECTOR
        .captures(s)
        .ok_or_else(|| Error::invalid_selector(s, "expected CUSTOM_<W>x<H>[_ASPECT]"))?;

    let dimension = |name: &str| -> vc_core::Result<u32> {
        let token = &caps[name];
        let value: u32 = token
            .parse()
            .map_err(|_| Error::invalid_selector(s, format!("dimension '{token}' out of range")))?;
        if value == 0 {
            return Err(Error::invalid_selector(s, "dimensions must be positive"));
        }
        Ok(value)
    };

    Ok(ResolutionSelector::Custom {
        width: dimension("w")?,
        height: dimension("h")?,
        maintain_aspect: caps.name("aspect").is_some(),
    })
}

impl fmt::Display for ResolutionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "{}", media::ORIGINAL.name),
            Self::Named(tier) => write!(f, "{}", tier.name),
            Self::Custom {
                width,
                height,
                maintain_aspect: false,
            } => write!(f, "CUSTOM_{width}x{height}"),
            Self::Custom {
                width,
                height,
                maintain_aspect: true,
            } => write!(f, "CUSTOM_{width}x{height}_ASPECT"),
        }
    }
}
