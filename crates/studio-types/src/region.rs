use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic zone a single mesh is classified into.
///
/// Every mesh lands in exactly one region. `Unknown` meshes are only touched
/// by layers that target [`TargetPart::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Cap, lid, closure.
    Top,
    /// Body or container.
    Middle,
    /// Bottom, foot, or the catch-all for jar bodies.
    Base,
    /// The printable label area of pouch-style models.
    Artwork,
    /// No rule matched.
    Unknown,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Top => "top",
            Region::Middle => "middle",
            Region::Base => "base",
            Region::Artwork => "artwork",
            Region::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The region a layer is bound to, as stored on the wire (`targetPart`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPart {
    /// Wildcard: every mesh, including unclassified ones.
    #[default]
    All,
    Top,
    Middle,
    Base,
    Artwork,
}

impl TargetPart {
    /// Every wire tag, wildcard first.
    pub const ALL_TAGS: [TargetPart; 5] = [
        TargetPart::All,
        TargetPart::Top,
        TargetPart::Middle,
        TargetPart::Base,
        TargetPart::Artwork,
    ];

    /// True if a mesh classified as `region` is affected by this target.
    pub fn matches(&self, region: Region) -> bool {
        match self {
            TargetPart::All => true,
            TargetPart::Top => region == Region::Top,
            TargetPart::Middle => region == Region::Middle,
            TargetPart::Base => region == Region::Base,
            TargetPart::Artwork => region == Region::Artwork,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetPart::All => "all",
            TargetPart::Top => "top",
            TargetPart::Middle => "middle",
            TargetPart::Base => "base",
            TargetPart::Artwork => "artwork",
        }
    }

    /// Human-readable label used in generated layer names.
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetPart::All => "All Parts",
            TargetPart::Top => "Top/Cap",
            TargetPart::Middle => "Middle/Body",
            TargetPart::Base => "Base/Bottom",
            TargetPart::Artwork => "Artwork Area",
        }
    }
}

impl From<Region> for Option<TargetPart> {
    fn from(region: Region) -> Self {
        match region {
            Region::Top => Some(TargetPart::Top),
            Region::Middle => Some(TargetPart::Middle),
            Region::Base => Some(TargetPart::Base),
            Region::Artwork => Some(TargetPart::Artwork),
            Region::Unknown => None,
        }
    }
}

impl fmt::Display for TargetPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a region tag outside the closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown target part: {0:?}")]
pub struct UnknownTargetPart(pub String);

impl FromStr for TargetPart {
    type Err = UnknownTargetPart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetPart::ALL_TAGS
            .into_iter()
            .find(|part| part.as_str() == s)
            .ok_or_else(|| UnknownTargetPart(s.to_string()))
    }
}
