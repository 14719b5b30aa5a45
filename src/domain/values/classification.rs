use serde::Serialize;
use std::fmt;

/// Placeholder name for faces nobody has named yet.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Outcome of resolving one detected face against both tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Matched the ephemeral tier.
    RecentlySeen,
    /// Matched only the permanent tier.
    KnownStale,
    /// Matched neither tier.
    Unknown,
}

impl Classification {
    /// Numeric code reported to collaborators: 0, 1 or -1.
    pub fn code(&self) -> i8 {
        match self {
            Classification::RecentlySeen => 0,
            Classification::KnownStale => 1,
            Classification::Unknown => -1,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::RecentlySeen => write!(f, "recently_seen"),
            Classification::KnownStale => write!(f, "known_stale"),
            Classification::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Classification::RecentlySeen.code(), 0);
        assert_eq!(Classification::KnownStale.code(), 1);
        assert_eq!(Classification::Unknown.code(), -1);
    }
}
