use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which registry a store backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Recently seen faces, evicted once unseen for the expiration window.
    Ephemeral,
    /// User-curated names. Never evicted.
    Permanent,
}

impl Tier {
    /// Snapshot file stem under the cache directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Tier::Ephemeral => "ephemeral",
            Tier::Permanent => "permanent",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ephemeral" | "recent" => Ok(Tier::Ephemeral),
            "permanent" | "known" => Ok(Tier::Permanent),
            _ => Err(format!("Unknown tier: {s}")),
        }
    }
}

/// Eviction strategy of a store. Permanent stores keep the window only so
/// both tiers carry the same metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    tier: Tier,
    window: Duration,
}

impl EvictionPolicy {
    pub fn new(tier: Tier, window: Duration) -> Self {
        Self { tier, window }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn evicts(&self) -> bool {
        self.tier == Tier::Ephemeral
    }

    /// True iff `now - last_seen` is strictly greater than the window.
    pub fn is_expired(&self, last_seen: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.evicts() && now - last_seen > self.window
    }
}
