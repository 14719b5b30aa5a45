use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata kept for one stored face. The name is fixed at creation; only
/// `last_seen` moves, and only through the owning store's `touch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    name: String,
    last_seen: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn new(name: impl Into<String>, last_seen: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_seen,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }
}
