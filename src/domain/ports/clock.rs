use chrono::{DateTime, Utc};

/// Source of "now" for recency bookkeeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
