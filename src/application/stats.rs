use crate::domain::entities::face_store::FaceStore;
use crate::domain::values::classification::UNKNOWN_NAME;
use crate::domain::values::tier::Tier;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize)]
pub struct TierStats {
    pub tier: Tier,
    pub faces: usize,
    pub distinct_names: usize,
    pub unnamed: usize,
    pub expired: usize,
    pub expiration_secs: i64,
    pub oldest_last_seen: Option<DateTime<Utc>>,
    pub newest_last_seen: Option<DateTime<Utc>>,
    /// Save time of the snapshot the tier was loaded from, if any.
    pub snapshot_saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub permanent: TierStats,
    pub ephemeral: TierStats,
}

pub struct StatsUseCase;

impl StatsUseCase {
    pub fn tier_stats(store: &FaceStore) -> TierStats {
        let mut names = HashSet::new();
        let mut unnamed = 0;
        let mut expired = 0;
        let mut oldest: Option<DateTime<Utc>> = None;
        let mut newest: Option<DateTime<Utc>> = None;

        for (key, record) in store.entries() {
            names.insert(record.name());
            if record.name() == UNKNOWN_NAME {
                unnamed += 1;
            }
            if store.is_expired(key) {
                expired += 1;
            }
            let seen = record.last_seen();
            oldest = Some(oldest.map_or(seen, |o| o.min(seen)));
            newest = Some(newest.map_or(seen, |n| n.max(seen)));
        }

        TierStats {
            tier: store.tier(),
            faces: store.len(),
            distinct_names: names.len(),
            unnamed,
            expired,
            expiration_secs: store.expiration_window().num_seconds(),
            oldest_last_seen: oldest,
            newest_last_seen: newest,
            snapshot_saved_at: store.restored_from(),
        }
    }

    pub fn stats(permanent: &FaceStore, ephemeral: &FaceStore) -> RegistryStats {
        RegistryStats {
            permanent: Self::tier_stats(permanent),
            ephemeral: Self::tier_stats(ephemeral),
        }
    }
}
