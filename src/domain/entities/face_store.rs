//! In-memory face registry shared by both tiers.
//!
//! A store keeps two views of the same set of faces: a metadata mapping
//! from [`SerializedKey`] to [`IdentityRecord`], and the raw vectors in
//! insertion order for matching. Every mutation updates both, so their key
//! sets are always equal. Whether entries expire is decided by the store's
//! [`EvictionPolicy`]; the ephemeral and permanent registries are the same
//! type with different policies.

use crate::domain::entities::identity_record::IdentityRecord;
use crate::domain::entities::store_snapshot::StoreSnapshot;
use crate::domain::error::DomainError;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::face_matcher::FaceMatcher;
use crate::domain::ports::snapshot_store::SnapshotStore;
use crate::domain::values::face_vector::FaceVector;
use crate::domain::values::serialized_key::SerializedKey;
use crate::domain::values::tier::{EvictionPolicy, Tier};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A stored face the match predicate accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatch {
    pub key: SerializedKey,
    pub record: IdentityRecord,
    pub distance: Option<f64>,
}

pub struct FaceStore {
    policy: EvictionPolicy,
    records: HashMap<SerializedKey, IdentityRecord>,
    vectors: Vec<(SerializedKey, FaceVector)>,
    matcher: Arc<dyn FaceMatcher>,
    clock: Arc<dyn Clock>,
    restored_from: Option<DateTime<Utc>>,
}

impl FaceStore {
    pub fn new(policy: EvictionPolicy, matcher: Arc<dyn FaceMatcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            records: HashMap::new(),
            vectors: Vec::new(),
            matcher,
            clock,
            restored_from: None,
        }
    }

    pub fn ephemeral(window: Duration, matcher: Arc<dyn FaceMatcher>, clock: Arc<dyn Clock>) -> Self {
        Self::new(EvictionPolicy::new(Tier::Ephemeral, window), matcher, clock)
    }

    pub fn permanent(window: Duration, matcher: Arc<dyn FaceMatcher>, clock: Arc<dyn Clock>) -> Self {
        Self::new(EvictionPolicy::new(Tier::Permanent, window), matcher, clock)
    }

    pub fn tier(&self) -> Tier {
        self.policy.tier()
    }

    pub fn expiration_window(&self) -> Duration {
        self.policy.window()
    }

    /// When the snapshot this store was last restored from had been saved.
    pub fn restored_from(&self) -> Option<DateTime<Utc>> {
        self.restored_from
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn contains(&self, key: &SerializedKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &SerializedKey) -> Option<&IdentityRecord> {
        self.records.get(key)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&SerializedKey, &IdentityRecord)> {
        self.vectors
            .iter()
            .filter_map(|(key, _)| self.records.get(key).map(|record| (key, record)))
    }

    /// Stores `vector` under `name` with `last_seen = now`. Re-adding an
    /// identical vector replaces its record but keeps its original position
    /// in the match order.
    pub fn add(&mut self, name: impl Into<String>, vector: FaceVector) -> SerializedKey {
        let key = SerializedKey::encode(&vector);
        let record = IdentityRecord::new(name, self.clock.now());
        debug!(tier = %self.tier(), key = key.short(), name = record.name(), "adding face");
        if self.records.insert(key.clone(), record).is_none() {
            self.vectors.push((key.clone(), vector));
        }
        self.debug_check_invariant();
        key
    }

    /// Removes the entry stored under exactly `key`.
    pub fn remove(&mut self, key: &SerializedKey) -> Result<IdentityRecord, DomainError> {
        let record = self
            .records
            .remove(key)
            .ok_or_else(|| DomainError::NotFound(format!("{} face {}", self.tier(), key.short())))?;
        self.vectors.retain(|(k, _)| k != key);
        debug!(tier = %self.tier(), key = key.short(), name = record.name(), "removed face");
        self.debug_check_invariant();
        Ok(record)
    }

    /// Removes the first entry (in insertion order) carrying `name`.
    pub fn remove_by_name(&mut self, name: &str) -> Result<SerializedKey, DomainError> {
        let key = self
            .entries()
            .find(|(_, record)| record.name() == name)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| DomainError::NotFound(format!("{} face named '{name}'", self.tier())))?;
        self.remove(&key)?;
        Ok(key)
    }

    /// First stored vector, in insertion order, that the match predicate
    /// accepts. Not necessarily the closest one.
    pub fn nearest_match(&self, query: &FaceVector) -> Option<FaceMatch> {
        self.vectors
            .iter()
            .find(|(_, known)| self.matcher.is_match(known, query))
            .and_then(|(key, known)| {
                self.records.get(key).map(|record| FaceMatch {
                    key: key.clone(),
                    record: record.clone(),
                    distance: self.matcher.distance(known, query),
                })
            })
    }

    /// Sets `last_seen` of the entry under `key` to now.
    pub fn touch(&mut self, key: &SerializedKey) -> Result<(), DomainError> {
        let now = self.clock.now();
        let tier = self.tier();
        let record = self
            .records
            .get_mut(key)
            .ok_or_else(|| DomainError::NotFound(format!("{tier} face {}", key.short())))?;
        record.touch(now);
        Ok(())
    }

    /// Whether the entry under `key` has gone unseen for longer than the
    /// window. Always false for permanent stores and for absent keys.
    pub fn is_expired(&self, key: &SerializedKey) -> bool {
        let now = self.clock.now();
        self.records
            .get(key)
            .map(|record| self.policy.is_expired(record.last_seen(), now))
            .unwrap_or(false)
    }

    /// Evicts every expired entry and returns what was removed.
    pub fn sweep(&mut self) -> Vec<(SerializedKey, IdentityRecord)> {
        self.sweep_except(None)
    }

    /// Like [`FaceStore::sweep`], but never evicts `pinned`.
    pub fn sweep_except(&mut self, pinned: Option<&SerializedKey>) -> Vec<(SerializedKey, IdentityRecord)> {
        if !self.policy.evicts() {
            return Vec::new();
        }
        let now = self.clock.now();
        let expired: Vec<SerializedKey> = self
            .records
            .iter()
            .filter(|(key, record)| {
                Some(*key) != pinned && self.policy.is_expired(record.last_seen(), now)
            })
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = Vec::with_capacity(expired.len());
        for key in expired {
            if let Ok(record) = self.remove(&key) {
                removed.push((key, record));
            }
        }
        if !removed.is_empty() {
            debug!(tier = %self.tier(), evicted = removed.len(), "swept expired faces");
        }
        removed
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tier: self.tier(),
            expiration_secs: self.expiration_window().num_seconds(),
            saved_at: self.clock.now(),
            records: self.records.clone(),
            vectors: self.vectors.iter().map(|(key, _)| key.clone()).collect(),
        }
    }

    /// Replaces the store's contents with `snapshot` after validating it.
    /// On error the current contents are left untouched.
    pub fn load_snapshot(&mut self, snapshot: StoreSnapshot) -> Result<usize, DomainError> {
        if snapshot.tier != self.tier() {
            return Err(DomainError::CorruptCache(format!(
                "snapshot holds the {} tier, expected {}",
                snapshot.tier,
                self.tier()
            )));
        }

        let mut seen = HashSet::with_capacity(snapshot.vectors.len());
        let mut vectors = Vec::with_capacity(snapshot.vectors.len());
        for key in snapshot.vectors {
            if !seen.insert(key.clone()) {
                return Err(DomainError::CorruptCache(format!(
                    "vector {} listed twice",
                    key.short()
                )));
            }
            if !snapshot.records.contains_key(&key) {
                return Err(DomainError::CorruptCache(format!(
                    "vector {} has no metadata record",
                    key.short()
                )));
            }
            let vector = key
                .decode()
                .map_err(|e| DomainError::CorruptCache(e.to_string()))?;
            vectors.push((key, vector));
        }
        if snapshot.records.len() != vectors.len() {
            return Err(DomainError::CorruptCache(format!(
                "{} metadata records but {} vectors",
                snapshot.records.len(),
                vectors.len()
            )));
        }

        if snapshot.expiration_secs != self.expiration_window().num_seconds() {
            debug!(
                tier = %self.tier(),
                saved = snapshot.expiration_secs,
                configured = self.expiration_window().num_seconds(),
                "snapshot expiration window differs, keeping configured value"
            );
        }
        if !self.is_empty() {
            warn!(tier = %self.tier(), discarded = self.len(), "restoring snapshot over non-empty store");
        }

        self.records = snapshot.records;
        self.vectors = vectors;
        self.restored_from = Some(snapshot.saved_at);
        self.debug_check_invariant();
        Ok(self.len())
    }

    pub fn persist(&self, sink: &dyn SnapshotStore, destination: &Path) -> Result<(), DomainError> {
        sink.write(destination, &self.snapshot())?;
        info!(tier = %self.tier(), faces = self.len(), path = %destination.display(), "saved faces");
        Ok(())
    }

    /// Loads the snapshot at `source`. `CacheMissing` leaves the store as it
    /// was; `CorruptCache` is returned without applying anything.
    pub fn restore(&mut self, source: &dyn SnapshotStore, path: &Path) -> Result<usize, DomainError> {
        let snapshot = source.read(path)?;
        let saved_at = snapshot.saved_at;
        let count = self.load_snapshot(snapshot)?;
        info!(tier = %self.tier(), faces = count, %saved_at, path = %path.display(), "restored faces");
        Ok(count)
    }

    fn debug_check_invariant(&self) {
        debug_assert_eq!(self.records.len(), self.vectors.len());
        debug_assert!(self.vectors.iter().all(|(key, _)| self.records.contains_key(key)));
    }
}
