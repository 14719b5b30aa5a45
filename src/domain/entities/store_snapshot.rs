use crate::domain::entities::identity_record::IdentityRecord;
use crate::domain::values::serialized_key::SerializedKey;
use crate::domain::values::tier::Tier;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Everything a store persists: the metadata mapping and the raw-vector
/// list, saved and restored as a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub tier: Tier,
    pub expiration_secs: i64,
    pub saved_at: DateTime<Utc>,
    pub records: HashMap<SerializedKey, IdentityRecord>,
    /// Raw vectors as canonical keys, in insertion order.
    pub vectors: Vec<SerializedKey>,
}
