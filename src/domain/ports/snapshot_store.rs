use crate::domain::entities::store_snapshot::StoreSnapshot;
use crate::domain::error::DomainError;
use std::path::Path;

/// Durable storage for store snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Writes `snapshot` to `location`, creating missing parent directories.
    /// A failed write must leave any previous snapshot intact.
    fn write(&self, location: &Path, snapshot: &StoreSnapshot) -> Result<(), DomainError>;

    /// Fails with `CacheMissing` when nothing exists at `location` and with
    /// `CorruptCache` when something exists but cannot be read back.
    fn read(&self, location: &Path) -> Result<StoreSnapshot, DomainError>;
}
