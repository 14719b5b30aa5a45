use crate::domain::entities::identity_record::IdentityRecord;
use crate::domain::entities::store_snapshot::StoreSnapshot;
use crate::domain::error::DomainError;
use crate::domain::ports::snapshot_store::SnapshotStore;
use crate::domain::values::serialized_key::SerializedKey;
use crate::domain::values::tier::Tier;
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use std::collections::HashMap;
use std::path::Path;

/// Keeps each snapshot in its own SQLite file. A save runs in a single
/// transaction, so an interrupted write leaves the previous snapshot.
pub struct SqliteSnapshotStore;

impl SqliteSnapshotStore {
    fn corrupt(location: &Path, e: impl std::fmt::Display) -> DomainError {
        DomainError::CorruptCache(format!("{}: {e}", location.display()))
    }

    fn parse_time(location: &Path, raw: &str) -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Self::corrupt(location, format!("bad timestamp '{raw}': {e}")))
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn write(&self, location: &Path, snapshot: &StoreSnapshot) -> Result<(), DomainError> {
        if let Some(parent) = location.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(location)
            .map_err(|e| DomainError::Io(format!("DB error: {e}")))?;
        run_migrations(&conn).map_err(DomainError::Io)?;

        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Io(format!("Failed to begin save: {e}")))?;
        tx.execute_batch("DELETE FROM identities; DELETE FROM vectors;")
            .map_err(|e| DomainError::Io(format!("Failed to clear snapshot: {e}")))?;
        tx.execute(
            "INSERT OR REPLACE INTO store_meta (id, tier, expiration_secs, saved_at) VALUES (1, ?1, ?2, ?3)",
            params![
                snapshot.tier.to_string(),
                snapshot.expiration_secs,
                snapshot.saved_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Io(format!("Failed to save metadata: {e}")))?;

        {
            let mut insert_identity = tx
                .prepare("INSERT INTO identities (key, name, last_seen) VALUES (?1, ?2, ?3)")
                .map_err(|e| DomainError::Io(e.to_string()))?;
            for (key, record) in &snapshot.records {
                insert_identity
                    .execute(params![key.as_str(), record.name(), record.last_seen().to_rfc3339()])
                    .map_err(|e| DomainError::Io(format!("Failed to save face: {e}")))?;
            }

            let mut insert_vector = tx
                .prepare("INSERT INTO vectors (position, key) VALUES (?1, ?2)")
                .map_err(|e| DomainError::Io(e.to_string()))?;
            for (position, key) in snapshot.vectors.iter().enumerate() {
                insert_vector
                    .execute(params![position as i64, key.as_str()])
                    .map_err(|e| DomainError::Io(format!("Failed to save vector: {e}")))?;
            }
        }

        tx.commit()
            .map_err(|e| DomainError::Io(format!("Failed to commit snapshot: {e}")))
    }

    fn read(&self, location: &Path) -> Result<StoreSnapshot, DomainError> {
        if !location.exists() {
            return Err(DomainError::CacheMissing(location.display().to_string()));
        }
        let conn = Connection::open_with_flags(location, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| Self::corrupt(location, e))?;

        let (tier_str, expiration_secs, saved_str): (String, i64, String) = conn
            .query_row(
                "SELECT tier, expiration_secs, saved_at FROM store_meta WHERE id = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .map_err(|e| Self::corrupt(location, e))?;
        let tier: Tier = tier_str.parse().map_err(|e: String| Self::corrupt(location, e))?;
        let saved_at = Self::parse_time(location, &saved_str)?;

        let mut stmt = conn
            .prepare("SELECT key, name, last_seen FROM identities")
            .map_err(|e| Self::corrupt(location, e))?;
        let rows = stmt
            .query_map([], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?, r.get::<_, String>(2)?))
            })
            .map_err(|e| Self::corrupt(location, e))?;
        let mut records = HashMap::new();
        for row in rows {
            let (key, name, last_seen) = row.map_err(|e| Self::corrupt(location, e))?;
            let key = SerializedKey::parse(&key).map_err(|e| Self::corrupt(location, e))?;
            let last_seen = Self::parse_time(location, &last_seen)?;
            records.insert(key, IdentityRecord::new(name, last_seen));
        }

        let mut stmt = conn
            .prepare("SELECT key FROM vectors ORDER BY position")
            .map_err(|e| Self::corrupt(location, e))?;
        let rows = stmt
            .query_map([], |r| r.get::<_, String>(0))
            .map_err(|e| Self::corrupt(location, e))?;
        let mut vectors = Vec::new();
        for row in rows {
            let key = row.map_err(|e| Self::corrupt(location, e))?;
            vectors.push(SerializedKey::parse(&key).map_err(|e| Self::corrupt(location, e))?);
        }

        Ok(StoreSnapshot {
            tier,
            expiration_secs,
            saved_at,
            records,
            vectors,
        })
    }
}
