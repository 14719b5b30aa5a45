mod common;

use chrono::Duration;
use common::{stores, vector};
use facetier::domain::entities::face_store::FaceStore;
use facetier::domain::error::DomainError;
use facetier::domain::ports::snapshot_store::SnapshotStore;
use facetier::domain::values::serialized_key::SerializedKey;
use facetier::domain::values::tier::Tier;
use facetier::infrastructure::clock::ManualClock;
use facetier::infrastructure::sqlite::snapshot_store::SqliteSnapshotStore;
use std::sync::Arc;

#[test]
fn test_entry_matches_until_window_passes() {
    let clock = Arc::new(ManualClock::default());
    let (mut ephemeral, _) = stores(clock.clone(), Duration::hours(1));
    ephemeral.add("Alice", vector(&[0.2, 0.4]));

    clock.advance(Duration::minutes(59));
    ephemeral.sweep();
    let m = ephemeral.nearest_match(&vector(&[0.2, 0.4])).unwrap();
    assert_eq!(m.record.name(), "Alice");

    clock.advance(Duration::minutes(2));
    ephemeral.sweep();
    assert!(ephemeral.nearest_match(&vector(&[0.2, 0.4])).is_none());
    assert!(ephemeral.is_empty());
}

#[test]
fn test_touch_extends_lifetime() {
    let clock = Arc::new(ManualClock::default());
    let (mut ephemeral, _) = stores(clock.clone(), Duration::hours(1));
    let key = ephemeral.add("Bob", vector(&[1.0]));

    clock.advance(Duration::minutes(50));
    ephemeral.touch(&key).unwrap();
    clock.advance(Duration::minutes(50));

    assert!(ephemeral.sweep().is_empty());
    assert!(ephemeral.contains(&key));
}

#[test]
fn test_sweep_twice_removes_nothing_more() {
    let clock = Arc::new(ManualClock::default());
    let (mut ephemeral, _) = stores(clock.clone(), Duration::minutes(10));
    for i in 0..4 {
        ephemeral.add(format!("p{i}"), vector(&[i as f64 * 5.0]));
        clock.advance(Duration::minutes(4));
    }

    let first = ephemeral.sweep();
    let second = ephemeral.sweep();
    assert_eq!(first.len(), 2);
    assert!(second.is_empty());
    assert_eq!(ephemeral.len(), 2);
}

#[test]
fn test_first_inserted_match_wins() {
    let clock = Arc::new(ManualClock::default());
    let (_, mut permanent) = stores(clock, Duration::hours(1));
    permanent.add("A", vector(&[0.0, 0.55]));
    permanent.add("B", vector(&[0.0, 0.01]));

    let m = permanent.nearest_match(&vector(&[0.0, 0.0])).unwrap();
    assert_eq!(m.record.name(), "A");
}

#[test]
fn test_persist_and_restore_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("permanent.db");
    let clock = Arc::new(ManualClock::default());

    let (_, mut permanent) = stores(clock.clone(), Duration::hours(1));
    let precise = vector(&[0.1 + 0.2, -1.0 / 3.0, 1e-12]);
    permanent.add("Alice", precise.clone());
    permanent.add("Bob", vector(&[5.0, 5.0, 5.0]));
    permanent.add("Carol", vector(&[9.0, 9.0, 9.0]));
    permanent.persist(&SqliteSnapshotStore, &path).unwrap();

    let (_, mut restored) = stores(clock, Duration::hours(1));
    assert_eq!(restored.restore(&SqliteSnapshotStore, &path).unwrap(), 3);

    let names: Vec<_> = restored.entries().map(|(_, r)| r.name().to_string()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    let m = restored.nearest_match(&precise).unwrap();
    assert_eq!(m.key, SerializedKey::encode(&precise));
    assert_eq!(m.key.decode().unwrap(), precise);
    assert_eq!(m.distance, Some(0.0));
}

#[test]
fn test_restore_missing_snapshot_leaves_store_empty() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::default());
    let (mut ephemeral, _) = stores(clock, Duration::hours(1));

    let err = ephemeral
        .restore(&SqliteSnapshotStore, &dir.path().join("ephemeral.db"))
        .unwrap_err();
    assert!(matches!(err, DomainError::CacheMissing(_)));
    assert!(err.is_recoverable());
    assert_eq!(ephemeral.len(), 0);
}

#[test]
fn test_restore_corrupt_snapshot_keeps_current_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("permanent.db");
    std::fs::write(&path, vec![0xAB; 4096]).unwrap();

    let clock = Arc::new(ManualClock::default());
    let (_, mut permanent) = stores(clock, Duration::hours(1));
    permanent.add("Existing", vector(&[1.0]));

    let err = permanent.restore(&SqliteSnapshotStore, &path).unwrap_err();
    assert!(matches!(err, DomainError::CorruptCache(_)));
    assert!(!err.is_recoverable());
    assert_eq!(permanent.len(), 1);
}

#[test]
fn test_snapshot_with_diverging_lists_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("permanent.db");
    let clock = Arc::new(ManualClock::default());

    let (_, mut permanent) = stores(clock.clone(), Duration::hours(1));
    permanent.add("Alice", vector(&[1.0]));
    let mut snapshot = permanent.snapshot();
    snapshot.vectors.clear();
    SqliteSnapshotStore.write(&path, &snapshot).unwrap();

    let (_, mut restored) = stores(clock, Duration::hours(1));
    let err = restored.restore(&SqliteSnapshotStore, &path).unwrap_err();
    assert!(matches!(err, DomainError::CorruptCache(_)));
    assert!(restored.is_empty());
}

#[test]
fn test_tiers_are_never_cross_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ephemeral.db");
    let clock = Arc::new(ManualClock::default());

    let (mut ephemeral, mut permanent) = stores(clock, Duration::hours(1));
    ephemeral.add("Unknown", vector(&[1.0]));
    ephemeral.persist(&SqliteSnapshotStore, &path).unwrap();

    let err = permanent.restore(&SqliteSnapshotStore, &path).unwrap_err();
    assert!(matches!(err, DomainError::CorruptCache(_)));
    assert_eq!(permanent.tier(), Tier::Permanent);
}

#[test]
fn test_membership_invariant_across_mixed_operations() {
    let clock = Arc::new(ManualClock::default());
    let (mut ephemeral, _): (FaceStore, FaceStore) = stores(clock.clone(), Duration::minutes(5));
    let mut keys = Vec::new();
    for i in 0..10 {
        keys.push(ephemeral.add(format!("p{i}"), vector(&[i as f64 * 3.0, 1.0])));
        if i % 3 == 0 {
            clock.advance(Duration::minutes(2));
        }
    }
    ephemeral.remove(&keys[4]).unwrap();
    ephemeral.remove_by_name("p7").unwrap();
    assert!(ephemeral.remove(&keys[4]).is_err());
    clock.advance(Duration::minutes(4));
    ephemeral.sweep();

    let snapshot = ephemeral.snapshot();
    assert_eq!(snapshot.records.len(), snapshot.vectors.len());
    assert_eq!(snapshot.vectors.len(), ephemeral.len());
    for key in &snapshot.vectors {
        assert!(snapshot.records.contains_key(key));
    }
}
