pub mod detection;
pub mod face_store;
pub mod identity_record;
pub mod store_snapshot;
