pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::identity_resolver::{IdentityResolver, Resolution};
use crate::application::stats::{RegistryStats, StatsUseCase};
use crate::application::stream::{StreamSettings, StreamSummary, StreamUseCase};
use crate::config::FaceTierConfig;
use crate::domain::entities::face_store::FaceStore;
use crate::domain::error::DomainError;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::face_matcher::FaceMatcher;
use crate::domain::ports::frame_io::{FrameSink, FrameSource};
use crate::domain::ports::name_prompt::NamePrompt;
use crate::domain::ports::snapshot_store::SnapshotStore;
use crate::domain::values::face_vector::FaceVector;
use crate::domain::values::serialized_key::SerializedKey;
use crate::domain::values::tier::Tier;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::matchers::euclidean::EuclideanMatcher;
use crate::infrastructure::sqlite::snapshot_store::SqliteSnapshotStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// One stored face as listed to users.
#[derive(Debug, Clone, Serialize)]
pub struct FaceEntry {
    pub tier: Tier,
    pub key: SerializedKey,
    pub name: String,
    pub last_seen: DateTime<Utc>,
    pub expired: bool,
}

pub struct FaceTier {
    config: FaceTierConfig,
    resolver: IdentityResolver,
    snapshots: Arc<dyn SnapshotStore>,
}

impl FaceTier {
    pub fn new(config: FaceTierConfig, prompter: Arc<dyn NamePrompt>) -> Result<Self, DomainError> {
        let matcher = EuclideanMatcher::new(config.tolerance).map_err(DomainError::InvalidInput)?;
        Self::with_providers(
            config,
            Arc::new(matcher),
            Arc::new(SystemClock),
            prompter,
            Arc::new(SqliteSnapshotStore),
        )
    }

    pub fn with_providers(
        config: FaceTierConfig,
        matcher: Arc<dyn FaceMatcher>,
        clock: Arc<dyn Clock>,
        prompter: Arc<dyn NamePrompt>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let ephemeral = FaceStore::ephemeral(config.expiration_time, matcher.clone(), clock.clone());
        let permanent = FaceStore::permanent(config.expiration_time, matcher, clock);
        let mut resolver = IdentityResolver::new(ephemeral, permanent, prompter);

        if config.init_from_cache {
            resolver.restore(snapshots.as_ref(), &config.cache_path)?;
        }

        Ok(Self {
            config,
            resolver,
            snapshots,
        })
    }

    pub fn config(&self) -> &FaceTierConfig {
        &self.config
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    // Delegating methods
    pub async fn stream<F>(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        shutdown: F,
    ) -> StreamSummary
    where
        F: Future<Output = ()>,
    {
        let stream_uc = StreamUseCase::new(StreamSettings {
            resize_factor: self.config.resize_factor,
            frame_stride: self.config.frame_stride,
        });
        stream_uc.run(&mut self.resolver, source, sink, shutdown).await
    }

    pub fn save(&self) -> Result<(), DomainError> {
        self.resolver
            .persist(self.snapshots.as_ref(), &self.config.cache_path)
    }

    pub fn identify(&mut self, vector: &FaceVector) -> Resolution {
        self.resolver.classify(vector)
    }

    pub fn add(&mut self, tier: Tier, name: &str, vector: FaceVector) -> SerializedKey {
        self.resolver.store_mut(tier).add(name, vector)
    }

    pub fn remove_key(&mut self, tier: Tier, key: &SerializedKey) -> Result<String, DomainError> {
        self.resolver
            .store_mut(tier)
            .remove(key)
            .map(|record| record.name().to_string())
    }

    pub fn remove_name(&mut self, tier: Tier, name: &str) -> Result<SerializedKey, DomainError> {
        self.resolver.store_mut(tier).remove_by_name(name)
    }

    pub fn touch(&mut self, tier: Tier, key: &SerializedKey) -> Result<(), DomainError> {
        self.resolver.store_mut(tier).touch(key)
    }

    pub fn sweep(&mut self) -> usize {
        self.resolver.sweep()
    }

    pub fn list(&self, tier: Tier) -> Vec<FaceEntry> {
        let store = self.resolver.store(tier);
        store
            .entries()
            .map(|(key, record)| FaceEntry {
                tier,
                key: key.clone(),
                name: record.name().to_string(),
                last_seen: record.last_seen(),
                expired: store.is_expired(key),
            })
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        StatsUseCase::stats(self.resolver.permanent(), self.resolver.ephemeral())
    }
}
