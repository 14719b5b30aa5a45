//! Answers "who is this?" for detected faces against both tiers.
//!
//! Each face is classified as recently seen (ephemeral tier), known but
//! stale (permanent tier only) or unknown. Unknown faces are tracked in the
//! ephemeral tier under [`UNKNOWN_NAME`] straight away, and the first one
//! seen while no prompt is pending is handed to the [`NamePrompt`]
//! collaborator on a separate task. The prompt never touches the stores:
//! its answer comes back over a channel and the resolver promotes the face
//! into the permanent tier itself, once the answer has arrived.
//!
//! The "awaiting name" latch is the `pending` slot: set when a prompt is
//! dispatched, cleared when its answer is applied or the prompt is
//! cancelled.

use crate::domain::entities::detection::Detection;
use crate::domain::entities::face_store::FaceStore;
use crate::domain::error::DomainError;
use crate::domain::ports::name_prompt::{NamePrompt, NameRequest};
use crate::domain::ports::snapshot_store::SnapshotStore;
use crate::domain::values::classification::{Classification, UNKNOWN_NAME};
use crate::domain::values::face_vector::FaceVector;
use crate::domain::values::serialized_key::SerializedKey;
use crate::domain::values::tier::Tier;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type PromptResult = Result<Option<String>, DomainError>;

/// How one face was resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub classification: Classification,
    pub name: String,
    /// Key of the matched entry, or of the ephemeral entry created for an
    /// unknown face.
    pub key: Option<SerializedKey>,
    pub distance: Option<f64>,
}

/// What happened to a prompt once it settled.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    Promoted { name: String, key: SerializedKey },
    Declined,
    Failed(String),
}

struct PendingPrompt {
    key: SerializedKey,
    vector: FaceVector,
    answer: oneshot::Receiver<PromptResult>,
    task: JoinHandle<()>,
}

pub struct IdentityResolver {
    ephemeral: FaceStore,
    permanent: FaceStore,
    prompter: Arc<dyn NamePrompt>,
    pending: Option<PendingPrompt>,
}

impl IdentityResolver {
    pub fn new(ephemeral: FaceStore, permanent: FaceStore, prompter: Arc<dyn NamePrompt>) -> Self {
        debug_assert_eq!(ephemeral.tier(), Tier::Ephemeral);
        debug_assert_eq!(permanent.tier(), Tier::Permanent);
        Self {
            ephemeral,
            permanent,
            prompter,
            pending: None,
        }
    }

    pub fn ephemeral(&self) -> &FaceStore {
        &self.ephemeral
    }

    pub fn permanent(&self) -> &FaceStore {
        &self.permanent
    }

    pub fn store(&self, tier: Tier) -> &FaceStore {
        match tier {
            Tier::Ephemeral => &self.ephemeral,
            Tier::Permanent => &self.permanent,
        }
    }

    pub fn store_mut(&mut self, tier: Tier) -> &mut FaceStore {
        match tier {
            Tier::Ephemeral => &mut self.ephemeral,
            Tier::Permanent => &mut self.permanent,
        }
    }

    /// True while a name prompt is outstanding.
    pub fn awaiting_name(&self) -> bool {
        self.pending.is_some()
    }

    /// Evicts expired ephemeral entries. The face behind a pending prompt
    /// stays until the prompt settles.
    pub fn sweep(&mut self) -> usize {
        let pinned = self.pending.as_ref().map(|p| p.key.clone());
        self.ephemeral.sweep_except(pinned.as_ref()).len()
    }

    /// Classifies one vector without recording anything about it.
    /// A recently-seen match does not refresh `last_seen`.
    pub fn classify(&mut self, vector: &FaceVector) -> Resolution {
        self.sweep();

        if let Some(m) = self.ephemeral.nearest_match(vector) {
            return Resolution {
                classification: Classification::RecentlySeen,
                name: m.record.name().to_string(),
                key: Some(m.key),
                distance: m.distance,
            };
        }
        if let Some(m) = self.permanent.nearest_match(vector) {
            return Resolution {
                classification: Classification::KnownStale,
                name: m.record.name().to_string(),
                key: Some(m.key),
                distance: m.distance,
            };
        }
        Resolution {
            classification: Classification::Unknown,
            name: UNKNOWN_NAME.to_string(),
            key: None,
            distance: None,
        }
    }

    /// Resolves every detection of one frame, in detector order. Unknown
    /// faces are added to the ephemeral tier; the first of them triggers a
    /// name prompt unless one is already pending.
    ///
    /// Prompts are spawned on the current tokio runtime. Without one, the
    /// face is still tracked but no prompt is issued.
    pub fn resolve_frame(&mut self, frame_index: u64, detections: &[Detection]) -> Vec<Resolution> {
        let mut resolved = Vec::with_capacity(detections.len());
        for detection in detections {
            let mut resolution = self.classify(&detection.vector);
            if resolution.classification == Classification::Unknown {
                let key = self.ephemeral.add(UNKNOWN_NAME, detection.vector.clone());
                if !self.awaiting_name() {
                    let request = NameRequest {
                        frame_index,
                        region: detection.region,
                        crop: detection.crop.clone(),
                    };
                    self.dispatch_prompt(key.clone(), detection.vector.clone(), request);
                }
                resolution.key = Some(key);
            }
            resolved.push(resolution);
        }
        resolved
    }

    fn dispatch_prompt(&mut self, key: SerializedKey, vector: FaceVector, request: NameRequest) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(key = key.short(), "no async runtime, skipping name prompt");
                return;
            }
        };
        let (tx, answer) = oneshot::channel();
        let prompter = self.prompter.clone();
        let task = runtime.spawn(async move {
            let _ = tx.send(prompter.ask(request).await);
        });
        info!(key = key.short(), "unknown face, asking for a name");
        self.pending = Some(PendingPrompt {
            key,
            vector,
            answer,
            task,
        });
    }

    /// Applies the pending prompt's answer if it has arrived. Never blocks.
    pub fn poll_prompt(&mut self) -> Option<PromptOutcome> {
        let pending = self.pending.as_mut()?;
        let answer = match pending.answer.try_recv() {
            Ok(answer) => answer,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(Self::no_answer()),
        };
        let PendingPrompt { key, vector, .. } = self.pending.take()?;
        Some(self.apply_answer(key, vector, answer))
    }

    /// Waits for the pending prompt, if any, and applies its answer.
    pub async fn settle(&mut self) -> Option<PromptOutcome> {
        let PendingPrompt {
            key, vector, answer, ..
        } = self.pending.take()?;
        let answer = answer.await.unwrap_or_else(|_| Err(Self::no_answer()));
        Some(self.apply_answer(key, vector, answer))
    }

    fn no_answer() -> DomainError {
        DomainError::Prompt("prompt task ended without an answer".into())
    }

    /// Abandons the pending prompt. No store is touched.
    pub fn cancel_prompt(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.task.abort();
                info!(key = pending.key.short(), "name prompt cancelled");
                true
            }
            None => false,
        }
    }

    /// Promotes on a non-empty name. The ephemeral "Unknown" entry is left
    /// to expire on its own.
    fn apply_answer(&mut self, key: SerializedKey, vector: FaceVector, answer: PromptResult) -> PromptOutcome {
        match answer {
            Ok(Some(name)) if !name.trim().is_empty() => {
                let name = name.trim().to_string();
                let key = self.permanent.add(name.clone(), vector);
                info!(key = key.short(), name = %name, "promoted face to permanent tier");
                PromptOutcome::Promoted { name, key }
            }
            Ok(_) => {
                info!(key = key.short(), "unknown face not named");
                PromptOutcome::Declined
            }
            Err(e) => {
                warn!(key = key.short(), error = %e, "name prompt failed");
                PromptOutcome::Failed(e.to_string())
            }
        }
    }

    /// Snapshot location of a tier under `cache_dir`.
    pub fn snapshot_path(cache_dir: &Path, tier: Tier) -> PathBuf {
        cache_dir.join(format!("{}.db", tier.file_stem()))
    }

    pub fn persist(&self, sink: &dyn SnapshotStore, cache_dir: &Path) -> Result<(), DomainError> {
        for tier in [Tier::Permanent, Tier::Ephemeral] {
            self.store(tier)
                .persist(sink, &Self::snapshot_path(cache_dir, tier))?;
        }
        Ok(())
    }

    /// Restores both tiers. A missing snapshot is logged and skipped; a
    /// corrupt one is returned as an error.
    pub fn restore(&mut self, source: &dyn SnapshotStore, cache_dir: &Path) -> Result<(), DomainError> {
        for tier in [Tier::Permanent, Tier::Ephemeral] {
            let path = Self::snapshot_path(cache_dir, tier);
            match self.store_mut(tier).restore(source, &path) {
                Ok(_) => {}
                Err(DomainError::CacheMissing(p)) => {
                    warn!(%tier, path = %p, "no cached faces, starting empty");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl Drop for IdentityResolver {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(key = pending.key.short(), "dropping resolver with a pending prompt");
            pending.task.abort();
        }
    }
}
