use crate::domain::error::DomainError;
use crate::domain::values::region::BoundingBox;

/// What the naming collaborator is shown when an unknown face appears.
#[derive(Debug, Clone)]
pub struct NameRequest {
    pub frame_index: u64,
    /// Box on the original frame.
    pub region: BoundingBox,
    /// Opaque reference to the cropped face image, if the detector gave one.
    pub crop: Option<String>,
}

/// Asks a human to name a face. Long-latency; callers run it off the
/// frame loop. `Ok(None)` (or an empty name) means the human declined.
#[async_trait::async_trait]
pub trait NamePrompt: Send + Sync {
    async fn ask(&self, request: NameRequest) -> Result<Option<String>, DomainError>;
}
