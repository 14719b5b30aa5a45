use crate::domain::entities::detection::{Frame, LabeledFrame};
use crate::domain::error::DomainError;
use async_trait::async_trait;

/// Detection collaborator: yields per-frame detections until the stream ends.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> Result<Option<Frame>, DomainError>;
}

/// Rendering collaborator: receives (region, name) pairs for each frame.
#[async_trait]
pub trait FrameSink: Send {
    async fn render(&mut self, frame: &LabeledFrame) -> Result<(), DomainError>;
}
