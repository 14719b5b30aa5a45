use crate::domain::entities::detection::LabeledFrame;
use crate::domain::error::DomainError;
use crate::domain::ports::frame_io::FrameSink;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes one JSON line per resolved frame.
pub struct JsonlRenderer {
    out: Box<dyn AsyncWrite + Unpin + Send>,
}

impl JsonlRenderer {
    pub fn new(out: Box<dyn AsyncWrite + Unpin + Send>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(tokio::io::stdout()))
    }
}

#[async_trait]
impl FrameSink for JsonlRenderer {
    async fn render(&mut self, frame: &LabeledFrame) -> Result<(), DomainError> {
        let mut line = serde_json::to_vec(frame)
            .map_err(|e| DomainError::Io(format!("Cannot encode frame: {e}")))?;
        line.push(b'\n');
        self.out.write_all(&line).await?;
        self.out.flush().await?;
        Ok(())
    }
}
