use crate::domain::entities::detection::Frame;
use crate::domain::error::DomainError;
use crate::domain::ports::frame_io::FrameSource;
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// Reads detector output, one JSON frame per line:
/// `{"faces":[{"region":[top,right,bottom,left],"vector":[...]}]}`.
/// Blank lines are skipped.
pub struct JsonlFrameSource {
    lines: Lines<Box<dyn AsyncBufRead + Unpin + Send>>,
    line_no: u64,
}

impl JsonlFrameSource {
    pub fn new(reader: Box<dyn AsyncBufRead + Unpin + Send>) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Opens `input`, where `-` means stdin. Directories are rejected up
    /// front since every read from one fails.
    pub async fn open(input: &str) -> Result<Self, DomainError> {
        if input == "-" {
            return Ok(Self::new(Box::new(BufReader::new(tokio::io::stdin()))));
        }
        let metadata = tokio::fs::metadata(input)
            .await
            .map_err(|e| DomainError::Io(format!("Cannot open {input}: {e}")))?;
        if metadata.is_dir() {
            return Err(DomainError::InvalidInput(format!(
                "{input} is a directory, expected a JSON-lines file"
            )));
        }
        let file = tokio::fs::File::open(Path::new(input))
            .await
            .map_err(|e| DomainError::Io(format!("Cannot open {input}: {e}")))?;
        Ok(Self::new(Box::new(BufReader::new(file))))
    }
}

#[async_trait]
impl FrameSource for JsonlFrameSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, DomainError> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(&line).map(Some).map_err(|e| {
                DomainError::InvalidInput(format!("frame on line {}: {e}", self.line_no))
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &'static str) -> JsonlFrameSource {
        JsonlFrameSource::new(Box::new(BufReader::new(text.as_bytes())))
    }

    #[tokio::test]
    async fn test_reads_frames_and_skips_blank_lines() {
        let mut src = source(
            "{\"faces\":[{\"region\":[1,2,3,4],\"vector\":[0.5,0.25]}]}\n\n{\"faces\":[]}\n",
        );
        let first = src.next_frame().await.unwrap().unwrap();
        assert_eq!(first.faces.len(), 1);
        assert_eq!(first.faces[0].vector.as_slice(), &[0.5, 0.25]);
        let second = src.next_frame().await.unwrap().unwrap();
        assert!(second.faces.is_empty());
        assert!(src.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_line_is_reported_and_stream_continues() {
        let mut src = source("not json\n{}\n");
        let err = src.next_frame().await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(src.next_frame().await.unwrap().unwrap().faces.is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().to_string_lossy().into_owned();
        assert!(matches!(
            JsonlFrameSource::open(&input).await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.jsonl");
        std::fs::write(&path, "{\"faces\":[]}\n").unwrap();

        let Ok(mut src) = JsonlFrameSource::open(&path.to_string_lossy()).await else {
            panic!("file should open");
        };
        assert!(src.next_frame().await.unwrap().unwrap().faces.is_empty());
        assert!(src.next_frame().await.unwrap().is_none());
    }
}
