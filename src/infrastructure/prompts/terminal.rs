use crate::domain::error::DomainError;
use crate::domain::ports::name_prompt::{NamePrompt, NameRequest};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::oneshot;

type InputFn = dyn Fn() -> Box<dyn BufRead> + Send + Sync;

/// Asks on the terminal: the question goes to stderr and the answer is one
/// line of input.
///
/// The read runs on a dedicated thread rather than tokio's blocking pool.
/// A cancelled prompt leaves that thread parked on the read, and the
/// runtime does not wait for it on shutdown.
pub struct TerminalPrompt {
    input: Arc<InputFn>,
}

impl TerminalPrompt {
    /// Reads answers from stdin.
    pub fn new() -> Self {
        Self::with_input(|| Box::new(std::io::stdin().lock()))
    }

    /// Reads answers from whatever `input` opens, once per question.
    pub fn with_input<F>(input: F) -> Self
    where
        F: Fn() -> Box<dyn BufRead> + Send + Sync + 'static,
    {
        Self {
            input: Arc::new(input),
        }
    }

    fn message(request: &NameRequest) -> String {
        let b = request.region;
        let mut msg = format!(
            "Unknown face detected in frame {} at (top {}, right {}, bottom {}, left {})",
            request.frame_index, b.top, b.right, b.bottom, b.left
        );
        if let Some(crop) = &request.crop {
            msg.push_str(&format!(" [{crop}]"));
        }
        msg.push_str(". Please enter the name of the person (empty to skip): ");
        msg
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NamePrompt for TerminalPrompt {
    async fn ask(&self, request: NameRequest) -> Result<Option<String>, DomainError> {
        let message = Self::message(&request);
        let input = self.input.clone();
        let (tx, rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("facetier-prompt".into())
            .spawn(move || {
                let answer = (|| -> std::io::Result<String> {
                    let mut stderr = std::io::stderr().lock();
                    stderr.write_all(message.as_bytes())?;
                    stderr.flush()?;
                    let mut line = String::new();
                    input().read_line(&mut line)?;
                    Ok(line)
                })();
                // The receiver is gone when the prompt was cancelled.
                let _ = tx.send(answer);
            })
            .map_err(|e| DomainError::Prompt(format!("cannot start prompt thread: {e}")))?;

        let answer = rx
            .await
            .map_err(|_| DomainError::Prompt("prompt thread exited without an answer".into()))??;

        let name = answer.trim();
        Ok(if name.is_empty() { None } else { Some(name.to_string()) })
    }
}
