use crate::domain::error::DomainError;
use crate::domain::ports::name_prompt::{NamePrompt, NameRequest};

/// Declines every request. For unattended runs: unknown faces are still
/// tracked in the ephemeral tier but never promoted.
pub struct DeclinePrompt;

#[async_trait::async_trait]
impl NamePrompt for DeclinePrompt {
    async fn ask(&self, _request: NameRequest) -> Result<Option<String>, DomainError> {
        Ok(None)
    }
}
