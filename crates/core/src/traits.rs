use crate::error::RemoteError;
use async_trait::async_trait;

/// A remote generative-text service: a system instruction and a user prompt
/// go in, the generated text comes out.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, RemoteError>;
}
