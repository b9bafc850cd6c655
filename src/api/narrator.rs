use crate::Result;

/// Writes a natural-language analysis from a structured payload. This is the one seam where
/// finsheet talks to something it does not control, so implementations are swapped out in tests
/// and in test mode.
#[async_trait::async_trait]
pub trait Narrator: Send + Sync {
    /// Sends `payload` and returns the generated text. An empty reply is an error.
    async fn generate(&self, payload: &str) -> Result<String>;
}
