pub mod gemini;

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::state::GroundingLink;

pub use gemini::GeminiClient;

/// Raw reply from a generative backend, before any normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedAnswer {
    pub text: String,
    /// References exactly as the backend reported them; uris and titles may be empty
    pub references: Vec<GroundingLink>,
}

/// One request to an external generative service.
#[async_trait]
pub trait HadithBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> BackendResult<GeneratedAnswer>;
}
