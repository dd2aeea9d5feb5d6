pub mod client;
pub mod types;

pub use client::GeminiClient;
pub use types::{GenerationOutcome, GenerationRequest, InlineDocument, TokenUsage};

use crate::error::Result;

/// The seam between the engine and the external generation service.
///
/// The production implementation is [`GeminiClient`]; tests substitute a
/// fake so the pipeline can be exercised without network access.
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome>;
}
