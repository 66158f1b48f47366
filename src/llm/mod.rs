pub mod assistant;
#[cfg(feature = "groq")]
pub mod client;
pub mod prompts;
pub mod types;

pub use assistant::*;
#[cfg(feature = "groq")]
pub use client::*;
pub use types::*;

use crate::error::Result;
use async_trait::async_trait;

/// Opaque text-in/text-out generation backend.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
