//! Text-generation provider abstraction.

use async_trait::async_trait;

use crate::error::DomainError;

/// The response shape requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free-form prose.
    Text,
    /// A single strict JSON document.
    Json,
}

/// One prompt-in/text-out request against the provider.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System instruction framing the task.
    pub system_instruction: String,
    /// User-turn content.
    pub user_content: String,
    /// Whether free text or strict JSON is expected back.
    pub response_format: ResponseFormat,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional top-k sampling cutoff.
    pub top_k: Option<u32>,
    /// Optional nucleus-sampling cutoff.
    pub top_p: Option<f32>,
}

impl GenerationRequest {
    /// Builds a request with no top-k/top-p overrides.
    #[must_use]
    pub fn new(
        system_instruction: impl Into<String>,
        user_content: impl Into<String>,
        response_format: ResponseFormat,
        temperature: f32,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_content: user_content.into(),
            response_format,
            temperature,
            top_k: None,
            top_p: None,
        }
    }

    /// Sets the top-k and top-p sampling cutoffs.
    #[must_use]
    pub fn with_sampling(mut self, top_k: u32, top_p: f32) -> Self {
        self.top_k = Some(top_k);
        self.top_p = Some(top_p);
        self
    }
}

/// Trait for text-generation providers.
///
/// Implementations own transport concerns (timeouts, authentication); callers
/// own prompt composition and response validation. There is no retry at this
/// seam; a retry, if desired, is a fresh user-initiated call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one generation request and returns the raw response text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, DomainError>;
}
