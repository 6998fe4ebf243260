//! LLM integration for Brand Assist.
//!
//! The generator backend is Gemini's `generateContent` REST API, driven
//! through the backend-agnostic `LlmProvider` trait so tests can stub the
//! model entirely.

pub mod gemini;
pub mod provider;

pub use gemini::GeminiProvider;
pub use provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

use std::sync::Arc;
use std::time::Duration;

use crate::error::GenerationError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Gemini,
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub timeout: Duration,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, GenerationError> {
    match config.backend {
        LlmBackend::Gemini => {
            let provider =
                GeminiProvider::new(config.api_key.clone(), &config.model, config.timeout)?;
            tracing::info!("Using Gemini (model: {})", config.model);
            Ok(Arc::new(provider))
        }
    }
}
