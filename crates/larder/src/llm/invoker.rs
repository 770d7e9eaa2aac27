//! Model invoker trait and configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::ImagePayload;

/// Configuration for the model service.
///
/// Passed explicitly at invoker construction; the pipeline never relies
/// on ambient/global lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which generative model to target.
    pub model: String,

    /// Creativity of the completion (0.0-1.0).
    pub temperature: f64,

    /// Maximum tokens in the completion.
    pub max_output_tokens: u32,

    /// Upper bound on the network call, after which the invoker
    /// resolves to `Timeout`.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-flash-latest".to_string(),
            temperature: 0.5,
            max_output_tokens: 4096,
            timeout_secs: 30,
        }
    }
}

/// Boundary to the external generative model.
///
/// Implementations must be thread-safe (Send + Sync) so one pipeline
/// value can serve requests from multiple threads. They perform no
/// retries (retry policy belongs to the caller) and must not log or
/// persist prompt/response content beyond the current call, since prompts
/// carry user inventory data.
pub trait ModelInvoker: Send + Sync {
    /// Send a prompt, optionally with an inline image, and return the
    /// raw completion text or a typed failure.
    fn complete(&self, prompt: &str, image: Option<&ImagePayload>) -> Result<String>;

    /// Get the configuration for this invoker.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this invoker (for logging/debugging).
    fn name(&self) -> &str;
}
