/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported LLM
 * providers:
 * - Gemini: Google Generative Language API
 * - OpenAI: OpenAI API integration
 * - Mock: configurable in-process provider used by the test suite
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// The trait is object safe so the orchestrator can hold any provider
/// behind `Arc<dyn Provider>` and the tests can substitute the mock.
/// A provider client is shared across a whole job; the credential is bound
/// per call, since each chunk task owns exactly one credential.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Complete a single prompt using the given credential
    ///
    /// # Arguments
    /// * `prompt` - The full prompt text for one chunk
    /// * `api_key` - The credential's API key
    /// * `timeout` - Per-request timeout
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw response text or an error
    async fn complete(
        &self,
        prompt: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<String, ProviderError>;
}

pub mod gemini;
pub mod mock;
pub mod openai;
