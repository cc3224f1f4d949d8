/*!
 * Per-chunk translation task.
 *
 * One task owns one chunk and one credential. It retries transient upstream
 * failures with exponential backoff and, once retries are exhausted, falls
 * back to the chunk's original text. A failed translation never corrupts or
 * drops content; it only loses the translation for that chunk.
 */

use log::{debug, error, warn};
use std::time::Duration;

use crate::credentials::Credential;
use crate::document::Chunk;
use crate::providers::Provider;
use crate::translation::core::CancellationToken;
use crate::translation::prompt::{extract_payload, PromptContext};
use crate::translation::reconcile::reconcile_line_count;

/// How a chunk's result slot was filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOrigin {
    /// The upstream translation succeeded (possibly after retries)
    Success,
    /// Retries were exhausted and the original text was kept
    Fallback,
}

/// The settled result of one chunk task
#[derive(Debug, Clone)]
pub struct ChunkResult {
    /// Reconciled chunk content
    pub content: String,
    /// Whether the content is a translation or the original text
    pub origin: ResultOrigin,
}

/// Everything a task reports back to the scheduler
#[derive(Debug)]
pub(crate) struct ChunkTaskOutput {
    /// The result destined for the chunk's slot
    pub result: ChunkResult,
    /// Whether the provider rejected this task's credential at least once
    pub auth_rejected: bool,
}

/// Bounded retry policy with capped exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt
    pub max_retries: u32,
    /// Base backoff in milliseconds, doubled per retry
    pub backoff_base_ms: u64,
    /// Upper bound for a single backoff sleep in milliseconds
    pub backoff_cap_ms: u64,
}

impl RetryPolicy {
    /// Backoff delay before the given retry (1-based)
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        let exponent = retry_count.min(20);
        let delay_ms = self.backoff_base_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay_ms.min(self.backoff_cap_ms))
    }
}

/// Translate one chunk, retrying transient failures, falling back on exhaustion
///
/// The backoff sleep and the in-flight request both race against the
/// cancellation token; a cancelled task settles immediately with its
/// fallback content so the scheduler's join completes promptly.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_chunk_task(
    provider: &dyn Provider,
    credential: &Credential,
    chunk: &Chunk,
    total_chunks: usize,
    prompt_context: &PromptContext,
    policy: &RetryPolicy,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ChunkTaskOutput {
    let prompt = prompt_context.chunk_prompt(&chunk.text, chunk.index + 1, total_chunks);

    let mut retry_count: u32 = 0;
    let mut auth_rejected = false;

    loop {
        if cancel.is_cancelled() {
            return fallback(chunk, auth_rejected);
        }

        debug!(
            "Translating chunk {}/{} with credential {}",
            chunk.index + 1,
            total_chunks,
            credential.id
        );

        let attempt = tokio::select! {
            result = provider.complete(&prompt, &credential.api_key, timeout) => result,
            _ = cancel.cancelled() => return fallback(chunk, auth_rejected),
        };

        match attempt {
            Ok(raw) => {
                let payload = extract_payload(&raw, &prompt_context.format_hint);
                let content = reconcile_line_count(&chunk.text, &payload);
                return ChunkTaskOutput {
                    result: ChunkResult { content, origin: ResultOrigin::Success },
                    auth_rejected,
                };
            }
            Err(e) => {
                if e.is_auth_error() {
                    auth_rejected = true;
                }

                retry_count += 1;
                if retry_count > policy.max_retries {
                    warn!("Using original content as fallback for chunk {}", chunk.index + 1);
                    return fallback(chunk, auth_rejected);
                }

                error!(
                    "Error translating chunk {} with credential {} (attempt {}/{}): {}",
                    chunk.index + 1,
                    credential.id,
                    retry_count,
                    policy.max_retries + 1,
                    e
                );

                let delay = policy.backoff_delay(retry_count);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return fallback(chunk, auth_rejected),
                }
            }
        }
    }
}

fn fallback(chunk: &Chunk, auth_rejected: bool) -> ChunkTaskOutput {
    ChunkTaskOutput {
        result: ChunkResult { content: chunk.text.clone(), origin: ResultOrigin::Fallback },
        auth_rejected,
    }
}
