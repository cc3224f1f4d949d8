/*!
 * Core orchestrator implementation.
 *
 * This module contains the main Orchestrator struct and its implementation,
 * which is responsible for the whole chunked translation job: chunking,
 * round-robin work distribution, bounded concurrent scheduling, assembly,
 * document-level reconciliation and token preservation.
 */

use anyhow::{anyhow, Result};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use futures::stream::{self, StreamExt};

use crate::app_config::{Config, TranslationProvider as ConfigTranslationProvider};
use crate::credentials::{Credential, CredentialPool};
use crate::document::{reassemble, split_into_chunks, Document};
use crate::errors::OrchestratorError;
use crate::providers::gemini::Gemini;
use crate::providers::openai::OpenAI;
use crate::providers::Provider;
use crate::translation::formatting::FormatPreserver;
use crate::translation::prompt::{strip_wrapping_quotes, PromptContext};
use crate::translation::reconcile::reconcile_line_count;
use crate::translation::task::{run_chunk_task, ChunkResult, ResultOrigin, RetryPolicy};

/// Cooperative cancellation handle for a translation job
///
/// Clones share one flag. Every in-flight provider call and every backoff
/// sleep races against `cancelled()`, so an abandoned job releases its
/// requests promptly instead of draining the retry schedule.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Create a fresh, uncancelled token
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self { sender: Arc::new(sender), receiver }
    }

    /// Cancel the job this token is threaded through
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }

    /// Whether the token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait until the token is cancelled
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        while !*receiver.borrow_and_update() {
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Main orchestrator for resilient chunked translation
///
/// One orchestrator is built per configuration and can run any number of
/// jobs; all per-job state (result slots, progress counter, credential
/// flags) lives inside a single `translate` call and dies with it.
pub struct Orchestrator {
    /// Provider implementation
    provider: Arc<dyn Provider>,

    /// Configuration for the orchestrator
    pub config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let provider_config = config
            .translation
            .provider_config()
            .ok_or_else(|| anyhow!("No provider configuration for {}", config.translation.provider))?;

        let provider: Arc<dyn Provider> = match config.translation.provider {
            ConfigTranslationProvider::Gemini => Arc::new(Gemini::new(
                &provider_config.endpoint,
                &provider_config.model,
                provider_config.temperature,
                provider_config.max_output_tokens,
            )),
            ConfigTranslationProvider::OpenAI => Arc::new(OpenAI::new(
                &provider_config.endpoint,
                &provider_config.model,
                provider_config.temperature,
                provider_config.max_output_tokens,
                format!(
                    "You are an expert translator. Translate the provided content from {} to {} \
                     while preserving the structure and format. Maintain any special fonts or \
                     formatting in the text.",
                    config.source_language, config.target_language
                ),
            )),
        };

        Ok(Self { provider, config })
    }

    /// Create an orchestrator around an existing provider (used by tests)
    pub fn with_provider(provider: Arc<dyn Provider>, config: Config) -> Self {
        Self { provider, config }
    }

    /// Translate a whole document
    ///
    /// Splits the document into chunks, translates them concurrently across
    /// the supplied credentials and returns output with exactly the original
    /// line count. `progress` is invoked with `(completed, total)` as chunk
    /// tasks settle, starting with `(0, total)`.
    pub async fn translate(
        &self,
        text: &str,
        format_hint: &str,
        credentials: &[Credential],
        progress: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Result<String, OrchestratorError> {
        self.translate_with_cancel(text, format_hint, credentials, progress, &CancellationToken::new())
            .await
    }

    /// Translate a whole document under a cancellation token
    pub async fn translate_with_cancel(
        &self,
        text: &str,
        format_hint: &str,
        credentials: &[Credential],
        progress: impl Fn(usize, usize) + Clone + Send + 'static,
        cancel: &CancellationToken,
    ) -> Result<String, OrchestratorError> {
        let common = &self.config.translation.common;
        let pool = CredentialPool::new(
            credentials,
            self.config.translation.per_credential_concurrency(credentials.len()),
        )?;

        let document = Document::new(text);
        let chunks = split_into_chunks(text, common.max_chunk_size);
        let total = chunks.len();
        info!(
            "Translating document of {} lines as {} chunks across {} credentials",
            document.line_count(),
            total,
            pool.len()
        );

        // Logged round-robin distribution; execution below binds chunk i to
        // credential i mod k through the same pool.
        let groups = pool.distribute(total);

        progress(0, total);

        let budget = pool.concurrency_budget();
        let semaphore = Arc::new(Semaphore::new(budget));
        let completed = Arc::new(AtomicUsize::new(0));
        let auth_flags: Arc<Vec<AtomicBool>> =
            Arc::new((0..pool.len()).map(|_| AtomicBool::new(false)).collect());

        let prompt_context = PromptContext {
            format_hint: format_hint.to_string(),
            source_language: self.config.source_language.clone(),
            target_language: self.config.target_language.clone(),
        };
        let policy = RetryPolicy {
            max_retries: common.max_retries,
            backoff_base_ms: common.retry_backoff_ms,
            backoff_cap_ms: common.retry_backoff_cap_ms,
        };
        let timeout = Duration::from_secs(common.timeout_secs);

        let assignments: Vec<(usize, usize)> = groups
            .iter()
            .flat_map(|group| {
                group.chunk_indices.iter().map(|&chunk_index| (chunk_index, group.credential_index))
            })
            .collect();

        let chunks_ref = &chunks;
        let prompt_ref = &prompt_context;
        let policy_ref = &policy;

        // All tasks of all groups share one bounded scheduler; completion
        // order is unconstrained because every task owns its own slot index.
        let results: Vec<(usize, ChunkResult)> = stream::iter(assignments)
            .map(|(chunk_index, credential_index)| {
                let semaphore = Arc::clone(&semaphore);
                let provider = Arc::clone(&self.provider);
                let completed = Arc::clone(&completed);
                let progress = progress.clone();
                let auth_flags = Arc::clone(&auth_flags);
                let cancel = cancel.clone();

                async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    let output = run_chunk_task(
                        provider.as_ref(),
                        &credentials[credential_index],
                        &chunks_ref[chunk_index],
                        total,
                        prompt_ref,
                        policy_ref,
                        timeout,
                        &cancel,
                    )
                    .await;

                    if output.auth_rejected {
                        auth_flags[credential_index].store(true, Ordering::SeqCst);
                    }

                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress(current, total);

                    (chunk_index, output.result)
                }
            })
            .buffer_unordered(budget)
            .collect()
            .await;

        if cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        // Arena of result slots, one per chunk index, each written exactly
        // once by the task that owns that index.
        let mut slots: Vec<Option<ChunkResult>> = (0..total).map(|_| None).collect();
        for (chunk_index, result) in results {
            debug_assert!(slots[chunk_index].is_none());
            slots[chunk_index] = Some(result);
        }
        let slot_results: Vec<ChunkResult> = slots
            .into_iter()
            .map(|slot| slot.expect("every chunk task settles its own slot"))
            .collect();

        let fallback_count =
            slot_results.iter().filter(|r| r.origin == ResultOrigin::Fallback).count();
        if fallback_count > 0 {
            info!("{} of {} chunks kept their original content", fallback_count, total);
            if fallback_count == total && auth_flags.iter().all(|f| f.load(Ordering::SeqCst)) {
                return Err(OrchestratorError::AllCredentialsRejected(pool.len()));
            }
        }

        // Assemble in chunk order, then run the coarser document-level net
        let contents: Vec<String> = slot_results.into_iter().map(|r| r.content).collect();
        let assembled = reassemble(&chunks, &contents);
        debug!(
            "Assembled {} chunks: {} lines against {} original",
            total,
            assembled.split('\n').count(),
            document.line_count()
        );

        let reconciled = reconcile_line_count(text, &assembled);
        Ok(FormatPreserver::preserve(text, &reconciled))
    }

    /// Translate a short ad-hoc text with the first credential
    ///
    /// Uses the short request timeout and backoff cap. Unlike document
    /// chunks there is no fallback-to-original here: after retry exhaustion
    /// the provider error is returned to the caller.
    pub async fn translate_short(
        &self,
        text: &str,
        credentials: &[Credential],
    ) -> Result<String, OrchestratorError> {
        let common = &self.config.translation.common;
        let pool = CredentialPool::new(credentials, 1)?;
        let credential = pool.credential_for(0);

        let prompt_context = PromptContext {
            format_hint: "text".to_string(),
            source_language: self.config.source_language.clone(),
            target_language: self.config.target_language.clone(),
        };
        let prompt = prompt_context.short_prompt(text);
        let policy = RetryPolicy {
            max_retries: common.max_retries,
            backoff_base_ms: common.retry_backoff_ms,
            backoff_cap_ms: common.short_retry_backoff_cap_ms,
        };
        let timeout = Duration::from_secs(common.short_text_timeout_secs);

        let mut retry_count: u32 = 0;
        loop {
            match self.provider.complete(&prompt, &credential.api_key, timeout).await {
                Ok(raw) => return Ok(strip_wrapping_quotes(&raw).to_string()),
                Err(e) => {
                    retry_count += 1;
                    if retry_count > policy.max_retries {
                        return Err(OrchestratorError::Provider(e));
                    }
                    log::error!(
                        "Error translating short text (attempt {}/{}): {}",
                        retry_count,
                        policy.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(policy.backoff_delay(retry_count)).await;
                }
            }
        }
    }
}
