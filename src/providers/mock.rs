/*!
 * Mock provider implementations for testing.
 *
 * The mock understands the chunk prompt layout well enough to pull the
 * fenced payload back out, so orchestrator tests can assert on end-to-end
 * output. Behaviors cover the failure modes the retry and fallback paths
 * have to absorb.
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

static TOKEN_STRIP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([&§][0-9a-fklmnor])|(%[A-Za-z0-9_]+%)|(\{[A-Za-z0-9_]+\})|(<[A-Za-z0-9_]+>)")
        .unwrap()
});

static CHUNK_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"chunk (\d+) of \d+").unwrap());

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns the fenced payload unchanged
    Echo,
    /// Returns each payload line prefixed with a translation marker
    Prefix,
    /// Always fails with a server error
    Failing,
    /// Always fails with an authentication error
    AuthRejected,
    /// Fails every Nth request
    Intermittent { fail_every: usize },
    /// Fails the first N requests, then succeeds
    FlakyStart { failures: usize },
    /// Echoes the payload with its last lines removed
    DropLastLines { count: usize },
    /// Echoes the payload with formatting tokens stripped out
    DropTokens,
    /// Echoes the payload after a delay
    Slow { delay_ms: u64 },
    /// Persistently fails one chunk (1-based), prefixes every other one
    FailChunk { number: usize },
}

/// Mock provider for testing orchestrator behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Total number of calls received
    request_count: Arc<AtomicUsize>,
    /// Calls currently in flight
    in_flight: Arc<AtomicUsize>,
    /// High-water mark of concurrent calls
    max_in_flight: Arc<AtomicUsize>,
    /// Prompt and API key of every call, in arrival order
    calls: Arc<StdMutex<Vec<(String, String)>>>,
    /// Custom response generator (optional, Echo behavior only)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(StdMutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Set a custom response generator, used by the Echo behavior
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Mock that echoes chunks back unchanged
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Mock that visibly "translates" each line
    pub fn prefix() -> Self {
        Self::new(MockBehavior::Prefix)
    }

    /// Mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Mock that rejects every credential
    pub fn auth_rejected() -> Self {
        Self::new(MockBehavior::AuthRejected)
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Snapshot of (prompt, api_key) pairs in arrival order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Pull the fenced payload out of a chunk prompt
    fn payload_of(prompt: &str) -> String {
        let Some(open) = prompt.find("```") else {
            return prompt.to_string();
        };
        let Some(body_start) = prompt[open..].find('\n').map(|p| open + p + 1) else {
            return prompt.to_string();
        };
        let Some(close) = prompt[body_start..].rfind("\n```").map(|p| body_start + p) else {
            return prompt.to_string();
        };
        prompt[body_start..close].to_string()
    }

    fn respond(payload: String) -> String {
        format!("Here is the translation:\n```\n{}\n```", payload)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
            calls: Arc::clone(&self.calls),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(
        &self,
        prompt: &str,
        api_key: &str,
        _timeout: Duration,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push((prompt.to_string(), api_key.to_string()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Give sibling tasks a chance to overlap so the gauge means something
        tokio::time::sleep(Duration::from_millis(5)).await;

        let result = match self.behavior {
            MockBehavior::Echo => {
                if let Some(generator) = self.custom_response {
                    Ok(generator(prompt))
                } else {
                    Ok(Self::respond(Self::payload_of(prompt)))
                }
            }

            MockBehavior::Prefix => {
                let translated = Self::payload_of(prompt)
                    .split('\n')
                    .map(|line| format!("[vi] {}", line))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(Self::respond(translated))
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::AuthRejected => Err(ProviderError::AuthenticationError(
                "Simulated credential rejection".to_string(),
            )),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::respond(Self::payload_of(prompt)))
                }
            }

            MockBehavior::FlakyStart { failures } => {
                if count < failures {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated cold start (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(Self::respond(Self::payload_of(prompt)))
                }
            }

            MockBehavior::DropLastLines { count: dropped } => {
                let payload = Self::payload_of(prompt);
                let lines: Vec<&str> = payload.split('\n').collect();
                let keep = lines.len().saturating_sub(dropped);
                Ok(Self::respond(lines[..keep].join("\n")))
            }

            MockBehavior::DropTokens => {
                let payload = Self::payload_of(prompt);
                Ok(Self::respond(TOKEN_STRIP_REGEX.replace_all(&payload, "").to_string()))
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(Self::respond(Self::payload_of(prompt)))
            }

            MockBehavior::FailChunk { number } => {
                let chunk_number = CHUNK_NUMBER_REGEX
                    .captures(prompt)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<usize>().ok());
                if chunk_number == Some(number) {
                    Err(ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Simulated persistent failure for chunk {}", number),
                    })
                } else {
                    let translated = Self::payload_of(prompt)
                        .split('\n')
                        .map(|line| format!("[vi] {}", line))
                        .collect::<Vec<_>>()
                        .join("\n");
                    Ok(Self::respond(translated))
                }
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
