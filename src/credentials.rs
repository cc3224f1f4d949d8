/*!
 * Credential pool and work distribution.
 *
 * Credentials are supplied by the caller as an explicit ordered list and
 * only borrowed for the duration of one job. Chunks are assigned to
 * credentials round-robin, and the pool computes the global concurrency
 * budget for the bounded scheduler.
 */

use log::debug;

use crate::errors::OrchestratorError;

/// An upstream access key with an associated concurrency budget
#[derive(Debug, Clone)]
pub struct Credential {
    /// Caller-chosen identifier, used in logs only
    pub id: String,

    /// API key handed to the provider on every request
    pub api_key: String,

    /// Per-credential concurrency override; the pool default applies when None
    pub concurrency: Option<usize>,
}

impl Credential {
    /// Create a credential with the pool-default concurrency
    pub fn new(id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { id: id.into(), api_key: api_key.into(), concurrency: None }
    }

    /// Set an explicit concurrency budget for this credential
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }
}

/// The ordered set of chunk indices assigned to one credential
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialGroup {
    /// Index of the owning credential in the pool
    pub credential_index: usize,

    /// Chunk indices this credential will process, in ascending order
    pub chunk_indices: Vec<usize>,
}

/// A non-empty ordered set of credentials for one job
#[derive(Debug)]
pub struct CredentialPool<'a> {
    credentials: &'a [Credential],
    default_concurrency: usize,
}

impl<'a> CredentialPool<'a> {
    /// Borrow a credential list for one job
    ///
    /// Fails with [`OrchestratorError::NoCredentials`] when the list is
    /// empty. That error is fatal for the job, never retried.
    pub fn new(
        credentials: &'a [Credential],
        default_concurrency: usize,
    ) -> Result<Self, OrchestratorError> {
        if credentials.is_empty() {
            return Err(OrchestratorError::NoCredentials);
        }
        Ok(Self { credentials, default_concurrency: default_concurrency.max(1) })
    }

    /// Number of credentials in the pool
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the pool is empty (never true for a constructed pool)
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// The credential that owns a given chunk index (round-robin)
    pub fn credential_for(&self, chunk_index: usize) -> &'a Credential {
        &self.credentials[chunk_index % self.credentials.len()]
    }

    /// Index of the credential that owns a given chunk index
    pub fn credential_index_for(&self, chunk_index: usize) -> usize {
        chunk_index % self.credentials.len()
    }

    /// Assign chunks to credentials round-robin: chunk `i` goes to group `i % k`
    pub fn distribute(&self, chunk_count: usize) -> Vec<CredentialGroup> {
        let mut groups: Vec<CredentialGroup> = (0..self.credentials.len())
            .map(|credential_index| CredentialGroup { credential_index, chunk_indices: Vec::new() })
            .collect();

        for chunk_index in 0..chunk_count {
            groups[chunk_index % self.credentials.len()].chunk_indices.push(chunk_index);
        }

        for group in &groups {
            debug!(
                "Credential {} will process {} chunks: {:?}",
                self.credentials[group.credential_index].id,
                group.chunk_indices.len(),
                group.chunk_indices
            );
        }

        groups
    }

    /// Effective concurrency for one credential
    pub fn concurrency_of(&self, credential_index: usize) -> usize {
        self.credentials[credential_index]
            .concurrency
            .unwrap_or(self.default_concurrency)
            .max(1)
    }

    /// Global concurrency ceiling for the scheduler
    ///
    /// The sum of every credential's effective concurrency. For a uniform
    /// pool this is `credential_count * per_credential_concurrency`.
    pub fn concurrency_budget(&self) -> usize {
        (0..self.credentials.len()).map(|i| self.concurrency_of(i)).sum()
    }
}
