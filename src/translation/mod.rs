/*!
 * Chunked translation orchestration.
 *
 * This module contains the core functionality for translating documents
 * chunk by chunk across a pool of credentials. It is split into several
 * submodules:
 *
 * - `core`: Orchestrator entry points, bounded scheduling and assembly
 * - `task`: Per-chunk translation task with retry, backoff and fallback
 * - `prompt`: Chunk prompt construction and response payload extraction
 * - `reconcile`: Line-count reconciliation at chunk and document granularity
 * - `formatting`: Preservation of placeholders and color codes
 */

// Re-export main types for easier usage
pub use self::core::{CancellationToken, Orchestrator};
pub use self::formatting::FormatPreserver;
pub use self::prompt::PromptContext;
pub use self::reconcile::reconcile_line_count;
pub use self::task::{ChunkResult, ResultOrigin, RetryPolicy};

// Submodules
pub mod core;
pub mod formatting;
pub mod prompt;
pub mod reconcile;
pub mod task;
