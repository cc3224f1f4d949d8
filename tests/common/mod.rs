/*!
 * Common test utilities shared by the unit and integration suites
 */

use lintra::app_config::Config;
use lintra::credentials::Credential;

/// Route library logs to the test output when RUST_LOG is set
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a config tuned for fast test runs (millisecond backoffs)
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.common.retry_backoff_ms = 1;
    config.translation.common.retry_backoff_cap_ms = 5;
    config.translation.common.short_retry_backoff_cap_ms = 5;
    config
}

/// Same as [`test_config`] but with a custom chunk size limit
pub fn test_config_with_chunk_size(max_chunk_size: usize) -> Config {
    let mut config = test_config();
    config.translation.common.max_chunk_size = max_chunk_size;
    config
}

/// Build `n` distinct credentials
pub fn credentials(n: usize) -> Vec<Credential> {
    (0..n).map(|i| Credential::new(format!("key-{}", i), format!("secret-{}", i))).collect()
}

/// Build a document of `n` numbered lines
pub fn numbered_document(n: usize) -> String {
    (1..=n).map(|i| format!("message-{}: Text of line {}", i, i)).collect::<Vec<_>>().join("\n")
}
