/*!
 * End-to-end orchestrator tests against the mock provider.
 *
 * These cover the structural guarantees of a translation job: line-count
 * parity, assembly order, retry bounds, fallback behavior, concurrency
 * limits, round-robin fairness and token preservation.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use lintra::app_config::Config;
use lintra::errors::OrchestratorError;
use lintra::providers::mock::{MockBehavior, MockProvider};
use lintra::translation::{CancellationToken, Orchestrator};

use crate::common::{
    credentials, init_logs, numbered_document, test_config, test_config_with_chunk_size,
};

static CHUNK_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"chunk (\d+) of \d+").unwrap());

fn orchestrator_with(provider: MockProvider, config: Config) -> (Orchestrator, MockProvider) {
    let shared = provider.clone();
    (Orchestrator::with_provider(Arc::new(provider), config), shared)
}

#[tokio::test]
async fn test_translate_withSmallDocument_shouldRunSingleChunkAndKeepLineCount() {
    // 40 lines, well below the chunk limit, one credential
    let document = numbered_document(40);
    let (orchestrator, mock) = orchestrator_with(MockProvider::prefix(), test_config());

    let progress_events = Arc::new(StdMutex::new(Vec::new()));
    let events = Arc::clone(&progress_events);

    let result = orchestrator
        .translate(&document, "yaml", &credentials(1), move |completed, total| {
            events.lock().unwrap().push((completed, total));
        })
        .await
        .unwrap();

    assert_eq!(result.split('\n').count(), 40);
    assert!(result.split('\n').all(|line| line.starts_with("[vi] ")));
    assert_eq!(mock.request_count(), 1);

    let events = progress_events.lock().unwrap();
    assert_eq!(events.first(), Some(&(0, 1)));
    assert_eq!(events.last(), Some(&(1, 1)));
}

#[tokio::test]
async fn test_translate_withManyChunks_shouldPreserveLineCountAndOrder() {
    init_logs();
    let document = numbered_document(500);
    let config = test_config_with_chunk_size(120);
    let (orchestrator, _mock) = orchestrator_with(MockProvider::prefix(), config);

    let result =
        orchestrator.translate(&document, "yaml", &credentials(3), |_, _| {}).await.unwrap();

    let original_lines: Vec<&str> = document.split('\n').collect();
    let result_lines: Vec<&str> = result.split('\n').collect();
    assert_eq!(result_lines.len(), original_lines.len());

    // Assembly is strictly in ascending chunk order regardless of completion
    // order, so line i of the output is the translation of line i.
    for (original, translated) in original_lines.iter().zip(&result_lines) {
        assert_eq!(*translated, format!("[vi] {}", original));
    }
}

#[tokio::test]
async fn test_translate_withAllCallsFailing_shouldReturnOriginalDocument() {
    init_logs();
    let document = numbered_document(60);
    let config = test_config_with_chunk_size(100);
    let (orchestrator, mock) = orchestrator_with(MockProvider::failing(), config);

    let result =
        orchestrator.translate(&document, "yaml", &credentials(2), |_, _| {}).await.unwrap();

    // Full-fallback property: every chunk degraded to its original text
    assert_eq!(result, document);
    assert!(mock.request_count() > 0);
}

#[tokio::test]
async fn test_translate_withFailingProvider_shouldRespectRetryBound() {
    let document = numbered_document(12);
    let config = test_config_with_chunk_size(100);
    let max_retries = config.translation.common.max_retries as usize;
    let chunk_count = 4; // 12 short lines at 100 chars land in 4 chunks

    let (orchestrator, mock) = orchestrator_with(MockProvider::failing(), config);
    let _ = orchestrator.translate(&document, "yaml", &credentials(2), |_, _| {}).await.unwrap();

    // No chunk issues more than max_retries + 1 upstream calls
    assert_eq!(mock.request_count(), chunk_count * (max_retries + 1));
}

#[tokio::test]
async fn test_translate_withSlowProvider_shouldStayUnderConcurrencyBudget() {
    let document = numbered_document(120);
    let config = test_config_with_chunk_size(80);
    let (orchestrator, mock) =
        orchestrator_with(MockProvider::new(MockBehavior::Slow { delay_ms: 20 }), config);

    // 2 credentials at the default multi-credential concurrency of 2 each
    orchestrator.translate(&document, "yaml", &credentials(2), |_, _| {}).await.unwrap();

    assert!(mock.max_in_flight() <= 4, "saw {} concurrent calls", mock.max_in_flight());
    assert!(mock.max_in_flight() >= 2);
}

#[tokio::test]
async fn test_translate_shouldAssignChunksRoundRobin() {
    let document = numbered_document(90);
    let config = test_config_with_chunk_size(80);
    let (orchestrator, mock) = orchestrator_with(MockProvider::prefix(), config);

    let creds = credentials(3);
    orchestrator.translate(&document, "yaml", &creds, |_, _| {}).await.unwrap();

    // Chunk i must have been processed with credential i mod 3
    for (prompt, api_key) in mock.calls() {
        let chunk_number: usize = CHUNK_NUMBER_REGEX
            .captures(&prompt)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .expect("every prompt names its chunk");
        let chunk_index = chunk_number - 1;
        assert_eq!(api_key, creds[chunk_index % 3].api_key);
    }
}

#[tokio::test]
async fn test_translate_withOnePersistentlyFailingChunk_shouldFallBackOnlyThatChunk() {
    // Five lines sized so each chunk carries exactly one line
    let document = (1..=5).map(|i| format!("line-{:02} content xx", i)).collect::<Vec<_>>().join("\n");
    let config = test_config_with_chunk_size(20);
    let (orchestrator, _mock) =
        orchestrator_with(MockProvider::new(MockBehavior::FailChunk { number: 3 }), config);

    let result =
        orchestrator.translate(&document, "yaml", &credentials(1), |_, _| {}).await.unwrap();
    let lines: Vec<&str> = result.split('\n').collect();

    assert_eq!(lines.len(), 5);
    // Chunk 3 (index 2) kept its original text, its siblings translated
    assert_eq!(lines[2], "line-03 content xx");
    for (i, line) in lines.iter().enumerate() {
        if i != 2 {
            assert!(line.starts_with("[vi] "), "line {} was not translated: {}", i, line);
        }
    }
}

#[tokio::test]
async fn test_translate_withLineDroppingProvider_shouldRepairLineCount() {
    let document = numbered_document(30);
    let config = test_config_with_chunk_size(200);
    let (orchestrator, _mock) =
        orchestrator_with(MockProvider::new(MockBehavior::DropLastLines { count: 2 }), config);

    let result =
        orchestrator.translate(&document, "yaml", &credentials(2), |_, _| {}).await.unwrap();

    // Line-count invariant holds even though the model shortened every chunk
    assert_eq!(result.split('\n').count(), 30);
}

#[tokio::test]
async fn test_translate_withTokenDroppingProvider_shouldRestoreTokens() {
    let document = "welcome: \"&aHello %player%!\"\nprefix: \"{server} <rank>\"";
    let (orchestrator, _mock) =
        orchestrator_with(MockProvider::new(MockBehavior::DropTokens), test_config());

    let result =
        orchestrator.translate(document, "yaml", &credentials(1), |_, _| {}).await.unwrap();
    let lines: Vec<&str> = result.split('\n').collect();

    // Token parity: membership is guaranteed, position is not
    assert!(lines[0].contains("%player%"));
    assert!(lines[0].contains("&a"));
    assert!(lines[1].contains("{server}"));
    assert!(lines[1].contains("<rank>"));
}

#[tokio::test]
async fn test_translate_withEmptyCredentials_shouldFailFast() {
    let (orchestrator, mock) = orchestrator_with(MockProvider::prefix(), test_config());

    let result = orchestrator.translate("some text", "text", &[], |_, _| {}).await;

    assert!(matches!(result, Err(OrchestratorError::NoCredentials)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withAllCredentialsRejected_shouldFailWithAuthError() {
    let document = numbered_document(40);
    let config = test_config_with_chunk_size(150);
    let (orchestrator, _mock) = orchestrator_with(MockProvider::auth_rejected(), config);

    let result = orchestrator.translate(&document, "yaml", &credentials(2), |_, _| {}).await;

    assert!(matches!(result, Err(OrchestratorError::AllCredentialsRejected(2))));
}

#[tokio::test]
async fn test_translate_withAuthRejectionButUnusedCredential_shouldStillFallBack() {
    // One chunk, two credentials: the second credential is never exercised,
    // so the job cannot claim every credential was rejected.
    let document = "single line";
    let (orchestrator, _mock) = orchestrator_with(MockProvider::auth_rejected(), test_config());

    let result =
        orchestrator.translate(document, "text", &credentials(2), |_, _| {}).await.unwrap();
    assert_eq!(result, document);
}

#[tokio::test]
async fn test_translate_withCancelledJob_shouldReturnCancelled() {
    let document = numbered_document(80);
    let config = test_config_with_chunk_size(100);
    let (orchestrator, _mock) =
        orchestrator_with(MockProvider::new(MockBehavior::Slow { delay_ms: 500 }), config);

    let cancel = CancellationToken::new();
    let creds = credentials(2);

    let canceller = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    };
    let job = orchestrator.translate_with_cancel(&document, "yaml", &creds, |_, _| {}, &cancel);

    let (result, _) = tokio::join!(job, canceller);
    assert!(matches!(result, Err(OrchestratorError::Cancelled)));
}

#[tokio::test]
async fn test_translate_withOverlongLine_shouldRejoinWithoutLineBreaks() {
    // A single 6000-character line against a 2500-character limit
    let document = "x".repeat(6000);
    let config = test_config_with_chunk_size(2500);
    let (orchestrator, mock) = orchestrator_with(MockProvider::echo(), config);

    let result =
        orchestrator.translate(&document, "text", &credentials(1), |_, _| {}).await.unwrap();

    assert_eq!(mock.request_count(), 3);
    assert_eq!(result.split('\n').count(), 1);
    assert_eq!(result, document);
}

#[tokio::test]
async fn test_translate_shouldReportMonotonicProgress() {
    let document = numbered_document(100);
    let config = test_config_with_chunk_size(100);
    let (orchestrator, _mock) = orchestrator_with(MockProvider::prefix(), config);

    let completed_so_far = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&completed_so_far);

    orchestrator
        .translate(&document, "yaml", &credentials(3), move |completed, total| {
            assert!(completed <= total);
            // Each settled task reports a strictly larger completed count
            let previous = seen.swap(completed, Ordering::SeqCst);
            assert!(completed == 0 || completed > previous);
        })
        .await
        .unwrap();

    assert!(completed_so_far.load(Ordering::SeqCst) > 0);
}
