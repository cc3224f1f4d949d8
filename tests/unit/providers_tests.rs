/*!
 * Tests for provider implementations against the common Provider trait
 */

use std::sync::Arc;
use std::time::Duration;

use lintra::providers::mock::{MockBehavior, MockProvider};
use lintra::providers::Provider;

fn chunk_prompt(body: &str) -> String {
    format!("This is chunk 1 of 1 from a larger file.\n```yaml\n{}\n```\nTranslate it.", body)
}

#[tokio::test]
async fn test_provider_trait_object_shouldDispatchToMock() {
    let provider: Arc<dyn Provider> = Arc::new(MockProvider::echo());
    assert_eq!(provider.name(), "mock");

    let response = provider
        .complete(&chunk_prompt("hello: world"), "secret", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(response.contains("hello: world"));
}

#[tokio::test]
async fn test_mock_shouldRecordPromptsAndKeys() {
    let provider = MockProvider::echo();
    let _ = provider.complete(&chunk_prompt("a"), "key-a", Duration::from_secs(1)).await;
    let _ = provider.complete(&chunk_prompt("b"), "key-b", Duration::from_secs(1)).await;

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, "key-a");
    assert_eq!(calls[1].1, "key-b");
    assert!(calls[0].0.contains("chunk 1 of 1"));
}

#[tokio::test]
async fn test_mock_inFlightGauge_shouldSeeConcurrentCalls() {
    let provider = Arc::new(MockProvider::new(MockBehavior::Slow { delay_ms: 30 }));

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move {
                provider
                    .complete(&chunk_prompt(&format!("line {}", i)), "k", Duration::from_secs(1))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(provider.request_count(), 4);
    assert!(provider.max_in_flight() >= 2);
    assert!(provider.max_in_flight() <= 4);
}

#[tokio::test]
async fn test_mock_authRejected_shouldReturnAuthError() {
    let provider = MockProvider::auth_rejected();
    let err = provider.complete("prompt", "bad", Duration::from_secs(1)).await.unwrap_err();
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_mock_customResponse_shouldOverrideEcho() {
    let provider = MockProvider::echo().with_custom_response(|_| "\"fixed output\"".to_string());
    let response = provider.complete("anything", "k", Duration::from_secs(1)).await.unwrap();
    assert_eq!(response, "\"fixed output\"");
}

#[tokio::test]
async fn test_mock_failChunk_shouldOnlyFailTargetedChunk() {
    let provider = MockProvider::new(MockBehavior::FailChunk { number: 2 });

    let first = "This is chunk 1 of 2 from a larger file.\n```yaml\none\n```";
    let second = "This is chunk 2 of 2 from a larger file.\n```yaml\ntwo\n```";

    assert!(provider.complete(&first, "k", Duration::from_secs(1)).await.is_ok());
    assert!(provider.complete(&second, "k", Duration::from_secs(1)).await.is_err());
}
