/*!
 * Tests for short ad-hoc translation
 */

use std::sync::Arc;

use lintra::errors::OrchestratorError;
use lintra::providers::mock::MockProvider;
use lintra::translation::Orchestrator;

use crate::common::{credentials, test_config};

#[tokio::test]
async fn test_translate_short_shouldStripWrappingQuotes() {
    let provider = MockProvider::echo().with_custom_response(|_| "\"Xin chào\"\n".to_string());
    let orchestrator = Orchestrator::with_provider(Arc::new(provider), test_config());

    let result = orchestrator.translate_short("Hello", &credentials(2)).await.unwrap();
    assert_eq!(result, "Xin chào");
}

#[tokio::test]
async fn test_translate_short_withStylizedText_shouldAskForFontPreservation() {
    let provider = MockProvider::echo().with_custom_response(|_| "ᴄʜàᴏ".to_string());
    let shared = provider.clone();
    let orchestrator = Orchestrator::with_provider(Arc::new(provider), test_config());

    let result = orchestrator.translate_short("ᴡᴇʟᴄᴏᴍᴇ", &credentials(1)).await.unwrap();
    assert_eq!(result, "ᴄʜàᴏ");

    let calls = shared.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.contains("special font"));
}

#[tokio::test]
async fn test_translate_short_withFailingProvider_shouldPropagateAfterRetries() {
    let provider = MockProvider::failing();
    let shared = provider.clone();
    let orchestrator = Orchestrator::with_provider(Arc::new(provider), test_config());

    let result = orchestrator.translate_short("Hello", &credentials(1)).await;

    // Unlike document chunks, short text has no fallback to the original
    assert!(matches!(result, Err(OrchestratorError::Provider(_))));
    assert_eq!(shared.request_count(), 4);
}

#[tokio::test]
async fn test_translate_short_withEmptyCredentials_shouldFailFast() {
    let orchestrator =
        Orchestrator::with_provider(Arc::new(MockProvider::echo()), test_config());
    let result = orchestrator.translate_short("Hello", &[]).await;
    assert!(matches!(result, Err(OrchestratorError::NoCredentials)));
}

#[tokio::test]
async fn test_translate_short_shouldUseFirstCredential() {
    let provider = MockProvider::echo().with_custom_response(|_| "ok".to_string());
    let shared = provider.clone();
    let orchestrator = Orchestrator::with_provider(Arc::new(provider), test_config());

    let creds = credentials(3);
    let _ = orchestrator.translate_short("Hello", &creds).await.unwrap();

    let calls = shared.calls();
    assert_eq!(calls[0].1, creds[0].api_key);
}
