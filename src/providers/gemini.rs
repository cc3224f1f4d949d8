use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Gemini client for the Google Generative Language API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint base URL
    endpoint: String,
    /// Model name used for generation
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum tokens generated per request
    max_output_tokens: u32,
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// The conversation contents
    contents: Vec<GeminiContent>,

    /// Generation parameters
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

/// A single content entry of a request or response
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// The content parts
    pub parts: Vec<GeminiPart>,
}

/// One part of a content entry
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// The text payload
    pub text: String,
}

/// Generation parameters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature for generation
    temperature: f32,
    /// Top probability mass to consider (nucleus sampling)
    top_p: f32,
    /// Top k tokens to consider
    top_k: u32,
    /// Maximum number of tokens to generate
    max_output_tokens: u32,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    /// Generated candidates, first one carries the payload
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// One generated candidate
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    /// The candidate content
    pub content: GeminiContent,
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
            max_output_tokens,
        }
    }

    fn request_body(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt.to_string() }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    /// Extract the generated text from a response
    pub fn extract_text(response: &GeminiResponse) -> String {
        response
            .candidates
            .first()
            .map(|candidate| {
                candidate.content.parts.iter().map(|p| p.text.as_str()).collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for Gemini {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(
        &self,
        prompt: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        let api_url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            api_key
        );

        let response = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::RequestFailed(format!("Gemini request timed out: {}", e))
                } else {
                    ProviderError::ConnectionError(format!("Failed to reach Gemini API: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let gemini_response = response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Gemini response: {}", e)))?;

        let text = Self::extract_text(&gemini_response);
        if text.is_empty() {
            return Err(ProviderError::ParseError(
                "Gemini response contained no candidates".to_string(),
            ));
        }

        Ok(text)
    }
}
