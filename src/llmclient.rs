use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const SERVICE_LABEL: &str = "Gemini";

/// A text-in, text-out generative model.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Author name shown on the service's chat bubbles.
    fn label(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            model,
            base_url: BASE_URL.to_string(),
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    fn label(&self) -> &str {
        SERVICE_LABEL
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("GOOGLE_API_KEY is not configured"))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = self.generate_url();
        tracing::info!(model = %self.model, chars = prompt.len(), "sending prompt");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "No error message".to_string());
            return Err(map_http_error(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| anyhow!("Gemini returned no text in the response candidates"))
}

fn map_http_error(status: StatusCode, body: &str) -> anyhow::Error {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            match wrapper.error.status {
                Some(status_text) if !status_text.is_empty() => format!("{}: {}", status_text, msg),
                _ => msg,
            }
        })
        .unwrap_or_else(|_| body.to_string());

    anyhow!("Server returned error {}: {}", status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn request_body_matches_api_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: "Hello".to_string(),
                }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "Hello"}]}]})
        );
    }

    #[test]
    fn extracts_first_text_part() {
        let response = parse(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Hi there"}, {"text": "ignored"}]}}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "Hi there");
    }

    #[test]
    fn missing_text_is_an_error() {
        let blocked = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert!(extract_text(blocked).is_err());

        let empty = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#);
        let err = extract_text(empty).unwrap_err();
        assert!(err.to_string().contains("no text"));
    }

    #[test]
    fn http_error_uses_api_message() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body);
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("RESOURCE_EXHAUSTED: Quota exceeded"));
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().ends_with("upstream down"));
    }

    #[test]
    fn url_includes_model() {
        let client = GeminiClient::new(None, "gemini-2.5-pro".to_string(), Duration::from_secs(1));
        assert_eq!(
            client.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = GeminiClient::new(None, "gemini-2.5-pro".to_string(), Duration::from_secs(1));
        let err = client.generate("Hello").await.unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }
}
