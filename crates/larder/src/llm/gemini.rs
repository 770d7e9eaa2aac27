//! Google Gemini API invoker implementation.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LarderError, Result};
use crate::request::ImagePayload;

use super::invoker::{LlmConfig, ModelInvoker};
use super::prompts;

/// Base URL for the Gemini API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key.
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Nucleus sampling cutoff sent with every request.
const TOP_P: f64 = 0.9;

/// Google Gemini invoker using the `generateContent` endpoint.
pub struct GeminiInvoker {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl GeminiInvoker {
    /// Create a new invoker with the given API key and default
    /// configuration.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, LlmConfig::default())
    }

    /// Create a new invoker with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LarderError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|_| {
            LarderError::Config(format!(
                "{} environment variable not set",
                GEMINI_API_KEY_ENV
            ))
        })?;
        Self::new(api_key)
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            API_BASE_URL, self.config.model, self.api_key
        )
    }

    fn build_body(&self, prompt: &str, image: Option<&ImagePayload>) -> GeminiRequest {
        let mut parts = vec![RequestPart::Text {
            text: prompt.to_string(),
        }];
        if let Some(image) = image {
            parts.push(RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            });
        }

        GeminiRequest {
            system_instruction: RequestContent {
                parts: vec![RequestPart::Text {
                    text: prompts::system_prompt().to_string(),
                }],
            },
            contents: vec![RequestContent { parts }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                top_p: TOP_P,
            },
        }
    }

    /// Map a transport-level failure to the error taxonomy.
    fn map_transport_error(&self, err: &reqwest::Error) -> LarderError {
        if err.is_timeout() {
            LarderError::Timeout(self.config.timeout_secs)
        } else {
            LarderError::Unreachable(err.to_string())
        }
    }

    /// Map a non-success HTTP status to the error taxonomy.
    ///
    /// 429 is a rate limit; 5xx means the service itself is down;
    /// remaining 4xx mean the request was understood and declined, so
    /// retrying is wrong. Same bucket as a refusal.
    fn map_status_error(status: reqwest::StatusCode, body: &str) -> LarderError {
        let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .ok()
            .map_or_else(|| format!("HTTP {}", status), |e| e.error.message);

        if status.as_u16() == 429 {
            LarderError::RateLimited(message)
        } else if status.is_server_error() {
            LarderError::Unreachable(format!("HTTP {}: {}", status, message))
        } else {
            LarderError::ModelRefused(message)
        }
    }

    /// Extract completion text, mapping empty or cut-off completions to
    /// `ModelRefused`.
    fn extract_text(response: GeminiResponse) -> Result<String> {
        let candidate = response
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .ok_or_else(|| LarderError::ModelRefused("no candidates in response".to_string()))?;

        let text = candidate
            .content
            .and_then(|mut content| {
                if content.parts.is_empty() {
                    None
                } else {
                    Some(content.parts.remove(0).text)
                }
            })
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_default();
            return Err(match reason.as_str() {
                "MAX_TOKENS" => {
                    LarderError::ModelRefused("completion cut off (token limit reached)".to_string())
                }
                "SAFETY" => LarderError::ModelRefused("blocked by content policy".to_string()),
                _ => LarderError::ModelRefused("empty completion".to_string()),
            });
        }

        Ok(text)
    }
}

impl ModelInvoker for GeminiInvoker {
    fn complete(&self, prompt: &str, image: Option<&ImagePayload>) -> Result<String> {
        let body = self.build_body(prompt, image);

        // Log request shape only; prompts carry user inventory data.
        debug!(
            model = %self.config.model,
            has_image = image.is_some(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.build_url())
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "model service returned an error");
            let body = response.text().unwrap_or_default();
            return Err(Self::map_status_error(status, &body));
        }

        let parsed: GeminiResponse = response.json().map_err(|e| {
            LarderError::Unreachable(format!("invalid response envelope: {}", e))
        })?;

        let text = Self::extract_text(parsed)?;
        debug!(chars = text.len(), "received completion");
        Ok(text)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

impl Debug for GeminiInvoker {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiInvoker")
            .field("config", &self.config)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: RequestContent,
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP")]
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_includes_inline_image() {
        let invoker = GeminiInvoker::new("test-key").unwrap();
        let image = ImagePayload::from_base64("image/jpeg", "AAAA");
        let body = invoker.build_body("describe this", Some(&image));

        let json = serde_json::to_value(&body).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "describe this");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "AAAA");
        assert_eq!(json["generationConfig"]["topP"], 0.9);
    }

    #[test]
    fn test_status_mapping() {
        let rate_limited = GeminiInvoker::map_status_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"message": "quota exceeded"}}"#,
        );
        assert!(matches!(rate_limited, LarderError::RateLimited(m) if m == "quota exceeded"));

        let unreachable = GeminiInvoker::map_status_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "not json",
        );
        assert!(matches!(unreachable, LarderError::Unreachable(_)));

        let refused =
            GeminiInvoker::map_status_error(reqwest::StatusCode::BAD_REQUEST, "{}");
        assert!(matches!(refused, LarderError::ModelRefused(_)));
    }

    #[test]
    fn test_extract_text_happy_path() {
        let response = GeminiResponse {
            candidates: Some(vec![Candidate {
                content: Some(ResponseContent {
                    parts: vec![ResponsePart {
                        text: "[]".to_string(),
                    }],
                }),
                finish_reason: Some("STOP".to_string()),
            }]),
        };
        assert_eq!(GeminiInvoker::extract_text(response).unwrap(), "[]");
    }

    #[test]
    fn test_extract_text_refusals() {
        let empty = GeminiResponse { candidates: None };
        assert!(matches!(
            GeminiInvoker::extract_text(empty),
            Err(LarderError::ModelRefused(_))
        ));

        let cut_off = GeminiResponse {
            candidates: Some(vec![Candidate {
                content: None,
                finish_reason: Some("MAX_TOKENS".to_string()),
            }]),
        };
        match GeminiInvoker::extract_text(cut_off) {
            Err(LarderError::ModelRefused(message)) => {
                assert!(message.contains("token limit"))
            }
            other => panic!("expected ModelRefused, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let invoker = GeminiInvoker::new("super-secret").unwrap();
        let rendered = format!("{:?}", invoker);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
