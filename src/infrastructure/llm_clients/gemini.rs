use super::{ContentPart, LLMClient};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{LLMConfig, TRANSLATION_TEMPERATURE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

impl From<ContentPart> for GeminiPart {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => GeminiPart::Text { text },
            ContentPart::InlineImage { mime_type, data } => GeminiPart::InlineData {
                inline_data: InlineData { mime_type, data },
            },
        }
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<String> {
        config
            .api_key
            .clone()
            .ok_or_else(|| AppError::LLMError("Missing API key for Google provider".to_string()))
    }

    fn endpoint(config: &LLMConfig) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let base_url = config.base_url.trim_end_matches('/');
        Ok(format!(
            "{}/{}:generateContent?key={}",
            base_url,
            config.model.trim(),
            api_key
        ))
    }

    fn generation_config(config: &LLMConfig) -> GenerationConfig {
        GenerationConfig {
            temperature: config.temperature.unwrap_or(TRANSLATION_TEMPERATURE),
            max_output_tokens: config.max_tokens,
        }
    }

    async fn send(&self, config: &LLMConfig, body: GeminiRequest) -> Result<String> {
        let url = Self::endpoint(config)?;

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        // A candidate may split its answer across several text parts.
        let text: String = json
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::LLMError("Invalid response format".to_string()));
        }
        Ok(text)
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        let system_instruction = if system.trim().is_empty() {
            None
        } else {
            Some(GeminiContent {
                parts: vec![GeminiPart::Text {
                    text: system.to_string(),
                }],
                role: None,
            })
        };

        let body = GeminiRequest {
            system_instruction,
            contents: vec![GeminiContent {
                parts: vec![GeminiPart::Text {
                    text: user.to_string(),
                }],
                role: Some("user".to_string()),
            }],
            generation_config: Some(Self::generation_config(config)),
        };

        self.send(config, body).await
    }

    async fn generate_multimodal(
        &self,
        config: &LLMConfig,
        parts: Vec<ContentPart>,
    ) -> Result<String> {
        if parts.is_empty() {
            return Err(AppError::ValidationError(
                "Multimodal request needs at least one part".to_string(),
            ));
        }

        let body = GeminiRequest {
            system_instruction: None,
            contents: vec![GeminiContent {
                parts: parts.into_iter().map(GeminiPart::from).collect(),
                role: Some("user".to_string()),
            }],
            generation_config: Some(Self::generation_config(config)),
        };

        self.send(config, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LLMConfig {
        LLMConfig::gemini(
            &format!("{}/v1beta/models", server.uri()),
            "gemini-2.5-flash",
            "test-key".to_string(),
        )
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[tokio::test]
    async fn generate_sends_system_instruction_and_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [ { "text": "rules" } ] },
                "contents": [ { "role": "user", "parts": [ { "text": "cache" } ] } ],
                "generationConfig": { "temperature": 0.2 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Bộ nhớ đệm")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new();
        let text = client
            .generate(&config_for(&server), "rules", "cache")
            .await
            .unwrap();
        assert_eq!(text, "Bộ nhớ đệm");
    }

    #[tokio::test]
    async fn multimodal_sends_inline_image_before_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(json!({
                "contents": [ { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "iVBORw0K" } },
                    { "text": "ocr" }
                ] } ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Lỗi hạt nhân")))
            .mount(&server)
            .await;

        let client = GeminiClient::new();
        let parts = vec![
            ContentPart::InlineImage {
                mime_type: "image/png".to_string(),
                data: "iVBORw0K".to_string(),
            },
            ContentPart::Text("ocr".to_string()),
        ];
        let text = client
            .generate_multimodal(&config_for(&server), parts)
            .await
            .unwrap();
        assert_eq!(text, "Lỗi hạt nhân");
    }

    #[tokio::test]
    async fn non_success_status_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = GeminiClient::new()
            .generate(&config_for(&server), "rules", "API")
            .await
            .unwrap_err();
        match err {
            AppError::LLMError(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidates_is_invalid_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = GeminiClient::new()
            .generate(&config_for(&server), "rules", "API")
            .await
            .unwrap_err();
        assert_eq!(err, AppError::LLMError("Invalid response format".to_string()));
    }

    #[tokio::test]
    async fn missing_key_fails_before_sending() {
        let config = LLMConfig::default();
        let err = GeminiClient::new()
            .generate(&config, "rules", "API")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LLMError(msg) if msg.contains("Missing API key")));
    }
}
