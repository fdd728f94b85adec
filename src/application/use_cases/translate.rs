use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::prompt::{OCR_TRANSLATE_PROMPT, TRANSLATION_SYSTEM_INSTRUCTION};
use crate::infrastructure::llm_clients::{ContentPart, LLMClient};
use crate::infrastructure::response::clean_llm_response;
use std::sync::Arc;
use tracing::{debug, error};

/// Sends terms and screenshots to the model and returns the Vietnamese translation.
pub struct TranslateUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl TranslateUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    pub async fn translate_text(&self, term: &str) -> Result<String> {
        debug!(model = %self.config.model, chars = term.chars().count(), "Translating term");

        let raw = self
            .llm_client
            .generate(&self.config, TRANSLATION_SYSTEM_INSTRUCTION, term)
            .await
            .map_err(|err| {
                error!(error = %err, "Error calling Gemini API");
                AppError::LLMError(format!(
                    "Failed to get translation from Gemini API: {}",
                    err.message()
                ))
            })?;

        Ok(clean_llm_response(&raw))
    }

    pub async fn translate_image(&self, mime_type: &str, base64_payload: &str) -> Result<String> {
        debug!(
            model = %self.config.model,
            mime_type,
            payload_len = base64_payload.len(),
            "Translating term from image"
        );

        let parts = vec![
            ContentPart::InlineImage {
                mime_type: mime_type.to_string(),
                data: base64_payload.to_string(),
            },
            ContentPart::Text(OCR_TRANSLATE_PROMPT.to_string()),
        ];

        let raw = self
            .llm_client
            .generate_multimodal(&self.config, parts)
            .await
            .map_err(|err| {
                error!(error = %err, "Error calling Gemini API for image translation");
                AppError::LLMError(format!(
                    "Failed to get translation from image via Gemini API: {}",
                    err.message()
                ))
            })?;

        Ok(clean_llm_response(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prompt::NO_TERM_IN_IMAGE;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and answers with a canned reply.
    struct RecordingLlm {
        reply: Result<String>,
        calls: Mutex<Vec<(String, Vec<ContentPart>, Option<f64>)>>,
    }

    impl RecordingLlm {
        fn answering(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(AppError::LLMError(message.to_string())),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMClient for RecordingLlm {
        async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
            self.calls.lock().unwrap().push((
                system.to_string(),
                vec![ContentPart::Text(user.to_string())],
                config.temperature,
            ));
            self.reply.clone()
        }

        async fn generate_multimodal(
            &self,
            config: &LLMConfig,
            parts: Vec<ContentPart>,
        ) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((String::new(), parts, config.temperature));
            self.reply.clone()
        }
    }

    fn use_case(llm: Arc<RecordingLlm>) -> TranslateUseCase {
        TranslateUseCase::new(llm, LLMConfig::gemini("http://unused", "gemini-2.5-flash", "k".into()))
    }

    #[tokio::test]
    async fn text_uses_system_instruction_and_low_temperature() {
        let llm = Arc::new(RecordingLlm::answering("  API \n"));
        let result = use_case(llm.clone()).translate_text("API").await.unwrap();

        assert_eq!(result, "API");
        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, TRANSLATION_SYSTEM_INSTRUCTION);
        assert_eq!(calls[0].1, vec![ContentPart::Text("API".to_string())]);
        assert_eq!(calls[0].2, Some(0.2));
    }

    #[tokio::test]
    async fn thinking_blocks_never_reach_the_reply() {
        let llm = Arc::new(RecordingLlm::answering(
            "<think>user wants the Vietnamese term</think>\n Bộ nhớ đệm ",
        ));
        let result = use_case(llm).translate_text("cache").await.unwrap();
        assert_eq!(result, "Bộ nhớ đệm");
    }

    #[tokio::test]
    async fn image_sends_inline_data_then_prompt() {
        let llm = Arc::new(RecordingLlm::answering(NO_TERM_IN_IMAGE));
        let result = use_case(llm.clone())
            .translate_image("image/png", "iVBORw0K")
            .await
            .unwrap();

        assert_eq!(result, NO_TERM_IN_IMAGE);
        let calls = llm.calls.lock().unwrap();
        assert_eq!(
            calls[0].1,
            vec![
                ContentPart::InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "iVBORw0K".to_string(),
                },
                ContentPart::Text(OCR_TRANSLATE_PROMPT.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn failures_are_wrapped_once_without_retry() {
        let llm = Arc::new(RecordingLlm::failing("Request failed: connection reset"));
        let err = use_case(llm.clone()).translate_text("cache").await.unwrap_err();

        assert_eq!(llm.calls.lock().unwrap().len(), 1);
        match err {
            AppError::LLMError(msg) => {
                assert!(msg.starts_with("Failed to get translation from Gemini API"));
                assert!(msg.contains("connection reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
