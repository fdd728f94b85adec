pub mod gemini;

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiClient;

/// One piece of a multimodal request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentPart {
    Text(String),
    InlineImage { mime_type: String, data: String },
}

#[async_trait]
pub trait LLMClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;
    async fn generate_multimodal(&self, config: &LLMConfig, parts: Vec<ContentPart>)
        -> Result<String>;
}
