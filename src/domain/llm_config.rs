use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
/// Low temperature keeps terminology choices deterministic.
pub const TRANSLATION_TEMPERATURE: f64 = 0.2;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum LLMProvider {
    Google,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl LLMConfig {
    pub fn gemini(base_url: &str, model: &str, api_key: String) -> Self {
        Self {
            provider: LLMProvider::Google,
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: Some(api_key),
            max_tokens: None,
            temperature: Some(TRANSLATION_TEMPERATURE),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Google,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: None,
            max_tokens: None,
            temperature: Some(TRANSLATION_TEMPERATURE),
        }
    }
}
