use std::sync::Arc;

use tracing::{error, info};

use crate::application::{ConversationService, TranslateUseCase};
use crate::domain::error::Result;
use crate::infrastructure::config::{AppConfig, ConfigService};
use crate::infrastructure::llm_clients::{GeminiClient, LLMClient};
use crate::interfaces::http::add_log;
use crate::interfaces::state::AppState;

/// Builds the process-wide services once. Fails when no API credential is available.
pub fn setup(config: AppConfig) -> Result<Arc<AppState>> {
    let config_service = ConfigService::new(config);

    let llm_config = config_service.llm_config().map_err(|err| {
        error!(error = %err, "API credential missing; refusing to start the translation client");
        err
    })?;

    let timeout = config_service.config().request_timeout();
    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(GeminiClient::with_timeout(timeout));
    let model = llm_config.model.clone();

    let translate_use_case = Arc::new(TranslateUseCase::new(llm_client, llm_config));
    let conversation_service = Arc::new(ConversationService::new(translate_use_case));

    let state = Arc::new(AppState::new(conversation_service));

    info!(model = %model, timeout_secs = timeout.as_secs(), "Translation client ready");
    add_log(
        &state.logs,
        "INFO",
        "System",
        &format!("Backend initialized with model {}", model),
    );

    Ok(state)
}
