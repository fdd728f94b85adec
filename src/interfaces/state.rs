use crate::application::ConversationService;
use crate::interfaces::http::LogEntry;
use std::sync::{Arc, Mutex};

/// Shared by every HTTP worker for the lifetime of the process.
pub struct AppState {
    pub conversation_service: Arc<ConversationService>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl AppState {
    pub fn new(conversation_service: Arc<ConversationService>) -> Self {
        Self {
            conversation_service,
            logs: Arc::new(Mutex::new(Vec::new())),
        }
    }
}
