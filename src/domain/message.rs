use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub text: String,
    pub sender: Sender,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ChatMessage {
    pub fn user(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            is_error: false,
            image_url: None,
        }
    }

    pub fn user_image(id: i64, text: impl Into<String>, image_url: String) -> Self {
        Self {
            image_url: Some(image_url),
            ..Self::user(id, text)
        }
    }

    pub fn bot(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Bot,
            is_error: false,
            image_url: None,
        }
    }

    pub fn bot_error(id: i64, text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::bot(id, text)
        }
    }
}

/// Everything a presentation layer needs to redraw the chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnapshot {
    pub messages: Vec<ChatMessage>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl ConversationSnapshot {
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
