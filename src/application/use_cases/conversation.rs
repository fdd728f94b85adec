use crate::application::use_cases::image_ingestion::{
    ingest, select_clipboard_image, validate_image_type, ClipboardItem, ImageBlob,
};
use crate::application::use_cases::translate::TranslateUseCase;
use crate::domain::error::{AppError, Result};
use crate::domain::message::{ChatMessage, ConversationSnapshot};
use crate::domain::prompt::{
    image_failure_banner, text_failure_banner, GREETING, IMAGE_FAILURE_REPLY, IMAGE_REQUEST_TEXT,
    INVALID_FILE_BANNER, READ_FAILURE_BANNER, TEXT_FAILURE_REPLY,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const GREETING_ID: i64 = 1;

/// What happened to one submit action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmitOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// A translation is already in flight; nothing changed.
    Busy,
    /// Refused before any message was appended; only the banner changed.
    #[serde(rename_all = "camelCase")]
    Rejected { error: String },
    #[serde(rename_all = "camelCase")]
    Completed {
        user_message_id: i64,
        reply: ChatMessage,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    /// No image on the clipboard; the default paste action proceeds.
    NotHandled,
    /// An image was found and the default paste action is suppressed.
    Handled(SubmitOutcome),
}

/// Owns the message log, the busy flag and the error banner for one session.
///
/// The snapshot lives in a `watch` channel: subscribers see every change, and
/// `send_if_modified` gives the busy flag an atomic check-and-set.
pub struct ConversationService {
    translator: Arc<TranslateUseCase>,
    state: watch::Sender<ConversationSnapshot>,
}

/// Holds the busy flag; clears it on drop if not released explicitly.
///
/// Once a user message is on the log, `unanswered_reply` is set, and a drop
/// before release answers it with that error reply.
struct BusyGuard<'a> {
    state: &'a watch::Sender<ConversationSnapshot>,
    released: bool,
    unanswered_reply: Option<&'static str>,
}

impl BusyGuard<'_> {
    fn awaiting_reply(&mut self, failure_reply: &'static str) {
        self.unanswered_reply = Some(failure_reply);
    }

    /// Applies the final update and clears the flag in one step.
    fn release_with(mut self, update: impl FnOnce(&mut ConversationSnapshot)) {
        self.released = true;
        self.state.send_modify(|snapshot| {
            update(snapshot);
            snapshot.is_loading = false;
        });
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let unanswered = self.unanswered_reply.take();
        if unanswered.is_some() {
            warn!("Translation abandoned before completion");
        }
        self.state.send_modify(|snapshot| {
            if let Some(reply) = unanswered {
                push_message(snapshot, |id| ChatMessage::bot_error(id, reply));
            }
            snapshot.is_loading = false;
        });
    }
}

/// Millisecond clock id, bumped past the last message so ids never collide.
fn next_id(snapshot: &ConversationSnapshot) -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    match snapshot.last_message() {
        Some(last) => now.max(last.id + 1),
        None => now,
    }
}

fn push_message(
    snapshot: &mut ConversationSnapshot,
    build: impl FnOnce(i64) -> ChatMessage,
) -> ChatMessage {
    let message = build(next_id(snapshot));
    snapshot.messages.push(message.clone());
    message
}

impl ConversationService {
    pub fn new(translator: Arc<TranslateUseCase>) -> Self {
        let initial = ConversationSnapshot {
            messages: vec![ChatMessage::bot(GREETING_ID, GREETING)],
            is_loading: false,
            error: None,
        };
        let (state, _) = watch::channel(initial);
        Self { translator, state }
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Enters `Pending` if idle: sets busy, clears the banner, then runs `on_enter`.
    fn try_begin(
        &self,
        on_enter: impl FnOnce(&mut ConversationSnapshot),
    ) -> Option<BusyGuard<'_>> {
        let entered = self.state.send_if_modified(|snapshot| {
            if snapshot.is_loading {
                return false;
            }
            snapshot.is_loading = true;
            snapshot.error = None;
            on_enter(snapshot);
            true
        });

        entered.then(|| BusyGuard {
            state: &self.state,
            released: false,
            unanswered_reply: None,
        })
    }

    /// Sets the banner unless a request is in flight. Returns false when busy.
    fn set_banner_if_idle(&self, banner: &str) -> bool {
        self.state.send_if_modified(|snapshot| {
            if snapshot.is_loading {
                return false;
            }
            snapshot.error = Some(banner.to_string());
            true
        })
    }

    pub async fn submit_text(&self, input: &str) -> SubmitOutcome {
        if input.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let mut user_message_id = 0;
        let Some(mut guard) = self.try_begin(|snapshot| {
            user_message_id = push_message(snapshot, |id| ChatMessage::user(id, input)).id;
        }) else {
            debug!("Text submit dropped while a translation is pending");
            return SubmitOutcome::Busy;
        };
        guard.awaiting_reply(TEXT_FAILURE_REPLY);

        info!(user_message_id, "Translating text term");
        let result = self.translator.translate_text(input).await;
        let reply = self.finish(guard, result, TEXT_FAILURE_REPLY, text_failure_banner);

        SubmitOutcome::Completed {
            user_message_id,
            reply,
        }
    }

    pub async fn submit_image(&self, blob: ImageBlob) -> SubmitOutcome {
        if self.is_busy() {
            debug!("Image submit dropped while a translation is pending");
            return SubmitOutcome::Busy;
        }

        if let Err(err) = validate_image_type(&blob.content_type) {
            warn!(error = %err, "Rejected non-image file");
            if !self.set_banner_if_idle(INVALID_FILE_BANNER) {
                return SubmitOutcome::Busy;
            }
            return SubmitOutcome::Rejected {
                error: err.to_string(),
            };
        }

        let Some(mut guard) = self.try_begin(|_| {}) else {
            debug!("Image submit dropped while a translation is pending");
            return SubmitOutcome::Busy;
        };

        // A malformed data URL continues as a failed translation below.
        let ingested = match ingest(&blob).await {
            Err(err @ AppError::ReadError(_)) => {
                warn!(error = %err, "Failed to read image blob");
                guard.release_with(|snapshot| {
                    snapshot.error = Some(READ_FAILURE_BANNER.to_string());
                });
                return SubmitOutcome::Rejected {
                    error: err.to_string(),
                };
            }
            other => other,
        };

        let preview_url = ingested.as_ref().ok().map(|image| image.preview_url.clone());
        let mut user_message_id = 0;
        self.state.send_modify(|snapshot| {
            user_message_id = push_message(snapshot, |id| ChatMessage {
                image_url: preview_url,
                ..ChatMessage::user(id, IMAGE_REQUEST_TEXT)
            })
            .id;
        });
        guard.awaiting_reply(IMAGE_FAILURE_REPLY);

        info!(user_message_id, content_type = %blob.content_type, "Translating term from image");
        let result = match ingested {
            Ok(image) => {
                self.translator
                    .translate_image(&image.mime_type, &image.base64_payload)
                    .await
            }
            Err(err) => Err(err),
        };
        let reply = self.finish(guard, result, IMAGE_FAILURE_REPLY, image_failure_banner);

        SubmitOutcome::Completed {
            user_message_id,
            reply,
        }
    }

    /// Routes a clipboard paste; the busy guard in `submit_image` applies to every paste.
    pub async fn handle_paste(&self, items: Vec<ClipboardItem>) -> PasteOutcome {
        match select_clipboard_image(items) {
            Some(blob) => PasteOutcome::Handled(self.submit_image(blob).await),
            None => PasteOutcome::NotHandled,
        }
    }

    /// Appends the bot reply (or failure notice and banner) and leaves `Pending`.
    fn finish(
        &self,
        guard: BusyGuard<'_>,
        result: Result<String>,
        failure_reply: &str,
        failure_banner: fn(&str) -> String,
    ) -> ChatMessage {
        let mut reply = None;
        match result {
            Ok(text) => guard.release_with(|snapshot| {
                reply = Some(push_message(snapshot, |id| ChatMessage::bot(id, text)));
            }),
            Err(err) => {
                warn!(error = %err, "Translation failed");
                let banner = failure_banner(err.message());
                guard.release_with(|snapshot| {
                    reply = Some(push_message(snapshot, |id| {
                        ChatMessage::bot_error(id, failure_reply)
                    }));
                    snapshot.error = Some(banner);
                });
            }
        }

        // release_with always runs the update closure.
        reply.unwrap_or_else(|| ChatMessage::bot_error(0, failure_reply))
    }
}
