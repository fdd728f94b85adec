use crate::application::use_cases::image_ingestion::{ClipboardItem, ImageBlob};
use crate::application::{PasteOutcome, SubmitOutcome};
use crate::domain::message::ConversationSnapshot;
use crate::interfaces::state::AppState;
use actix_cors::Cors;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{
    dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

/// Screenshots are sent whole; the default 256 KiB payload cap is too small.
const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;
const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct ClipboardItemPayload {
    pub kind: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Base64 of the item bytes, present for file items.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Deserialize)]
pub struct PasteRequest {
    pub items: Vec<ClipboardItemPayload>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
    pub snapshot: ConversationSnapshot,
}

#[derive(Serialize)]
pub struct PasteResponse {
    /// True when the caller must suppress the default paste action.
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubmitOutcome>,
    pub snapshot: ConversationSnapshot,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ClipboardItemPayload {
    fn decode(self) -> Result<ClipboardItem, String> {
        let data = match self.data {
            Some(encoded) => Some(
                STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| format!("Clipboard item '{}' is not base64: {}", self.mime_type, e))?,
            ),
            None => None,
        };

        Ok(ClipboardItem {
            kind: self.kind,
            mime_type: self.mime_type,
            data,
        })
    }
}

fn log_outcome(logs: &Mutex<Vec<LogEntry>>, action: &str, outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Ignored => add_log(logs, "INFO", "Chat", &format!("{action}: blank input ignored")),
        SubmitOutcome::Busy => add_log(
            logs,
            "WARN",
            "Chat",
            &format!("{action}: dropped, a translation is pending"),
        ),
        SubmitOutcome::Rejected { error } => {
            add_log(logs, "WARN", "Chat", &format!("{action}: rejected ({error})"))
        }
        SubmitOutcome::Completed { reply, .. } if reply.is_error => add_log(
            logs,
            "ERROR",
            "Chat",
            &format!("{action}: translation failed"),
        ),
        SubmitOutcome::Completed { .. } => {
            add_log(logs, "INFO", "Chat", &format!("{action}: translated"))
        }
    }
}

#[get("/conversation")]
async fn get_conversation(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.conversation_service.snapshot())
}

#[get("/conversation/events")]
async fn conversation_events(data: web::Data<AppState>) -> impl Responder {
    add_log(&data.logs, "INFO", "HttpApi", "Conversation subscriber connected");

    let stream = WatchStream::new(data.conversation_service.subscribe()).map(|snapshot| {
        let payload = serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string());
        Ok::<_, actix_web::Error>(web::Bytes::from(format!("data: {}\n\n", payload)))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(stream)
}

#[post("/messages")]
async fn send_message(
    data: web::Data<AppState>,
    req: web::Json<SendMessageRequest>,
) -> impl Responder {
    let outcome = data.conversation_service.submit_text(&req.text).await;
    log_outcome(&data.logs, "Text submit", &outcome);

    HttpResponse::Ok().json(SubmitResponse {
        outcome,
        snapshot: data.conversation_service.snapshot(),
    })
}

#[post("/images")]
async fn upload_image(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Image upload ({}, {} bytes)", content_type, body.len()),
    );

    let blob = ImageBlob::from_bytes(content_type, body.to_vec());
    let outcome = data.conversation_service.submit_image(blob).await;
    log_outcome(&data.logs, "Image submit", &outcome);

    HttpResponse::Ok().json(SubmitResponse {
        outcome,
        snapshot: data.conversation_service.snapshot(),
    })
}

#[post("/paste")]
async fn paste(data: web::Data<AppState>, req: web::Json<PasteRequest>) -> impl Responder {
    let items: Result<Vec<ClipboardItem>, String> = req
        .into_inner()
        .items
        .into_iter()
        .map(ClipboardItemPayload::decode)
        .collect();

    let items = match items {
        Ok(items) => items,
        Err(error) => {
            add_log(&data.logs, "ERROR", "HttpApi", &error);
            return HttpResponse::BadRequest().json(ErrorBody { error });
        }
    };

    let (handled, outcome) = match data.conversation_service.handle_paste(items).await {
        PasteOutcome::NotHandled => (false, None),
        PasteOutcome::Handled(outcome) => {
            log_outcome(&data.logs, "Paste", &outcome);
            (true, Some(outcome))
        }
    };

    HttpResponse::Ok().json(PasteResponse {
        handled,
        outcome,
        snapshot: data.conversation_service.snapshot(),
    })
}

#[get("/logs")]
async fn get_logs(data: web::Data<AppState>) -> impl Responder {
    let logs = data
        .logs
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    match level {
        "ERROR" => tracing::error!(source, "{}", message),
        "WARN" => tracing::warn!(source, "{}", message),
        _ => tracing::info!(source, "{}", message),
    }
    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_IMAGE_BYTES))
        .app_data(web::JsonConfig::default().limit(MAX_IMAGE_BYTES * 2))
        .service(
            web::scope("/api")
                .service(get_conversation)
                .service(conversation_events)
                .service(send_message)
                .service(upload_image)
                .service(paste)
                .service(get_logs),
        );
}

pub fn start_server(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::from(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Browser UI may be served from another origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}
