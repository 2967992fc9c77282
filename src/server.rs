use std::any::Any;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::config::Config;
use crate::dispatch;
use crate::platform::ClientFactory;
use crate::update::Update;

#[derive(Clone)]
pub struct AppState {
    bot_token: Option<String>,
    clients: Arc<dyn ClientFactory>,
    platform: String,
}

impl AppState {
    pub fn new(config: &Config, clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            bot_token: config.telegram.token().map(str::to_string),
            clients,
            platform: config.server.platform.clone(),
        }
    }
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    platform: String,
    version: &'static str,
    message: &'static str,
    description: &'static str,
    timestamp: String,
}

/// Errors that escape a handler; all become a 500 with a JSON body.
#[derive(Debug)]
pub enum AppError {
    MissingToken,
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::MissingToken => {
                error!("Webhook called but BOT_TOKEN is not configured");
                "BOT_TOKEN not configured"
            }
            AppError::Internal(err) => {
                error!("Global error: {:#}", err);
                "Internal server error"
            }
        };
        error_response(message)
    }
}

fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Panics in a handler get the same 500 body as returned errors.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Global error: handler panicked: {}", detail);
    error_response("Internal server error")
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/webhook", post(webhook))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        platform: state.platform,
        version: env!("CARGO_PKG_VERSION"),
        message: "UserInfo Telegram Bot",
        description: "Forward any message to get user info",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn webhook(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, AppError> {
    let token = state.bot_token.as_deref().ok_or(AppError::MissingToken)?;

    let update: Update =
        serde_json::from_slice(&body).context("Failed to parse webhook update")?;
    debug!("Received update {}", update.update_id);

    let client = state.clients.create(token);
    let delivery = dispatch::handle_update(client.as_ref(), &update).await;
    debug!("Update {} handled: {:?}", update.update_id, delivery);

    Ok(StatusCode::OK)
}
