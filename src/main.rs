use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::ws::{self, WebSocket};
use axum::extract::{Json, State, WebSocketUpgrade};
use axum::response::{ErrorResponse, IntoResponse, Response};
use axum::routing::{any, post};
use axum::Router;
use banpick::message_bus::{Event, Message, MessageBus, UiCommand};
use banpick::{data_source, store, BanPick};
use banpick_model::{HeroId, Side};
use futures_util::StreamExt as _;
use http::StatusCode;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tower_http::services::ServeDir;

mod banpick;
mod logging;
mod utils;

use utils::unwrap_or_def_verbose;

pub fn print_err(e: &impl Display) {
    error!("{e}")
}

struct AppState {
    message_bus: MessageBus,
}

type AppStateArg = State<Arc<AppState>>;

#[derive(Serialize)]
struct EmptyResponse;

impl IntoResponse for EmptyResponse {
    fn into_response(self) -> Response {
        serde_json::to_string(&EmptyResponse)
            .unwrap()
            .into_response()
    }
}

async fn initialize_ui(State(state): AppStateArg) -> impl IntoResponse {
    debug!("initialize_ui");
    state
        .message_bus
        .send(Message::UiCommand(UiCommand::InitializeUi));
    EmptyResponse
}

fn bad_request(msg: impl Display) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, msg.to_string()).into()
}

#[derive(Debug, Deserialize)]
struct LockIn {
    hero: HeroId,
}
async fn lock_in(
    State(state): AppStateArg,
    Json(body): Json<LockIn>,
) -> axum::response::Result<()> {
    debug!("lock_in({:?})", body);
    if body.hero.as_str().trim().is_empty() {
        return Err(bad_request("Missing hero id"));
    }
    state
        .message_bus
        .send(Message::UiCommand(UiCommand::LockIn(body.hero)));
    Ok(())
}

async fn toggle_pause(State(state): AppStateArg) {
    debug!("toggle_pause()");
    state
        .message_bus
        .send(Message::UiCommand(UiCommand::TogglePause));
}

async fn undo(State(state): AppStateArg) {
    debug!("undo()");
    state.message_bus.send(Message::UiCommand(UiCommand::Undo));
}

#[derive(Debug, Deserialize)]
struct SelectAnalysisMode {
    name: String,
}
async fn select_analysis_mode(State(state): AppStateArg, Json(body): Json<SelectAnalysisMode>) {
    debug!("select_analysis_mode({:?})", body);
    state
        .message_bus
        .send(Message::UiCommand(UiCommand::SelectAnalysisMode(body.name)));
}

#[derive(Debug, Deserialize)]
struct SetBotSide {
    side: Option<Side>,
}
async fn set_bot_side(State(state): AppStateArg, Json(body): Json<SetBotSide>) {
    debug!("set_bot_side({:?})", body);
    state
        .message_bus
        .send(Message::UiCommand(UiCommand::SetBotSide(body.side)));
}

async fn create_ui_event_stream(ws: WebSocketUpgrade, State(state): AppStateArg) -> Response {
    ws.on_upgrade(move |socket| ui_event_stream(socket, state.message_bus.clone()))
}

fn wrap_result<T: Serialize, E: Display>(
    r: std::result::Result<T, E>,
) -> std::result::Result<ws::Message, axum::Error> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    enum WrappedResult<T> {
        Success(T),
        Error(String),
    }
    let wrapped_result = match r {
        Ok(data) => WrappedResult::Success(data),
        Err(e) => WrappedResult::Error(e.to_string()),
    };
    let json_text = serde_json::to_string_pretty(&wrapped_result)
        .unwrap_or_else(|e| format!("{{ \"error\": \"JSON serialization failed: {e}\" }}"));
    Ok(ws::Message::text(json_text))
}

async fn ui_event_stream(socket: WebSocket, message_bus: MessageBus) {
    debug!("ui_event_stream");
    let stream = message_bus.subscribe().ui_update_stream().map(wrap_result);
    let _ = stream.forward(socket).await.inspect_err(print_err);
}

/// One-second countdown heartbeat; pause handling lives in the worker.
fn start_timer_task(message_bus: MessageBus) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            message_bus.send(Message::Event(Event::TimerTick));
        }
    });
}

/// Fetches the advisory snapshot in the background. Failure degrades the
/// advisor; it never blocks the draft itself.
fn start_data_loader(config: banpick::config::Config, message_bus: MessageBus) {
    tokio::spawn(async move {
        let event = match data_source::load_with_configured_source(&config).await {
            Ok(data) => Event::DataLoaded(Arc::new(data)),
            Err(e) => Event::DataFailed(format!("{e:#}")),
        };
        message_bus.send(Message::Event(event));
    });
}

async fn terminate_on_signal() -> Result<()> {
    let interrupt_signal: Pin<Box<dyn Future<Output = _>>> = Box::pin(async {
        signal::unix::signal(signal::unix::SignalKind::interrupt())
            .context("Failed to register terminate signal handlers!")?
            .recv()
            .await;
        Ok(())
    });
    let terminate_signal = Box::pin(async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to register terminate signal handlers!")?
            .recv()
            .await;
        Ok(())
    });
    futures_util::future::select_all([interrupt_signal, terminate_signal])
        .await
        .0
}

#[tokio::main]
async fn main() {
    logging::init();
    let config = unwrap_or_def_verbose(store::load_config());
    let custom_modes = unwrap_or_def_verbose(store::load_custom_analysis_modes());
    let message_bus = MessageBus::new();

    let banpick = BanPick::new(config.clone(), custom_modes, message_bus.clone());
    let subscription = message_bus.subscribe();
    let worker_task = tokio::spawn(banpick.dispatch_messages(subscription, message_bus.clone()));
    start_timer_task(message_bus.clone());
    start_data_loader(config.clone(), message_bus.clone());

    let shared_state = Arc::new(AppState {
        message_bus: message_bus.clone(),
    });
    let app = Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .route("/ui_stream", any(create_ui_event_stream))
                .route("/initialize_ui", post(initialize_ui))
                .route("/lock_in", post(lock_in))
                .route("/toggle_pause", post(toggle_pause))
                .route("/undo", post(undo))
                .route("/select_analysis_mode", post(select_analysis_mode))
                .route("/set_bot_side", post(set_bot_side))
                .with_state(shared_state),
        )
        .fallback_service(ServeDir::new("ui/dist"));
    let listener = tokio::net::TcpListener::bind(&config.serving_addr)
        .await
        .expect("bind serving address");
    tokio::spawn(async { axum::serve(listener, app).await });

    info!("Running");
    let _ = terminate_on_signal().await.inspect_err(print_err);
    info!("Terminating.");
    message_bus.send(Message::UiCommand(UiCommand::CloseApplication));

    debug!("Waiting for workers to stop...");
    let _ = worker_task.await.inspect_err(print_err);
    debug!("All workers stopped.")
}
