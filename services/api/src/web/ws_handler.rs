//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a playback WebSocket.
//! Each socket owns one playback engine over the narrated intro.

use crate::{
    adapters::NarrationTrack,
    web::{
        playback_task::{frame_push_process, sampling_process, send_message, WsSender},
        protocol::{ClientMessage, ServerMessage},
        state::AppState,
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::StreamExt;
use portfolio_core::PlaybackEngine;
use serde::Deserialize;
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct PlaybackParams {
    /// Try to start playing as soon as the narration is loaded.
    #[serde(default)]
    pub autoplay: bool,
}

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn playback_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<PlaybackParams>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, params.autoplay))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, autoplay: bool) {
    info!("New playback connection established.");

    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // --- 1. Load the narration ---
    let media = Arc::new(NarrationTrack::new(&app_state.config.narration_path));
    let engine = Arc::new(PlaybackEngine::initialize(media, autoplay).await);
    let clock = engine.snapshot();
    let greeting = if clock.is_loaded {
        ServerMessage::Ready {
            duration: clock.duration,
        }
    } else {
        ServerMessage::Error {
            message: "The narration could not be loaded.".to_string(),
        }
    };
    if let Err(e) = send_message(&ws_sender, &greeting).await {
        error!("Failed to greet playback client: {:?}", e);
        return;
    }

    // --- 2. Start pushing frames ---
    let cancellation_token = CancellationToken::new();
    let push_task = {
        let engine = engine.clone();
        let subtitles = app_state.subtitles.clone();
        let ws_sender = ws_sender.clone();
        let token = cancellation_token.clone();
        tokio::spawn(async move {
            if let Err(e) = frame_push_process(engine, subtitles, ws_sender, token).await {
                error!("Frame push failed: {:?}", e);
            }
        })
    };

    let mut sampling_task: Option<JoinHandle<()>> = None;
    restart_sampling(&app_state, &engine, &cancellation_token, &mut sampling_task);

    // --- 3. Main Message Loop ---
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_text_message(text.as_str(), &engine);
                restart_sampling(&app_state, &engine, &cancellation_token, &mut sampling_task);
            }
            Ok(Message::Close(_)) => {
                info!("Client sent close message.");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Playback socket error: {}", e);
                break;
            }
        }
    }

    // --- 4. Cleanup ---
    cancellation_token.cancel();
    engine.pause();
    if let Some(handle) = sampling_task {
        handle.abort();
    }
    if let Err(e) = push_task.await {
        error!("Frame push task panicked: {:?}", e);
    }
    info!("Playback connection closed.");
}

/// Replaces the sampling task so that exactly one runs while the engine plays.
fn restart_sampling(
    app_state: &Arc<AppState>,
    engine: &Arc<PlaybackEngine>,
    cancellation_token: &CancellationToken,
    sampling_task: &mut Option<JoinHandle<()>>,
) {
    if let Some(task) = sampling_task.take() {
        task.abort();
    }
    if !engine.snapshot().is_playing {
        return;
    }
    let engine = engine.clone();
    let ticks = app_state.ticks.clone();
    let token = cancellation_token.clone();
    *sampling_task = Some(tokio::spawn(sampling_process(engine, ticks, token)));
}

/// Helper function to handle the logic for different `ClientMessage` variants.
///
/// A rejected play leaves the engine paused; the client keeps its play control.
fn handle_text_message(text: &str, engine: &PlaybackEngine) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Play) => {
            engine.play();
        }
        Ok(ClientMessage::Pause) => engine.pause(),
        Ok(ClientMessage::Toggle) => {
            engine.toggle();
        }
        Ok(ClientMessage::Seek { time }) => engine.seek(time),
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
        }
    }
}
