//! services/api/src/web/playback_task.rs
//!
//! The asynchronous "worker" functions behind a playback socket: one pushes a
//! caption frame for every clock change, the other drives sampling while playing.

use crate::error::ApiError;
use crate::web::protocol::ServerMessage;
use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitSink, SinkExt};
use portfolio_core::ports::{PortError, TickSource};
use portfolio_core::{PlaybackEngine, SubtitleTrack};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Serializes `message` and sends it as a text frame.
pub async fn send_message(
    ws_sender: &WsSender,
    message: &ServerMessage,
) -> Result<(), ApiError> {
    let json = serde_json::to_string(message).map_err(PortError::from)?;
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await?;
    Ok(())
}

/// Streams a `frame` message for the current clock and then for every change,
/// until cancelled or the client goes away.
pub async fn frame_push_process(
    engine: Arc<PlaybackEngine>,
    subtitles: Arc<SubtitleTrack>,
    ws_sender: WsSender,
    cancellation_token: CancellationToken,
) -> Result<(), ApiError> {
    info!("Frame push started.");
    let mut clock = engine.subscribe();

    loop {
        let snapshot = *clock.borrow_and_update();
        send_message(&ws_sender, &ServerMessage::Frame(subtitles.frame(&snapshot))).await?;

        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Frame push cancelled.");
                return Ok(());
            }
            changed = clock.changed() => {
                if changed.is_err() {
                    debug!("Playback engine dropped.");
                    return Ok(());
                }
            }
        }
    }
}

/// Samples the media on every tick until playback stops or the socket closes.
pub async fn sampling_process(
    engine: Arc<PlaybackEngine>,
    ticks: Arc<dyn TickSource>,
    cancellation_token: CancellationToken,
) {
    tokio::select! {
        _ = cancellation_token.cancelled() => {}
        _ = engine.run_sampling(ticks.as_ref()) => {}
    }
}
