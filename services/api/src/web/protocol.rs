//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the narrated intro player.

use portfolio_core::CaptionFrame;
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Player controls a client can send.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Play,
    Pause,
    Toggle,
    /// Jump to `time` seconds; clamped to the narration's bounds.
    Seek { time: f64 },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The narration is loaded and controls are live.
    Ready { duration: f64 },

    /// The player's state after a change; sent for every clock update.
    Frame(CaptionFrame),

    /// Reports an error to the client, which should display an error message.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_controls() {
        let seek: ClientMessage = serde_json::from_str(r#"{"type":"seek","time":12.5}"#).unwrap();
        assert_eq!(seek, ClientMessage::Seek { time: 12.5 });
        let toggle: ClientMessage = serde_json::from_str(r#"{"type":"toggle"}"#).unwrap();
        assert_eq!(toggle, ClientMessage::Toggle);
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"rewind"}"#).is_err());
    }

    #[test]
    fn frame_is_flattened_under_its_tag() {
        let frame = CaptionFrame {
            current_time: 0.3,
            duration: 76.0,
            is_playing: true,
            is_loaded: true,
            progress: 0.3 / 76.0 * 100.0,
            subtitle_id: Some(1),
            text: Some("Hi".into()),
            words: Some(vec!["Hi".into()]),
            active_word_index: Some(0),
        };
        let value = serde_json::to_value(ServerMessage::Frame(frame)).unwrap();
        assert_eq!(value["type"], "frame");
        assert_eq!(value["subtitleId"], 1);
        assert_eq!(value["activeWordIndex"], 0);
    }
}
