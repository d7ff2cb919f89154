pub mod middleware;
pub mod playback_task;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the handlers so the binary can build the router from one place.
pub use middleware::require_visitor;
pub use rest::{
    close_chat_handler, get_chat_handler, list_locales_handler, open_chat_handler,
    send_message_handler, set_locale_handler,
};
pub use ws_handler::playback_ws_handler;
