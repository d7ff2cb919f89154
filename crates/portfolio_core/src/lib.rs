pub mod catalog;
pub mod conversation;
pub mod domain;
pub mod i18n;
pub mod locale;
pub mod matching;
pub mod playback;
pub mod ports;
pub mod subtitles;

pub use conversation::{submit_user_input, ConversationManager, PendingTurn, UserInput};
pub use domain::{
    Category, ChatMessage, ChatSession, ContentKey, Locale, MessageId, PlaybackClock, QaEntry,
    Role, Subtitle, Suggestion, WindowState, WordTiming,
};
pub use locale::LocaleManager;
pub use matching::{MatchConfig, QaEngine};
pub use playback::PlaybackEngine;
pub use ports::{
    FixedTypingDelay, KeyValueStore, MediaHandle, PortError, PortResult, TickSource, TickStream,
    TypingDelay, UniformTypingDelay,
};
pub use subtitles::{CaptionFrame, SubtitleTrack};
