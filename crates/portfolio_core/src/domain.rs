//! crates/portfolio_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or transport.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Locales
//=========================================================================================

/// The closed set of display locales the site supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
    Fr,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::De, Locale::Fr];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
            Locale::Fr => "fr",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::De => "Deutsch",
            Locale::Fr => "Français",
        }
    }

    /// Resolves a BCP-47 style tag such as `de-DE` by its primary subtag.
    pub fn from_language_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?;
        primary.to_ascii_lowercase().parse().ok()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            "fr" => Ok(Locale::Fr),
            other => Err(UnsupportedLocale(other.to_string())),
        }
    }
}

//=========================================================================================
// FAQ Catalog
//=========================================================================================

/// Topical tag of a catalog entry, used to rank follow-up suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Location,
    Visa,
    Availability,
    Experience,
    Language,
    Role,
    Team,
    Salary,
}

impl Category {
    /// Categories whose entries are offered first after answering one of this category.
    pub fn related(self) -> &'static [Category] {
        use Category::*;
        match self {
            Location => &[Visa, Availability],
            Visa => &[Location, Availability],
            Availability => &[Visa, Role, Salary],
            Experience => &[Role, Language],
            Language => &[Experience, Location],
            Role => &[Experience, Salary, Team],
            Team => &[Role, Availability],
            Salary => &[Role, Availability],
        }
    }
}

/// One static question/answer record of the FAQ catalog.
///
/// `question` and `answer` are the canonical English texts and double as
/// translation lookup keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QaEntry {
    pub id: &'static str,
    pub keywords: &'static [&'static str],
    pub question: &'static str,
    pub answer: &'static str,
    pub category: Category,
}

//=========================================================================================
// Conversation
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Monotonically increasing message identifier derived from creation time (ms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical source of an assistant message's displayed text.
///
/// Persisted as a plain string: `"greeting"`, `"unknown"`, or the canonical
/// English answer of the matched entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentKey {
    Greeting,
    Unknown,
    Answer(String),
}

const GREETING_KEY: &str = "greeting";
const UNKNOWN_KEY: &str = "unknown";

impl From<String> for ContentKey {
    fn from(value: String) -> Self {
        match value.as_str() {
            GREETING_KEY => ContentKey::Greeting,
            UNKNOWN_KEY => ContentKey::Unknown,
            _ => ContentKey::Answer(value),
        }
    }
}

impl From<ContentKey> for String {
    fn from(key: ContentKey) -> Self {
        match key {
            ContentKey::Greeting => GREETING_KEY.to_string(),
            ContentKey::Unknown => UNKNOWN_KEY.to_string(),
            ContentKey::Answer(answer) => answer,
        }
    }
}

/// A follow-up question offered to the user. `id` references a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub text: String,
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_key: Option<ContentKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<Suggestion>>,
    #[serde(default)]
    pub suggestions_used: bool,
    #[serde(default)]
    pub show_contact_button: bool,
}

impl ChatMessage {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            content_key: None,
            suggestions: None,
            suggestions_used: false,
            show_contact_button: false,
        }
    }
}

/// The conversation state scoped to one browser session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub asked_question_ids: Vec<String>,
}

impl ChatSession {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_asked(&self, entry_id: &str) -> bool {
        self.asked_question_ids.iter().any(|id| id == entry_id)
    }
}

/// Visibility of the chat window. The session outlives a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Closed,
    OpenEmpty,
    OpenActive,
}

//=========================================================================================
// Narrated Intro
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// A time-ranged caption with per-word sub-ranges. Ranges are half-open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subtitle {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub words: Vec<WordTiming>,
}

/// Snapshot of the narrated media's playback state, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackClock {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub is_loaded: bool,
}
