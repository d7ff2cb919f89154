//! crates/portfolio_core/src/conversation.rs
//!
//! The chat session of one browser session: ordered messages, the answered
//! entry ids, persistence after every mutation, and re-projection of already
//! written assistant messages into another locale.

use crate::domain::{
    ChatMessage, ChatSession, ContentKey, Locale, MessageId, QaEntry, Role, WindowState,
};
use crate::i18n;
use crate::matching::QaEngine;
use crate::ports::{KeyValueStore, TypingDelay};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Fixed key of the serialized session inside the session-scoped store.
pub const SESSION_KEY: &str = "chatbot-session";

/// A message submitted by the user, typed or picked from a suggestion list.
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub text: String,
    /// Catalog entry behind a clicked suggestion; bypasses free-text scoring.
    pub suggestion_id: Option<String>,
    /// Message whose suggestion list the click came from.
    pub origin_message_id: Option<MessageId>,
}

impl UserInput {
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn suggestion(
        text: impl Into<String>,
        suggestion_id: impl Into<String>,
        origin_message_id: MessageId,
    ) -> Self {
        Self {
            text: text.into(),
            suggestion_id: Some(suggestion_id.into()),
            origin_message_id: Some(origin_message_id),
        }
    }
}

/// A user turn that has been recorded and is waiting for its reply.
#[derive(Debug)]
pub struct PendingTurn {
    text: String,
    suggestion_id: Option<String>,
}

pub struct ConversationManager {
    engine: Arc<QaEngine>,
    store: Arc<dyn KeyValueStore>,
    locale: Locale,
    open: bool,
    pending_replies: usize,
    last_message_id: i64,
    session: watch::Sender<ChatSession>,
}

impl ConversationManager {
    /// Restores the session from the session-scoped store. Absent or
    /// malformed state yields an empty session.
    pub fn mount(engine: Arc<QaEngine>, store: Arc<dyn KeyValueStore>, locale: Locale) -> Self {
        let session = restore(store.as_ref());
        let last_message_id = session.messages.iter().map(|m| m.id.0).max().unwrap_or(0);
        debug!(
            messages = session.messages.len(),
            asked = session.asked_question_ids.len(),
            "Chat session mounted."
        );

        let (session, _) = watch::channel(session);
        Self {
            engine,
            store,
            locale,
            open: false,
            pending_replies: 0,
            last_message_id,
            session,
        }
    }

    pub fn snapshot(&self) -> ChatSession {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSession> {
        self.session.subscribe()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    pub fn window_state(&self) -> WindowState {
        if !self.open {
            WindowState::Closed
        } else if self.session.borrow().is_empty() {
            WindowState::OpenEmpty
        } else {
            WindowState::OpenActive
        }
    }

    /// Shows the chat window, greeting the user if nothing was said yet.
    pub fn open_session(&mut self) {
        self.open = true;
        if !self.session.borrow().is_empty() {
            return;
        }

        let suggestions = self.engine.suggest_follow_ups(
            None,
            &[],
            self.locale,
            self.engine.config().suggestion_count,
        );
        let greeting = ChatMessage {
            id: self.next_message_id(),
            role: Role::Assistant,
            content: i18n::greeting(self.locale).to_string(),
            content_key: Some(ContentKey::Greeting),
            suggestions: Some(suggestions),
            suggestions_used: false,
            show_contact_button: false,
        };
        info!(locale = %self.locale, "Greeting synthesized.");
        self.mutate(|session| session.messages.push(greeting));
    }

    /// Hides the window. The session itself is kept.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Records the user's turn and enters the typing state. Blank input is
    /// ignored.
    pub fn begin_turn(&mut self, input: UserInput) -> Option<PendingTurn> {
        let text = input.text.trim().to_string();
        if text.is_empty() {
            debug!("Ignoring blank chat input.");
            return None;
        }

        let user_message = ChatMessage::user(self.next_message_id(), text.clone());
        self.mutate(|session| {
            if let Some(origin) = input.origin_message_id {
                if let Some(message) = session.messages.iter_mut().find(|m| m.id == origin) {
                    message.suggestions_used = true;
                }
            }
            session.messages.push(user_message);
        });
        self.pending_replies += 1;

        Some(PendingTurn {
            text,
            suggestion_id: input.suggestion_id,
        })
    }

    /// Resolves the reply to a pending turn in the locale current right now
    /// and appends it.
    pub fn complete_turn(&mut self, turn: PendingTurn) -> ChatMessage {
        let matched = match turn.suggestion_id.as_deref() {
            Some(id) => self.engine.lookup_by_id(id),
            None => self.engine.score_and_match(&turn.text),
        };

        let reply = match matched {
            Some(entry) => self.answer_message(entry),
            None => self.unknown_message(),
        };
        info!(
            matched = matched.map(|e| e.id),
            locale = %self.locale,
            "Assistant reply ready."
        );

        let appended = reply.clone();
        self.mutate(|session| {
            if let Some(entry) = matched {
                if !session.has_asked(entry.id) {
                    session.asked_question_ids.push(entry.id.to_string());
                }
            }
            session.messages.push(appended);
        });
        self.pending_replies = self.pending_replies.saturating_sub(1);
        reply
    }

    /// Re-renders every assistant message in `locale`. Identity, order and
    /// the asked ids are untouched; suggestion lists already used stay as they are.
    pub fn change_locale(&mut self, locale: Locale) {
        self.locale = locale;
        let engine = self.engine.clone();
        self.mutate(|session| {
            for message in &mut session.messages {
                if message.role != Role::Assistant {
                    continue;
                }
                match &message.content_key {
                    Some(ContentKey::Greeting) => {
                        message.content = i18n::greeting(locale).to_string();
                    }
                    Some(ContentKey::Unknown) => {
                        message.content = i18n::unknown_response(locale).to_string();
                    }
                    Some(ContentKey::Answer(answer)) if !answer.is_empty() => {
                        message.content = engine.translate_answer(answer, locale).to_string();
                    }
                    _ => {}
                }

                if message.suggestions_used {
                    continue;
                }
                for suggestion in message.suggestions.iter_mut().flatten() {
                    if let Some(entry) = engine.lookup_by_id(&suggestion.id) {
                        suggestion.text = engine.translate_question(entry.question, locale).to_string();
                    }
                }
            }
        });
        debug!(%locale, "Chat re-rendered.");
    }

    fn answer_message(&mut self, entry: &'static QaEntry) -> ChatMessage {
        let mut asked = self.session.borrow().asked_question_ids.clone();
        if !asked.iter().any(|id| id == entry.id) {
            asked.push(entry.id.to_string());
        }
        let suggestions = self.engine.suggest_follow_ups(
            Some(entry.id),
            &asked,
            self.locale,
            self.engine.config().suggestion_count,
        );

        ChatMessage {
            id: self.next_message_id(),
            role: Role::Assistant,
            content: self.engine.translate_answer(entry.answer, self.locale).to_string(),
            content_key: Some(ContentKey::Answer(entry.answer.to_string())),
            suggestions: Some(suggestions),
            suggestions_used: false,
            show_contact_button: false,
        }
    }

    fn unknown_message(&mut self) -> ChatMessage {
        ChatMessage {
            id: self.next_message_id(),
            role: Role::Assistant,
            content: i18n::unknown_response(self.locale).to_string(),
            content_key: Some(ContentKey::Unknown),
            suggestions: None,
            suggestions_used: false,
            show_contact_button: true,
        }
    }

    /// Creation-time ids, bumped when two messages land in the same millisecond.
    fn next_message_id(&mut self) -> MessageId {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_message_id = now.max(self.last_message_id + 1);
        MessageId(self.last_message_id)
    }

    fn mutate(&self, f: impl FnOnce(&mut ChatSession)) {
        self.session.send_modify(f);
        self.persist();
    }

    fn persist(&self) {
        let blob = match serde_json::to_string(&*self.session.borrow()) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Failed to serialize chat session: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set_item(SESSION_KEY, &blob) {
            warn!("Failed to persist chat session: {}", e);
        }
    }
}

fn restore(store: &dyn KeyValueStore) -> ChatSession {
    let blob = match store.get_item(SESSION_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return ChatSession::default(),
        Err(e) => {
            warn!("Failed to read chat session, starting empty: {}", e);
            return ChatSession::default();
        }
    };
    serde_json::from_str(&blob).unwrap_or_else(|e| {
        warn!("Stored chat session is malformed, starting empty: {}", e);
        ChatSession::default()
    })
}

/// Runs one full turn: records the user message, waits out the typing delay
/// without holding the lock, then appends the reply.
///
/// Returns `None` for blank input.
pub async fn submit_user_input(
    conversation: &Mutex<ConversationManager>,
    delay: &dyn TypingDelay,
    input: UserInput,
) -> Option<ChatMessage> {
    let pending = conversation.lock().await.begin_turn(input)?;
    tokio::time::sleep(delay.next_delay()).await;
    Some(conversation.lock().await.complete_turn(pending))
}
