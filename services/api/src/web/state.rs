//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-visitor request context.

use crate::adapters::{storage::session_path, FrameTicks, JsonFileStore};
use crate::config::Config;
use crate::error::ApiError;
use portfolio_core::{
    ConversationManager, LocaleManager, QaEngine, SubtitleTrack, TickSource, TypingDelay,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<QaEngine>,
    pub subtitles: Arc<SubtitleTrack>,
    pub typing_delay: Arc<dyn TypingDelay>,
    pub ticks: Arc<dyn TickSource>,
    /// Live conversations keyed by browser session.
    pub conversations: Mutex<HashMap<Uuid, LiveConversation>>,
}

/// A mounted conversation and the last time a request touched it.
pub struct LiveConversation {
    pub conversation: Arc<Mutex<ConversationManager>>,
    pub store: Arc<JsonFileStore>,
    pub last_seen: Instant,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            engine: Arc::new(QaEngine::builtin(config.match_config())),
            subtitles: Arc::new(SubtitleTrack::intro()),
            typing_delay: Arc::new(config.typing_delay()),
            ticks: Arc::new(FrameTicks::new(config.frame_interval)),
            conversations: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// The visitor's durable store.
    pub async fn visitor_store(
        &self,
        visitor: &VisitorContext,
    ) -> Result<Arc<JsonFileStore>, ApiError> {
        let store = JsonFileStore::visitor(&self.config.storage_dir, visitor.visitor_id).await?;
        Ok(Arc::new(store))
    }

    /// The visitor's locale, backed by their durable store.
    pub async fn locale_manager(
        &self,
        visitor: &VisitorContext,
        browser_language: Option<&str>,
    ) -> Result<LocaleManager, ApiError> {
        let store = self.visitor_store(visitor).await?;
        Ok(LocaleManager::initialize(store, browser_language))
    }

    /// Returns the live conversation of this browser session, restoring it
    /// from the session store on first use.
    pub async fn conversation(
        &self,
        visitor: &VisitorContext,
        browser_language: Option<&str>,
    ) -> Result<Arc<Mutex<ConversationManager>>, ApiError> {
        if let Some(conversation) = self.live_conversation(visitor.session_id).await {
            return Ok(conversation);
        }

        // Mounting reads files, so it happens outside the map lock.
        let locale = self
            .locale_manager(visitor, browser_language)
            .await?
            .current();
        let store =
            Arc::new(JsonFileStore::session(&self.config.storage_dir, visitor.session_id).await?);
        let mut manager = ConversationManager::mount(self.engine.clone(), store.clone(), locale);
        if !manager.snapshot().is_empty() {
            // The preference may have changed in another session since this one was saved.
            manager.change_locale(locale);
        }

        let mut live = self.conversations.lock().await;
        let entry = live.entry(visitor.session_id).or_insert_with(|| {
            info!(session_id = %visitor.session_id, %locale, "Conversation mounted.");
            LiveConversation {
                conversation: Arc::new(Mutex::new(manager)),
                store,
                last_seen: Instant::now(),
            }
        });
        entry.last_seen = Instant::now();
        Ok(entry.conversation.clone())
    }

    /// The conversation of this session, only if it is already live.
    pub async fn live_conversation(
        &self,
        session_id: Uuid,
    ) -> Option<Arc<Mutex<ConversationManager>>> {
        let mut live = self.conversations.lock().await;
        let entry = live.get_mut(&session_id)?;
        entry.last_seen = Instant::now();
        Some(entry.conversation.clone())
    }

    /// Drops conversations idle for at least `max_idle` and deletes their
    /// session files, along with files left behind by earlier runs.
    /// Conversations still held by a request are kept. Returns how many
    /// sessions were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> Result<usize, ApiError> {
        let (evicted, live_ids) = {
            let mut live = self.conversations.lock().await;
            let mut evicted = Vec::new();
            live.retain(|id, entry| {
                let idle = entry.last_seen.elapsed() >= max_idle;
                let in_use = Arc::strong_count(&entry.conversation) > 1;
                if idle && !in_use {
                    evicted.push(*id);
                    return false;
                }
                true
            });
            let live_ids: HashSet<Uuid> = live.keys().copied().collect();
            (evicted, live_ids)
        };

        let mut removed = 0;
        for session_id in &evicted {
            remove_session_file(&session_path(&self.config.storage_dir, *session_id)).await?;
            removed += 1;
        }
        removed += self.remove_stale_files(max_idle, &live_ids).await?;

        if removed > 0 {
            info!(removed, "Evicted idle chat sessions.");
        }
        Ok(removed)
    }

    /// Session files not modified for `max_idle` that no live conversation owns.
    async fn remove_stale_files(
        &self,
        max_idle: Duration,
        live_ids: &HashSet<Uuid>,
    ) -> Result<usize, ApiError> {
        let dir = self.config.storage_dir.join("sessions");
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(session_id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| Uuid::parse_str(stem).ok())
            else {
                continue;
            };
            if live_ids.contains(&session_id) {
                continue;
            }
            let modified = entry.metadata().await?.modified()?;
            let age = SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO);
            if age >= max_idle {
                remove_session_file(&path).await?;
                debug!(%session_id, "Removed stale session file.");
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Evicts idle sessions every `session_sweep_interval` until cancelled.
    pub async fn run_session_sweeper(self: Arc<Self>, cancellation_token: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.session_sweep_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    debug!("Session sweeper stopped.");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.evict_idle(self.config.session_idle_timeout).await {
                        warn!("Session sweep failed: {}", e);
                    }
                }
            }
        }
    }

    /// Waits until every live conversation is on disk.
    pub async fn flush_sessions(&self) {
        let stores: Vec<Arc<JsonFileStore>> = self
            .conversations
            .lock()
            .await
            .values()
            .map(|entry| entry.store.clone())
            .collect();
        for store in stores {
            if let Err(e) = store.flush().await {
                warn!(path = %store.path().display(), "Failed to flush session: {}", e);
            }
        }
    }
}

async fn remove_session_file(path: &std::path::Path) -> Result<(), ApiError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

//=========================================================================================
// VisitorContext (Specific to One Request)
//=========================================================================================

/// Identifies who is calling; inserted by the `require_visitor` middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitorContext {
    /// Lives as long as the browser session.
    pub session_id: Uuid,
    /// Survives browser restarts; scopes the locale preference.
    pub visitor_id: Uuid,
}
