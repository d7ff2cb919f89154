//! crates/portfolio_core/src/locale.rs
//!
//! Owns the visitor's display locale and its durable preference.

use crate::domain::Locale;
use crate::ports::KeyValueStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Key of the durable locale preference.
pub const LOCALE_KEY: &str = "preferred-locale";

pub struct LocaleManager {
    store: Arc<dyn KeyValueStore>,
    current: watch::Sender<Locale>,
}

impl LocaleManager {
    /// Resolves the starting locale: a stored preference wins, then the
    /// browser's language, then the default.
    pub fn initialize(store: Arc<dyn KeyValueStore>, browser_language: Option<&str>) -> Self {
        let stored = match store.get_item(LOCALE_KEY) {
            Ok(value) => value.and_then(|code| code.parse::<Locale>().ok()),
            Err(e) => {
                warn!("Failed to read locale preference: {}", e);
                None
            }
        };
        let detected = browser_language.and_then(Locale::from_language_tag);
        let locale = stored.or(detected).unwrap_or_default();
        debug!(%locale, stored = stored.is_some(), "Locale resolved.");

        let (current, _) = watch::channel(locale);
        Self { store, current }
    }

    pub fn current(&self) -> Locale {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Locale> {
        self.current.subscribe()
    }

    /// Switches the locale and persists the choice. A storage failure is
    /// logged; the switch still takes effect.
    pub fn set_locale(&self, locale: Locale) {
        if let Err(e) = self.store.set_item(LOCALE_KEY, locale.code()) {
            warn!("Failed to persist locale preference: {}", e);
        }
        self.current.send_if_modified(|current| {
            let changed = *current != locale;
            *current = locale;
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<String, String>>);

    impl KeyValueStore for MemoryStore {
        fn get_item(&self, key: &str) -> PortResult<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }
        fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }
        fn remove_item(&self, key: &str) -> PortResult<()> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _: &str) -> PortResult<Option<String>> {
            Err(PortError::Storage("unavailable".into()))
        }
        fn set_item(&self, _: &str, _: &str) -> PortResult<()> {
            Err(PortError::Storage("unavailable".into()))
        }
        fn remove_item(&self, _: &str) -> PortResult<()> {
            Err(PortError::Storage("unavailable".into()))
        }
    }

    #[test]
    fn stored_preference_wins_over_browser_language() {
        let store = Arc::new(MemoryStore::default());
        store.set_item(LOCALE_KEY, "fr").unwrap();
        let manager = LocaleManager::initialize(store, Some("de-DE"));
        assert_eq!(manager.current(), Locale::Fr);
    }

    #[test]
    fn browser_language_is_used_when_nothing_stored() {
        let manager = LocaleManager::initialize(Arc::new(MemoryStore::default()), Some("de-AT"));
        assert_eq!(manager.current(), Locale::De);
    }

    #[test]
    fn unsupported_values_fall_back_to_default() {
        let store = Arc::new(MemoryStore::default());
        store.set_item(LOCALE_KEY, "klingon").unwrap();
        let manager = LocaleManager::initialize(store, Some("ja-JP"));
        assert_eq!(manager.current(), Locale::En);
    }

    #[test]
    fn set_locale_persists_and_notifies() {
        let store = Arc::new(MemoryStore::default());
        let manager = LocaleManager::initialize(store.clone(), None);
        let mut rx = manager.subscribe();

        manager.set_locale(Locale::De);
        assert_eq!(manager.current(), Locale::De);
        assert_eq!(store.get_item(LOCALE_KEY).unwrap().as_deref(), Some("de"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Locale::De);
    }

    #[test]
    fn broken_storage_still_switches() {
        let manager = LocaleManager::initialize(Arc::new(BrokenStore), Some("fr"));
        assert_eq!(manager.current(), Locale::Fr);
        manager.set_locale(Locale::De);
        assert_eq!(manager.current(), Locale::De);
    }
}
