//! services/api/src/adapters/storage.rs
//!
//! File-backed implementation of the `KeyValueStore` port. Each store is one
//! JSON object on disk, mirrored in memory. Reads are served from memory and
//! every change is written back on the blocking pool.

use portfolio_core::ports::{KeyValueStore, PortError, PortResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tokio::runtime::Handle;
use tracing::{debug, warn};
use uuid::Uuid;

type Items = BTreeMap<String, String>;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A key/value scope persisted as a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    items: Mutex<Items>,
    /// Bumped on every change, so that background writes landing out of
    /// order never replace a newer file with an older one.
    generation: AtomicU64,
    /// Generation of the contents currently on disk.
    written: Arc<Mutex<u64>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, reading it on the calling thread. A missing
    /// file is an empty store; an unreadable or malformed one is logged and
    /// treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = load_items(&path);
        debug!(path = %path.display(), items = items.len(), "Key/value store opened.");
        Self {
            path,
            items: Mutex::new(items),
            generation: AtomicU64::new(0),
            written: Arc::new(Mutex::new(0)),
        }
    }

    /// Like [`JsonFileStore::open`], but reads the file on the blocking pool.
    pub async fn load(path: impl Into<PathBuf>) -> PortResult<Self> {
        let path = path.into();
        tokio::task::spawn_blocking(move || Self::open(path))
            .await
            .map_err(|e| PortError::Unexpected(format!("Store loader failed: {}", e)))
    }

    /// The scope of one browser session: `<root>/sessions/<id>.json`.
    pub async fn session(root: &Path, session_id: Uuid) -> PortResult<Self> {
        Self::load(session_path(root, session_id)).await
    }

    /// The durable scope of one visitor: `<root>/visitors/<id>.json`.
    pub async fn visitor(root: &Path, visitor_id: Uuid) -> PortResult<Self> {
        Self::load(root.join("visitors").join(format!("{visitor_id}.json"))).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits until the latest contents are on disk.
    pub async fn flush(&self) -> PortResult<()> {
        let (generation, items) = {
            let items = self.items()?;
            (self.generation.load(Ordering::SeqCst), items.clone())
        };
        let path = self.path.clone();
        let written = self.written.clone();
        tokio::task::spawn_blocking(move || write_generation(&path, &written, generation, &items))
            .await
            .map_err(|e| PortError::Unexpected(format!("Store writer failed: {}", e)))?
    }

    fn items(&self) -> PortResult<MutexGuard<'_, Items>> {
        self.items
            .lock()
            .map_err(|_| PortError::Storage("store lock poisoned".to_string()))
    }

    /// Writes `items` in the background when a runtime is available, and on
    /// the calling thread otherwise.
    fn schedule_write(&self, generation: u64, items: Items) -> PortResult<()> {
        let path = self.path.clone();
        let written = self.written.clone();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || {
                    if let Err(e) = write_generation(&path, &written, generation, &items) {
                        warn!(path = %path.display(), "Failed to write store: {}", e);
                    }
                });
                Ok(())
            }
            Err(_) => write_generation(&path, &written, generation, &items),
        }
    }

    fn update(&self, change: impl FnOnce(&mut Items) -> bool) -> PortResult<()> {
        let (generation, items) = {
            let mut items = self.items()?;
            if !change(&mut items) {
                return Ok(());
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (generation, items.clone())
        };
        self.schedule_write(generation, items)
    }
}

/// Path of the session scope `session_id` under `root`.
pub fn session_path(root: &Path, session_id: Uuid) -> PathBuf {
    root.join("sessions").join(format!("{session_id}.json"))
}

fn load_items(path: &Path) -> Items {
    let blob = match fs::read(path) {
        Ok(blob) => blob,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), "Failed to read store, starting empty: {}", e);
            return BTreeMap::new();
        }
    };
    serde_json::from_slice(&blob).unwrap_or_else(|e| {
        warn!(path = %path.display(), "Store file is malformed, starting empty: {}", e);
        BTreeMap::new()
    })
}

/// Writes `items` unless a newer generation is already on disk.
fn write_generation(
    path: &Path,
    written: &Mutex<u64>,
    generation: u64,
    items: &Items,
) -> PortResult<()> {
    let mut on_disk = written
        .lock()
        .map_err(|_| PortError::Storage("store writer lock poisoned".to_string()))?;
    if *on_disk >= generation {
        return Ok(());
    }
    write_atomically(path, items)?;
    *on_disk = generation;
    Ok(())
}

/// Writes through a uniquely named temp file in the same directory and
/// renames it over `path`, so readers never see half a file.
fn write_atomically(path: &Path, items: &Items) -> PortResult<()> {
    let storage = |e: std::io::Error| PortError::Storage(e.to_string());
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(storage)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(storage)?;
    serde_json::to_writer_pretty(&mut tmp, items)?;
    tmp.flush().map_err(storage)?;
    tmp.persist(path).map_err(|e| storage(e.error))?;
    Ok(())
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> PortResult<()> {
        self.update(|items| items.remove(key).is_some())
    }
}
