//! crates/portfolio_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! engines independent of browser storage, audio backends and frame clocks.

use async_trait::async_trait;
use futures::Stream;
use rand::Rng;
use std::pin::Pin;
use std::time::Duration;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),
    #[error("Media unavailable: {0}")]
    MediaUnavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

impl From<serde_json::Error> for PortError {
    fn from(e: serde_json::Error) -> Self {
        PortError::Serialization(e.to_string())
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A string key/value store with Web Storage semantics.
///
/// Each instance is one scope: either the current browser session or a
/// durable per-visitor store.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> PortResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove_item(&self, key: &str) -> PortResult<()>;
}

/// A loadable, seekable audio element.
#[async_trait]
pub trait MediaHandle: Send + Sync {
    /// Loads the media and resolves to its duration in seconds once metadata is known.
    async fn load(&self) -> PortResult<f64>;

    /// Starts playback. May be rejected, e.g. when autoplay is blocked.
    fn play(&self) -> PortResult<()>;

    fn pause(&self);

    /// The media's own notion of the current position, in seconds.
    fn position(&self) -> f64;

    fn set_position(&self, seconds: f64);

    /// True once playback ran past the end of the media.
    fn has_ended(&self) -> bool;
}

/// A boxed stream of frame ticks.
pub type TickStream = Pin<Box<dyn Stream<Item = ()> + Send>>;

/// Source of render-cadence ticks that drive time sampling.
pub trait TickSource: Send + Sync {
    fn ticks(&self) -> TickStream;
}

/// Produces the pause inserted before an assistant reply.
pub trait TypingDelay: Send + Sync {
    fn next_delay(&self) -> Duration;
}

/// Draws each delay uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct UniformTypingDelay {
    pub min: Duration,
    pub max: Duration,
}

impl Default for UniformTypingDelay {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(600),
            max: Duration::from_millis(1000),
        }
    }
}

impl TypingDelay for UniformTypingDelay {
    fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let (min, max) = (self.min.as_millis() as u64, self.max.as_millis() as u64);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

/// Always waits the same amount of time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTypingDelay(pub Duration);

impl TypingDelay for FixedTypingDelay {
    fn next_delay(&self) -> Duration {
        self.0
    }
}
