//! services/api/src/adapters/narration.rs
//!
//! The narrated intro as a `MediaHandle`. Only the WAV header is read (for the
//! duration); the position is a monotonic clock anchored at the last play.

use async_trait::async_trait;
use portfolio_core::ports::{MediaHandle, PortError, PortResult};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
struct TrackState {
    duration: Option<f64>,
    /// Position at the moment the clock was last anchored.
    offset: f64,
    /// Set while playing.
    anchor: Option<Instant>,
}

impl TrackState {
    fn raw_position(&self) -> f64 {
        self.offset + self.anchor.map_or(0.0, |at| at.elapsed().as_secs_f64())
    }
}

pub struct NarrationTrack {
    path: PathBuf,
    state: Mutex<TrackState>,
}

impl NarrationTrack {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(TrackState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, TrackState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Reads the duration in seconds from a WAV header.
pub fn wav_duration(path: &std::path::Path) -> PortResult<f64> {
    let reader =
        hound::WavReader::open(path).map_err(|e| PortError::MediaUnavailable(e.to_string()))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(PortError::MediaUnavailable("sample rate is zero".to_string()));
    }
    // `duration()` counts frames, i.e. samples per channel.
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

#[async_trait]
impl MediaHandle for NarrationTrack {
    async fn load(&self) -> PortResult<f64> {
        let path = self.path.clone();
        let duration = tokio::task::spawn_blocking(move || wav_duration(&path))
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))??;

        self.state().duration = Some(duration);
        debug!(path = %self.path.display(), duration, "Narration header read.");
        Ok(duration)
    }

    fn play(&self) -> PortResult<()> {
        let mut state = self.state();
        if state.duration.is_none() {
            return Err(PortError::PlaybackRejected("narration is not loaded".to_string()));
        }
        if state.anchor.is_none() {
            state.anchor = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&self) {
        let mut state = self.state();
        let position = self.clamp(&state, state.raw_position());
        state.offset = position;
        state.anchor = None;
    }

    fn position(&self) -> f64 {
        let state = self.state();
        self.clamp(&state, state.raw_position())
    }

    fn set_position(&self, seconds: f64) {
        let mut state = self.state();
        state.offset = self.clamp(&state, seconds);
        if state.anchor.is_some() {
            state.anchor = Some(Instant::now());
        }
    }

    fn has_ended(&self) -> bool {
        let state = self.state();
        state
            .duration
            .is_some_and(|duration| state.anchor.is_some() && state.raw_position() >= duration)
    }
}

impl NarrationTrack {
    fn clamp(&self, state: &TrackState, seconds: f64) -> f64 {
        let upper = state.duration.unwrap_or(0.0);
        seconds.clamp(0.0, upper)
    }
}
