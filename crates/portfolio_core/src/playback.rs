//! crates/portfolio_core/src/playback.rs
//!
//! Owns the playback clock of the narrated intro. Time is sampled from the
//! media handle on every tick while playing; all state changes are published
//! through a `watch` channel.

use crate::domain::PlaybackClock;
use crate::ports::{MediaHandle, TickSource};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct PlaybackEngine {
    media: Arc<dyn MediaHandle>,
    state: watch::Sender<PlaybackClock>,
}

impl PlaybackEngine {
    /// Loads the media and, if requested, tries to start playing right away.
    ///
    /// A load failure leaves the engine unloaded; every control becomes a no-op.
    pub async fn initialize(media: Arc<dyn MediaHandle>, autoplay: bool) -> Self {
        let (state, _) = watch::channel(PlaybackClock::default());
        let engine = Self { media, state };

        match engine.media.load().await {
            Ok(duration) => {
                info!(duration, "Narration metadata loaded.");
                engine.state.send_modify(|clock| {
                    clock.duration = duration;
                    clock.is_loaded = true;
                });
            }
            Err(e) => warn!("Narration failed to load, playback disabled: {}", e),
        }

        if autoplay && !engine.play() {
            info!("Autoplay blocked. Waiting for an explicit play request.");
        }
        engine
    }

    pub fn snapshot(&self) -> PlaybackClock {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackClock> {
        self.state.subscribe()
    }

    /// Starts playback. Returns whether the engine is now playing; a rejected
    /// start is logged and leaves the clock paused.
    pub fn play(&self) -> bool {
        let clock = self.snapshot();
        if !clock.is_loaded {
            debug!("play ignored: media not loaded");
            return false;
        }
        if clock.is_playing {
            return true;
        }

        match self.media.play() {
            Ok(()) => {
                self.state.send_modify(|clock| clock.is_playing = true);
                true
            }
            Err(e) => {
                warn!("Failed to play narration: {}", e);
                false
            }
        }
    }

    pub fn pause(&self) {
        if !self.snapshot().is_loaded {
            return;
        }
        self.media.pause();
        self.state.send_if_modified(|clock| {
            let was_playing = clock.is_playing;
            clock.is_playing = false;
            was_playing
        });
    }

    /// Pauses when playing, otherwise attempts to play. Returns the new playing state.
    pub fn toggle(&self) -> bool {
        if self.snapshot().is_playing {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    /// Moves the media to `time` (clamped to the media's bounds) and publishes
    /// it without waiting for the next tick.
    pub fn seek(&self, time: f64) {
        let clock = self.snapshot();
        if !clock.is_loaded || !time.is_finite() {
            return;
        }
        let target = time.clamp(0.0, clock.duration.max(0.0));
        self.media.set_position(target);
        self.state.send_modify(|clock| clock.current_time = target);
    }

    /// Reads the media's true position once, handling the end of playback.
    pub fn sample(&self) {
        if !self.snapshot().is_playing {
            return;
        }
        if self.media.has_ended() {
            self.finish();
            return;
        }

        let position = self.media.position();
        self.state.send_if_modified(|clock| {
            if clock.current_time == position {
                return false;
            }
            clock.current_time = position;
            true
        });
    }

    /// Samples on every tick until playback stops or the ticks run out.
    ///
    /// Returns as soon as `is_playing` turns false, even between ticks.
    pub async fn run_sampling(&self, ticks: &dyn TickSource) {
        let mut state = self.state.subscribe();
        let mut stream = ticks.ticks();

        loop {
            if !state.borrow_and_update().is_playing {
                break;
            }
            tokio::select! {
                tick = stream.next() => {
                    if tick.is_none() {
                        break;
                    }
                    self.sample();
                }
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("Sampling loop stopped.");
    }

    fn finish(&self) {
        info!("Narration ended.");
        self.media.pause();
        self.media.set_position(0.0);
        self.state.send_modify(|clock| {
            clock.is_playing = false;
            clock.current_time = 0.0;
        });
    }
}
