//! services/api/src/adapters/ticks.rs
//!
//! Frame ticks for the playback sampling loop, driven by a tokio interval.

use portfolio_core::ports::{TickSource, TickStream};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy)]
pub struct FrameTicks {
    period: Duration,
}

impl FrameTicks {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl TickSource for FrameTicks {
    /// Must be called from within a tokio runtime.
    fn ticks(&self) -> TickStream {
        let mut interval = tokio::time::interval(self.period);
        // A slow consumer drops frames instead of bursting to catch up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Box::pin(futures::stream::unfold(interval, |mut interval| async move {
            interval.tick().await;
            Some(((), interval))
        }))
    }
}
