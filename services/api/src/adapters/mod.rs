pub mod narration;
pub mod storage;
pub mod ticks;

pub use narration::NarrationTrack;
pub use storage::JsonFileStore;
pub use ticks::FrameTicks;
