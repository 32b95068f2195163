mod scheduler;

pub use scheduler::{PlaybackHandle, PlaybackScheduler};
