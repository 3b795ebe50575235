use std::path::Path;
use std::time::Duration;

use super::types::PlaybackError;

/// A live decoder/output pipeline for a single file.
///
/// Handles have exactly one owner (the player) and are replaced wholesale on
/// track change, never reused across files.
pub trait OutputHandle {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Apply a speed multiplier; callers keep it within `[RATE_MIN, RATE_MAX]`.
    fn set_rate(&mut self, rate: f32);
    /// Move the play head. Out-of-range positions are the handle's problem;
    /// implementations may clamp internally.
    fn set_position(&mut self, position: Duration);
    fn position(&self) -> Duration;
    /// Total duration once known; `None` when the container does not say.
    fn duration(&self) -> Option<Duration>;
    /// True when the handle has played through its source.
    fn is_finished(&self) -> bool;
}

/// Factory for output handles; the seam between the coordinator and the
/// actual audio device.
pub trait OutputBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn OutputHandle>, PlaybackError>;
}
