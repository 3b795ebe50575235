//! Playback-related small types shared across the player modules.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Bounds and step for the playback speed multiplier. The stored rate never
/// leaves `[RATE_MIN, RATE_MAX]`.
pub const RATE_MIN: f32 = 0.1;
pub const RATE_MAX: f32 = 3.0;
pub const RATE_STEP: f32 = 0.1;
pub const RATE_DEFAULT: f32 = 1.0;

/// Refresh period of the UI tick while playback is active.
pub(super) const TICK_PERIOD: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The output backend could not build a handle for the given path
    /// (missing file, unsupported or corrupt format). The session is left
    /// exactly as it was before the load attempt.
    #[error("cannot load {path:?}: {reason}")]
    Unloadable { path: PathBuf, reason: String },

    /// No usable audio output device.
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

/// Flat now-playing record pushed to the metadata surface on every load,
/// pause, stop, seek and refresh tick.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    /// Display title (item name with the extension stripped).
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Artwork location, resolved once per session and cached.
    pub art_url: Option<String>,
    pub duration: Duration,
    pub elapsed: Duration,
    /// Current speed multiplier, 0.0 whenever playback is not active.
    pub rate: f32,
    pub state: PlaybackState,
}

/// Write-only sink for now-playing metadata (lock screens, media controls).
/// Publishing is fire-and-forget; there is no read path.
pub trait MetadataSurface {
    fn publish(&self, info: &NowPlaying);
}

/// Repeating UI-refresh timer driven by the host loop.
///
/// `start` is idempotent: a ticker that is already scheduled keeps its
/// phase rather than being recreated.
#[derive(Debug)]
pub(super) struct Ticker {
    period: Duration,
    scheduled: bool,
    last: Instant,
}

impl Ticker {
    pub(super) fn new(period: Duration) -> Self {
        Self {
            period,
            scheduled: false,
            last: Instant::now(),
        }
    }

    pub(super) fn start(&mut self) {
        if !self.scheduled {
            self.scheduled = true;
            self.last = Instant::now();
        }
    }

    pub(super) fn stop(&mut self) {
        self.scheduled = false;
    }

    /// True once per elapsed period while scheduled.
    pub(super) fn due(&mut self) -> bool {
        if !self.scheduled {
            return false;
        }
        if self.last.elapsed() >= self.period {
            self.last = Instant::now();
            true
        } else {
            false
        }
    }
}
