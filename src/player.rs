//! Playback coordination.
//!
//! [`Player`] is the single source of truth for playback state: it owns the
//! current item, the playlist, the output handle, the refresh ticker and the
//! persisted playback settings. It is strictly single-threaded; the host
//! event loop drives it through [`Player::tick`] and direct method calls.
//! The output device sits behind the [`OutputBackend`]/[`OutputHandle`] seam
//! so the coordinator can be exercised without an audio device.

mod backend;
mod coordinator;
mod sink;
mod types;

pub use backend::{OutputBackend, OutputHandle};
pub use coordinator::Player;
pub use sink::RodioBackend;
pub use types::{
    MetadataSurface, NowPlaying, PlaybackError, PlaybackState, RATE_DEFAULT, RATE_MAX, RATE_MIN,
    RATE_STEP,
};

#[cfg(test)]
mod tests;
