//! The playback coordinator.
//!
//! One long-lived `Player` per application, constructed explicitly and
//! handed by reference to whatever presents it. All methods run on the host
//! loop's thread and return immediately; progress is observed through the
//! refresh tick and the registered callbacks.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::config::StateStore;
use crate::library::{AudioItem, TypeTag, classify};

use super::backend::{OutputBackend, OutputHandle};
use super::types::{
    MetadataSurface, NowPlaying, PlaybackError, PlaybackState, RATE_MAX, RATE_MIN, RATE_STEP,
    TICK_PERIOD, Ticker,
};

type TitleCallback = Box<dyn FnMut(&str)>;
type StatusCallback = Box<dyn FnMut()>;

enum Step {
    Forward,
    Back,
}

pub struct Player {
    backend: Box<dyn OutputBackend>,
    store: Box<dyn StateStore>,
    surface: Option<Box<dyn MetadataSurface>>,
    on_title: Option<TitleCallback>,
    on_status: Option<StatusCallback>,

    handle: Option<Box<dyn OutputHandle>>,
    current: Option<AudioItem>,
    playlist: Vec<AudioItem>,
    playing: bool,
    elapsed: Duration,
    duration: Duration,
    rate: f32,
    single_loop: bool,
    paused_by_interruption: bool,
    ticker: Ticker,

    artwork_path: Option<PathBuf>,
    // Outer None = not resolved yet; inner Option is the cached result.
    art_url: Option<Option<String>>,
}

impl Player {
    /// Build a coordinator over `backend`, restoring the persisted speed
    /// rate and loop flag from `store`.
    pub fn new(backend: Box<dyn OutputBackend>, store: Box<dyn StateStore>) -> Self {
        let rate = store.speed_rate();
        let single_loop = store.single_loop();
        Self {
            backend,
            store,
            surface: None,
            on_title: None,
            on_status: None,
            handle: None,
            current: None,
            playlist: Vec::new(),
            playing: false,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            rate,
            single_loop,
            paused_by_interruption: false,
            ticker: Ticker::new(TICK_PERIOD),
            artwork_path: None,
            art_url: None,
        }
    }

    /// Register the surface that receives now-playing metadata.
    pub fn set_metadata_surface(&mut self, surface: Box<dyn MetadataSurface>) {
        self.surface = Some(surface);
    }

    /// Artwork file advertised with the now-playing metadata; resolved
    /// lazily on first publication and cached for the session.
    pub fn set_artwork(&mut self, path: PathBuf) {
        self.artwork_path = Some(path);
        self.art_url = None;
    }

    /// Register the callback invoked when the display title changes.
    pub fn on_title_changed(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_title = Some(Box::new(callback));
    }

    /// Register the callback invoked when status or progress change.
    pub fn on_status_changed(&mut self, callback: impl FnMut() + 'static) {
        self.on_status = Some(Box::new(callback));
    }

    pub fn set_playlist(&mut self, items: Vec<AudioItem>) {
        self.playlist = items;
    }

    pub fn playlist(&self) -> &[AudioItem] {
        &self.playlist
    }

    pub fn current(&self) -> Option<&AudioItem> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn single_loop(&self) -> bool {
        self.single_loop
    }

    pub fn playback_state(&self) -> PlaybackState {
        if self.handle.is_none() {
            PlaybackState::Stopped
        } else if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    /// Load `item` and start playing it.
    ///
    /// Asking for the item that is already loaded toggles play/pause
    /// instead of reloading, so tapping a track twice pauses it. An item
    /// with an empty path is silently ignored. A file the backend cannot
    /// open fails with [`PlaybackError::Unloadable`] and leaves the session
    /// untouched.
    pub fn play_item(&mut self, item: &AudioItem) -> Result<(), PlaybackError> {
        if self.handle.is_some()
            && self.current.as_ref().is_some_and(|cur| cur.path == item.path)
        {
            if self.playing {
                self.pause();
            } else {
                self.resume();
            }
            return Ok(());
        }

        if item.path.as_os_str().is_empty() {
            return Ok(());
        }

        self.load(item.clone())
    }

    /// Replace the output handle with a fresh one for `item`, always from
    /// the start of the file.
    fn load(&mut self, item: AudioItem) -> Result<(), PlaybackError> {
        // Open the replacement before tearing anything down so a bad file
        // leaves the previous track playing.
        let mut handle = match self.backend.open(&item.path) {
            Ok(h) => h,
            Err(e) => {
                warn!("failed to load {:?}: {e}", item.path);
                return Err(e);
            }
        };
        if let Some(mut old) = self.handle.take() {
            old.stop();
        }

        handle.set_rate(self.rate);
        handle.play();
        self.duration = handle.duration().unwrap_or(Duration::ZERO);
        self.elapsed = Duration::ZERO;
        self.handle = Some(handle);
        self.playing = true;
        self.paused_by_interruption = false;

        let title = item.display_title().to_string();
        self.current = Some(item);

        self.ticker.start();
        self.publish_now_playing();
        if let Some(cb) = self.on_title.as_mut() {
            cb(&title);
        }
        self.notify_status();
        Ok(())
    }

    /// Toggle playback of the current item, falling back to the first
    /// playlist entry when nothing audio-typed is loaded.
    pub fn toggle_play_pause(&mut self) -> Result<(), PlaybackError> {
        if let Some(cur) = self.current.clone() {
            if classify(&cur) == TypeTag::Audio {
                return self.play_item(&cur);
            }
        }
        if let Some(first) = self.playlist.first().cloned() {
            return self.play_item(&first);
        }
        Ok(())
    }

    /// Continue a paused handle from its current position.
    pub fn resume(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        handle.set_rate(self.rate);
        handle.play();
        self.playing = true;
        self.paused_by_interruption = false;
        self.ticker.start();
        self.publish_now_playing();
        self.notify_status();
    }

    /// Pause playback. Idempotent.
    pub fn pause(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.pause();
        }
        self.playing = false;
        self.paused_by_interruption = false;
        self.ticker.stop();
        self.publish_now_playing();
        self.notify_status();
    }

    /// Stop playback and drop the output handle. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
        self.playing = false;
        self.elapsed = Duration::ZERO;
        self.ticker.stop();
        self.publish_now_playing();
        self.notify_status();
    }

    /// Move to the previous playlist entry, wrapping from the first entry
    /// to the last.
    pub fn previous(&mut self) -> Result<(), PlaybackError> {
        self.step(Step::Back)
    }

    /// Move to the next playlist entry, wrapping from the last entry to
    /// the first.
    pub fn next(&mut self) -> Result<(), PlaybackError> {
        self.step(Step::Forward)
    }

    fn step(&mut self, direction: Step) -> Result<(), PlaybackError> {
        if self.playlist.is_empty() {
            if let Some(cur) = self.current.clone() {
                return self.play_item(&cur);
            }
            return Ok(());
        }

        let Some(cur) = self.current.clone() else {
            let first = self.playlist[0].clone();
            return self.play_item(&first);
        };
        let Some(pos) = self.playlist.iter().position(|it| it.path == cur.path) else {
            let first = self.playlist[0].clone();
            return self.play_item(&first);
        };

        let last = self.playlist.len() - 1;
        let target = match direction {
            Step::Forward => {
                if pos >= last {
                    0
                } else {
                    pos + 1
                }
            }
            Step::Back => {
                if pos == 0 {
                    last
                } else {
                    pos - 1
                }
            }
        };
        let item = self.playlist[target].clone();
        self.play_item(&item)
    }

    /// Move the play head. The position is forwarded unclamped; the output
    /// handle may clamp internally.
    pub fn seek(&mut self, position: Duration) {
        if let Some(handle) = self.handle.as_mut() {
            handle.set_position(position);
        }
        self.elapsed = position;
        self.publish_now_playing();
    }

    /// Raise the speed multiplier by one step, saturating at the ceiling.
    pub fn speed_up(&mut self) {
        let rate = (self.rate + RATE_STEP).min(RATE_MAX);
        self.apply_rate(rate);
    }

    /// Lower the speed multiplier by one step, saturating at the floor.
    pub fn speed_down(&mut self) {
        let rate = (self.rate - RATE_STEP).max(RATE_MIN);
        self.apply_rate(rate);
    }

    fn apply_rate(&mut self, rate: f32) {
        self.rate = rate;
        if let Some(handle) = self.handle.as_mut() {
            handle.set_rate(rate);
        }
        self.store.set_speed_rate(rate);
    }

    /// Flip the persisted single-loop flag. Takes effect on the next
    /// completed track, never on the one already playing.
    pub fn toggle_loop(&mut self) {
        self.single_loop = !self.single_loop;
        self.store.set_single_loop(self.single_loop);
    }

    /// Tear down the output handle and cancel the refresh tick. Safe to
    /// call any number of times; also runs on drop.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
        self.playing = false;
        self.ticker.stop();
    }

    /// Host-driven refresh: reads progress from the handle, republishes
    /// metadata, notifies the status callback and detects end-of-track.
    /// Does nothing until the tick period has elapsed, and nothing at all
    /// while the ticker is stopped.
    pub fn tick(&mut self) {
        if !self.ticker.due() {
            return;
        }

        let mut finished = false;
        if let Some(handle) = self.handle.as_ref() {
            self.elapsed = handle.position();
            if let Some(d) = handle.duration() {
                self.duration = d;
            }
            finished = self.playing && handle.is_finished();
        }

        self.publish_now_playing();
        self.notify_status();

        if finished {
            self.on_track_finished();
        }
    }

    /// The current track played through to the end.
    pub fn on_track_finished(&mut self) {
        self.advance_after_completion();
    }

    /// The output handle failed mid-stream. Stops first, then applies the
    /// same replay/advance policy as a normal completion.
    pub fn on_decode_error(&mut self) {
        warn!(
            "decode error on {:?}",
            self.current.as_ref().map(|c| c.path.as_path())
        );
        self.stop();
        self.advance_after_completion();
    }

    fn advance_after_completion(&mut self) {
        if self.single_loop {
            if let Some(cur) = self.current.clone() {
                // Replay from the start; errors were already logged in load.
                let _ = self.load(cur);
                return;
            }
        }
        let _ = self.next();
    }

    /// Audio focus lost (phone call, another player). Pauses and remembers
    /// that the pause was not the user's.
    pub fn interruption_began(&mut self) {
        if self.playing {
            self.pause();
            self.paused_by_interruption = true;
        }
    }

    /// Audio focus regained. Resumes only a pause this coordinator took for
    /// the interruption, never one the user asked for.
    pub fn interruption_ended(&mut self) {
        if !self.playing && self.paused_by_interruption {
            self.resume();
        }
    }

    fn publish_now_playing(&mut self) {
        if self.current.is_none() {
            return;
        }
        let art_url = self.resolved_art_url();
        let state = self.playback_state();
        let Some(cur) = self.current.as_ref() else {
            return;
        };
        let info = NowPlaying {
            title: cur.display_title().to_string(),
            artist: cur.artist.clone(),
            album: cur.album.clone(),
            art_url,
            duration: self.duration,
            elapsed: self.elapsed,
            rate: if self.playing { self.rate } else { 0.0 },
            state,
        };
        if let Some(surface) = self.surface.as_ref() {
            surface.publish(&info);
        }
    }

    fn resolved_art_url(&mut self) -> Option<String> {
        if self.art_url.is_none() {
            let resolved = self
                .artwork_path
                .as_ref()
                .and_then(|p| p.canonicalize().ok())
                .map(|p| format!("file://{}", p.display()));
            self.art_url = Some(resolved);
        }
        self.art_url.clone().unwrap_or(None)
    }

    fn notify_status(&mut self) {
        if let Some(cb) = self.on_status.as_mut() {
            cb();
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.release();
    }
}
