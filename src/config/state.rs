//! The persisted playback state: exactly two scalars.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::player::{RATE_DEFAULT, RATE_MAX, RATE_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub speed_rate: f32,
    pub single_loop: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            speed_rate: RATE_DEFAULT,
            single_loop: false,
        }
    }
}

/// The settings collaborator the player consumes: a key/value store for the
/// speed rate and the single-loop flag. Setters persist immediately.
pub trait StateStore {
    fn speed_rate(&self) -> f32;
    fn set_speed_rate(&mut self, rate: f32);
    fn single_loop(&self) -> bool;
    fn set_single_loop(&mut self, on: bool);
}

/// TOML-backed store, written through on every set.
pub struct FileStateStore {
    path: PathBuf,
    state: PersistedState,
}

impl FileStateStore {
    /// Load the state at `path`, falling back to defaults for a missing or
    /// unreadable file. An out-of-range stored rate is reset to the default
    /// and written back.
    pub fn open(path: PathBuf) -> Self {
        let state = fs::read_to_string(&path)
            .ok()
            .and_then(|s| toml::from_str::<PersistedState>(&s).ok())
            .unwrap_or_default();

        let mut store = Self { path, state };
        if !(RATE_MIN..=RATE_MAX).contains(&store.state.speed_rate) {
            store.state.speed_rate = RATE_DEFAULT;
            store.persist();
        }
        store
    }

    fn persist(&self) {
        if let Some(dir) = self.path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        match toml::to_string_pretty(&self.state) {
            Ok(s) => {
                if let Err(e) = fs::write(&self.path, s) {
                    warn!("could not write state to {:?}: {e}", self.path);
                }
            }
            Err(e) => warn!("could not serialize state: {e}"),
        }
    }
}

impl StateStore for FileStateStore {
    fn speed_rate(&self) -> f32 {
        self.state.speed_rate
    }

    fn set_speed_rate(&mut self, rate: f32) {
        self.state.speed_rate = rate;
        self.persist();
    }

    fn single_loop(&self) -> bool {
        self.state.single_loop
    }

    fn set_single_loop(&mut self, on: bool) {
        self.state.single_loop = on;
        self.persist();
    }
}

/// In-memory store for tests and embedders that persist elsewhere. Clones
/// share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    state: Arc<Mutex<PersistedState>>,
}

impl MemoryStateStore {
    pub fn snapshot(&self) -> PersistedState {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }
}

impl StateStore for MemoryStateStore {
    fn speed_rate(&self) -> f32 {
        self.snapshot().speed_rate
    }

    fn set_speed_rate(&mut self, rate: f32) {
        if let Ok(mut s) = self.state.lock() {
            s.speed_rate = rate;
        }
    }

    fn single_loop(&self) -> bool {
        self.snapshot().single_loop
    }

    fn set_single_loop(&mut self, on: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.single_loop = on;
        }
    }
}
