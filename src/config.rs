//! Configuration and persisted playback state.
//!
//! [`Settings`] drives runtime behavior and is loaded from environment and
//! an optional TOML file. The [`StateStore`] holds the only two values that
//! survive a session: the playback speed rate and the single-loop flag.

mod load;
mod schema;
mod state;

pub use load::{default_config_path, default_state_path, resolve_config_path, resolve_state_path};
pub use schema::*;
pub use state::{FileStateStore, MemoryStateStore, PersistedState, StateStore};
