//! attacca: an embeddable, playlist-aware audio player.
//!
//! The heart of the crate is [`player::Player`], a single-threaded playback
//! coordinator that owns the current item, the playlist, the output handle
//! and the playback settings, and publishes now-playing metadata to an
//! optional [`player::MetadataSurface`]. Everything else is a collaborator
//! around that small API: [`library`] models and enumerates playable items,
//! [`mpris`] exposes the player on the session bus, [`config`] loads
//! settings and persists the two playback scalars, and [`runtime`]/[`ui`]
//! form the terminal front-end the `attacca` binary runs.

pub mod config;
pub mod library;
pub mod mpris;
pub mod player;
pub mod runtime;
pub mod ui;
