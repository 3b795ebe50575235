//! MPRIS (`org.mpris.MediaPlayer2`) integration over the session bus.
//!
//! Remote commands (playerctl, desktop media keys) are forwarded to the
//! playback loop as [`ControlCmd`] values over a channel; the service itself
//! lives on a dedicated thread so the player never blocks on D-Bus.
//! [`MprisHandle`] is the write side: the player publishes its now-playing
//! record into shared state, the D-Bus interfaces read from it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use log::warn;
use zbus::{Connection, interface};
use zvariant::{OwnedValue, Value};

use crate::player::{MetadataSurface, NowPlaying, PlaybackState, RATE_MAX, RATE_MIN};

/// Commands a remote controller can issue to the playback loop.
#[derive(Clone, Debug)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    SeekTo(Duration),
}

#[derive(Debug, Default)]
struct SharedState {
    now: Option<NowPlaying>,
}

/// Handle the player keeps to feed the MPRIS service. Cloning shares the
/// underlying state.
#[derive(Clone)]
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MetadataSurface for MprisHandle {
    fn publish(&self, info: &NowPlaying) {
        if let Ok(mut s) = self.state.lock() {
            s.now = Some(info.clone());
        }
    }
}

fn status_str(now: Option<&NowPlaying>) -> &'static str {
    match now.map(|n| n.state) {
        Some(PlaybackState::Playing) => "Playing",
        Some(PlaybackState::Paused) => "Paused",
        _ => "Stopped",
    }
}

fn metadata_map(now: Option<&NowPlaying>) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();
    let Some(now) = now else {
        return map;
    };

    let mut insert = |key: &str, value: Value<'_>| {
        if let Ok(v) = OwnedValue::try_from(value) {
            map.insert(key.to_string(), v);
        }
    };

    insert("xesam:title", Value::from(now.title.clone()));
    if let Some(artist) = &now.artist {
        insert("xesam:artist", Value::from(vec![artist.clone()]));
    }
    if let Some(album) = &now.album {
        insert("xesam:album", Value::from(album.clone()));
    }
    if let Some(url) = &now.art_url {
        insert("mpris:artUrl", Value::from(url.clone()));
    }
    if !now.duration.is_zero() {
        insert("mpris:length", Value::from(now.duration.as_micros() as i64));
    }
    map
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "attacca"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn snapshot(&self) -> Option<NowPlaying> {
        self.state.lock().ok().and_then(|s| s.now.clone())
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    /// Offset seek relative to the last published position.
    fn seek(&self, offset_micros: i64) {
        let Some(now) = self.snapshot() else {
            return;
        };
        let elapsed = now.elapsed.as_micros() as i64;
        let target = (elapsed + offset_micros).max(0) as u64;
        let _ = self.tx.send(ControlCmd::SeekTo(Duration::from_micros(target)));
    }

    fn set_position(&self, _track_id: zvariant::ObjectPath<'_>, position_micros: i64) {
        if position_micros < 0 {
            return;
        }
        let _ = self.tx.send(ControlCmd::SeekTo(Duration::from_micros(
            position_micros as u64,
        )));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &'static str {
        status_str(self.snapshot().as_ref())
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        match self.snapshot() {
            Some(now) if now.rate > 0.0 => now.rate as f64,
            _ => 1.0,
        }
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        RATE_MIN as f64
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        RATE_MAX as f64
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.snapshot()
            .map(|now| now.elapsed.as_micros() as i64)
            .unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        metadata_map(self.snapshot().as_ref())
    }
}

/// Start the MPRIS service on its own thread and return the handle the
/// player publishes through. Bus failures are logged and leave the rest of
/// the application running.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let path = "/org/mpris/MediaPlayer2";

            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!("MPRIS: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection
                .request_name("org.mpris.MediaPlayer2.attacca")
                .await
            {
                warn!("MPRIS: failed to acquire name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(path, RootIface { tx: tx.clone() }).await {
                warn!("MPRIS: failed to register root iface: {e}");
                return;
            }

            if let Err(e) = object_server
                .at(
                    path,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!("MPRIS: failed to register player iface: {e}");
                return;
            }

            // Keep the service alive.
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}
