use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::config::{MemoryStateStore, StateStore};
use crate::library::{AudioItem, ItemKind};

use super::backend::{OutputBackend, OutputHandle};
use super::coordinator::Player;
use super::types::{MetadataSurface, NowPlaying, PlaybackError, PlaybackState};

#[derive(Debug, Default)]
struct FakeState {
    playing: bool,
    stopped: bool,
    rate: f32,
    position: Duration,
    duration: Duration,
    finished: bool,
}

struct FakeHandle {
    state: Rc<RefCell<FakeState>>,
}

impl OutputHandle for FakeHandle {
    fn play(&mut self) {
        self.state.borrow_mut().playing = true;
    }

    fn pause(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.stopped = true;
    }

    fn set_rate(&mut self, rate: f32) {
        self.state.borrow_mut().rate = rate;
    }

    fn set_position(&mut self, position: Duration) {
        self.state.borrow_mut().position = position;
    }

    fn position(&self) -> Duration {
        self.state.borrow().position
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.state.borrow().duration)
    }

    fn is_finished(&self) -> bool {
        self.state.borrow().finished
    }
}

#[derive(Default)]
struct FakeBackendInner {
    opened: Vec<PathBuf>,
    handles: Vec<Rc<RefCell<FakeState>>>,
    fail_on: Option<PathBuf>,
}

#[derive(Clone, Default)]
struct FakeBackend {
    inner: Rc<RefCell<FakeBackendInner>>,
}

impl FakeBackend {
    fn failing_on(path: &str) -> Self {
        let backend = Self::default();
        backend.inner.borrow_mut().fail_on = Some(PathBuf::from(path));
        backend
    }

    fn opened(&self) -> Vec<PathBuf> {
        self.inner.borrow().opened.clone()
    }

    fn handle(&self, index: usize) -> Rc<RefCell<FakeState>> {
        self.inner.borrow().handles[index].clone()
    }

    fn last_handle(&self) -> Rc<RefCell<FakeState>> {
        self.inner.borrow().handles.last().unwrap().clone()
    }
}

impl OutputBackend for FakeBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn OutputHandle>, PlaybackError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_on.as_deref() == Some(path) {
            return Err(PlaybackError::Unloadable {
                path: path.to_path_buf(),
                reason: "fake backend refused".to_string(),
            });
        }
        let state = Rc::new(RefCell::new(FakeState {
            duration: Duration::from_secs(180),
            ..FakeState::default()
        }));
        inner.opened.push(path.to_path_buf());
        inner.handles.push(state.clone());
        Ok(Box::new(FakeHandle { state }))
    }
}

#[derive(Clone, Default)]
struct RecordingSurface {
    published: Rc<RefCell<Vec<NowPlaying>>>,
}

impl MetadataSurface for RecordingSurface {
    fn publish(&self, info: &NowPlaying) {
        self.published.borrow_mut().push(info.clone());
    }
}

fn track(name: &str) -> AudioItem {
    AudioItem::file(name, ItemKind::Audio, format!("/music/{name}"))
}

fn player_with(backend: &FakeBackend) -> (Player, MemoryStateStore) {
    let store = MemoryStateStore::default();
    let player = Player::new(Box::new(backend.clone()), Box::new(store.clone()));
    (player, store)
}

#[test]
fn play_item_starts_playback_at_current_rate() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("one.mp3")).unwrap();

    assert!(player.is_playing());
    assert_eq!(player.playback_state(), PlaybackState::Playing);
    assert_eq!(player.current().unwrap().name, "one.mp3");
    assert_eq!(player.duration(), Duration::from_secs(180));
    assert_eq!(player.elapsed(), Duration::ZERO);

    let h = backend.last_handle();
    assert!(h.borrow().playing);
    assert_eq!(h.borrow().rate, 1.0);
}

#[test]
fn playing_same_item_twice_pauses_instead_of_reloading() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    let item = track("one.mp3");

    player.play_item(&item).unwrap();
    player.play_item(&item).unwrap();

    assert!(!player.is_playing());
    assert_eq!(player.playback_state(), PlaybackState::Paused);
    assert_eq!(player.current().unwrap().name, "one.mp3");
    assert_eq!(backend.opened().len(), 1);

    // A third request resumes the same handle.
    player.play_item(&item).unwrap();
    assert!(player.is_playing());
    assert_eq!(backend.opened().len(), 1);
}

#[test]
fn empty_path_item_is_ignored() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("one.mp3")).unwrap();
    let blank = AudioItem::file("ghost.mp3", ItemKind::Audio, "");
    player.play_item(&blank).unwrap();

    assert!(player.is_playing());
    assert_eq!(player.current().unwrap().name, "one.mp3");
    assert_eq!(backend.opened().len(), 1);
}

#[test]
fn failed_load_leaves_previous_track_untouched() {
    let backend = FakeBackend::failing_on("/music/bad.mp3");
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("one.mp3")).unwrap();
    let err = player.play_item(&track("bad.mp3")).unwrap_err();

    assert!(matches!(err, PlaybackError::Unloadable { .. }));
    assert!(player.is_playing());
    assert_eq!(player.current().unwrap().name, "one.mp3");

    let old = backend.handle(0);
    assert!(old.borrow().playing);
    assert!(!old.borrow().stopped);
}

#[test]
fn next_and_previous_wrap_around_the_playlist() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    let items = vec![track("a.mp3"), track("b.mp3"), track("c.mp3")];
    player.set_playlist(items.clone());

    player.play_item(&items[2]).unwrap();

    player.next().unwrap();
    assert_eq!(player.current().unwrap().name, "a.mp3");

    player.previous().unwrap();
    assert_eq!(player.current().unwrap().name, "c.mp3");

    player.previous().unwrap();
    assert_eq!(player.current().unwrap().name, "b.mp3");
}

#[test]
fn step_with_no_current_plays_first_entry() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    player.set_playlist(vec![track("a.mp3"), track("b.mp3")]);

    player.next().unwrap();
    assert_eq!(player.current().unwrap().name, "a.mp3");
}

#[test]
fn step_with_current_outside_playlist_plays_first_entry() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("elsewhere.mp3")).unwrap();
    player.set_playlist(vec![track("a.mp3"), track("b.mp3")]);

    player.previous().unwrap();
    assert_eq!(player.current().unwrap().name, "a.mp3");
}

#[test]
fn step_with_empty_playlist_toggles_current() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("one.mp3")).unwrap();
    player.next().unwrap();
    assert!(!player.is_playing());

    player.next().unwrap();
    assert!(player.is_playing());
    assert_eq!(backend.opened().len(), 1);
}

#[test]
fn step_with_nothing_at_all_is_a_no_op() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.next().unwrap();
    player.previous().unwrap();
    assert!(player.current().is_none());
    assert!(backend.opened().is_empty());
}

#[test]
fn toggle_play_pause_falls_back_to_first_playlist_entry() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    // Nothing loaded, nothing listed.
    player.toggle_play_pause().unwrap();
    assert!(backend.opened().is_empty());

    player.set_playlist(vec![track("a.mp3")]);
    player.toggle_play_pause().unwrap();
    assert_eq!(player.current().unwrap().name, "a.mp3");
    assert!(player.is_playing());
}

#[test]
fn speed_steps_saturate_at_both_bounds() {
    let backend = FakeBackend::default();
    let (mut player, store) = player_with(&backend);

    for _ in 0..30 {
        player.speed_up();
    }
    assert_eq!(player.rate(), 3.0);
    assert_eq!(store.snapshot().speed_rate, 3.0);

    for _ in 0..40 {
        player.speed_down();
    }
    assert_eq!(player.rate(), 0.1);
    assert_eq!(store.snapshot().speed_rate, 0.1);
}

#[test]
fn rate_applies_to_the_live_handle_and_survives_track_change() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("a.mp3")).unwrap();
    player.speed_up();
    assert!((backend.handle(0).borrow().rate - 1.1).abs() < 1e-6);

    player.play_item(&track("b.mp3")).unwrap();
    assert!((backend.handle(1).borrow().rate - 1.1).abs() < 1e-6);
}

#[test]
fn restored_rate_comes_from_the_store() {
    let backend = FakeBackend::default();
    let mut store = MemoryStateStore::default();
    store.set_speed_rate(2.0);
    store.set_single_loop(true);

    let player = Player::new(Box::new(backend), Box::new(store));
    assert_eq!(player.rate(), 2.0);
    assert!(player.single_loop());
}

#[test]
fn toggle_loop_writes_through_to_the_store() {
    let backend = FakeBackend::default();
    let (mut player, store) = player_with(&backend);

    player.toggle_loop();
    assert!(player.single_loop());
    assert!(store.snapshot().single_loop);

    player.toggle_loop();
    assert!(!player.single_loop());
    assert!(!store.snapshot().single_loop);
}

#[test]
fn completion_with_single_loop_replays_from_the_start() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    player.set_playlist(vec![track("a.mp3"), track("b.mp3")]);
    player.toggle_loop();

    player.play_item(&track("a.mp3")).unwrap();
    player.seek(Duration::from_secs(175));

    player.on_track_finished();

    assert_eq!(player.current().unwrap().name, "a.mp3");
    assert!(player.is_playing());
    assert_eq!(player.elapsed(), Duration::ZERO);
    assert_eq!(
        backend.opened(),
        vec![PathBuf::from("/music/a.mp3"), PathBuf::from("/music/a.mp3")]
    );
}

#[test]
fn completion_without_loop_advances_to_the_next_entry() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    player.set_playlist(vec![track("a.mp3"), track("b.mp3")]);

    player.play_item(&track("a.mp3")).unwrap();
    player.on_track_finished();

    assert_eq!(player.current().unwrap().name, "b.mp3");
    assert!(player.is_playing());
}

#[test]
fn decode_error_stops_then_advances() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    player.set_playlist(vec![track("a.mp3"), track("b.mp3")]);

    player.play_item(&track("a.mp3")).unwrap();
    player.on_decode_error();

    assert!(backend.handle(0).borrow().stopped);
    assert_eq!(player.current().unwrap().name, "b.mp3");
    assert!(player.is_playing());
}

#[test]
fn tick_detects_end_of_track() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    player.set_playlist(vec![track("a.mp3"), track("b.mp3")]);

    player.play_item(&track("a.mp3")).unwrap();
    backend.handle(0).borrow_mut().finished = true;

    std::thread::sleep(Duration::from_millis(12));
    player.tick();

    assert_eq!(player.current().unwrap().name, "b.mp3");
    assert!(player.is_playing());
}

#[test]
fn tick_reads_progress_from_the_handle() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("a.mp3")).unwrap();
    backend.handle(0).borrow_mut().position = Duration::from_secs(42);

    std::thread::sleep(Duration::from_millis(12));
    player.tick();

    assert_eq!(player.elapsed(), Duration::from_secs(42));
}

#[test]
fn seek_moves_the_handle_and_the_elapsed_clock() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("a.mp3")).unwrap();
    player.seek(Duration::from_secs(200));

    assert_eq!(player.elapsed(), Duration::from_secs(200));
    assert_eq!(
        backend.handle(0).borrow().position,
        Duration::from_secs(200)
    );
}

#[test]
fn stop_drops_the_handle_and_resets_elapsed() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("a.mp3")).unwrap();
    player.seek(Duration::from_secs(30));
    player.stop();

    assert!(backend.handle(0).borrow().stopped);
    assert!(!player.is_playing());
    assert_eq!(player.elapsed(), Duration::ZERO);
    assert_eq!(player.playback_state(), PlaybackState::Stopped);

    // Idempotent.
    player.stop();
}

#[test]
fn interruption_resumes_only_its_own_pause() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.play_item(&track("a.mp3")).unwrap();
    player.interruption_began();
    assert!(!player.is_playing());

    player.interruption_ended();
    assert!(player.is_playing());

    // A pause the user asked for stays paused.
    player.pause();
    player.interruption_ended();
    assert!(!player.is_playing());
}

#[test]
fn interruption_while_stopped_does_nothing() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    player.interruption_began();
    player.interruption_ended();
    assert!(!player.is_playing());
    assert!(backend.opened().is_empty());
}

#[test]
fn release_is_idempotent_and_silences_the_tick() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    let ticks = Rc::new(RefCell::new(0u32));
    let ticks_seen = ticks.clone();
    player.on_status_changed(move || {
        *ticks_seen.borrow_mut() += 1;
    });

    player.play_item(&track("a.mp3")).unwrap();
    let after_load = *ticks.borrow();

    player.release();
    player.release();

    assert!(!player.is_playing());
    assert!(backend.handle(0).borrow().stopped);

    std::thread::sleep(Duration::from_millis(12));
    player.tick();
    assert_eq!(*ticks.borrow(), after_load);
}

#[test]
fn title_callback_receives_the_stripped_title() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);

    let titles = Rc::new(RefCell::new(Vec::<String>::new()));
    let seen = titles.clone();
    player.on_title_changed(move |t| {
        seen.borrow_mut().push(t.to_string());
    });

    player.play_item(&track("song.mp3")).unwrap();
    assert_eq!(titles.borrow().as_slice(), ["song".to_string()]);

    // Pausing the same item changes status, not the title.
    player.play_item(&track("song.mp3")).unwrap();
    assert_eq!(titles.borrow().len(), 1);
}

#[test]
fn metadata_surface_sees_load_pause_and_stop() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    let surface = RecordingSurface::default();
    player.set_metadata_surface(Box::new(surface.clone()));

    player.play_item(&track("song.mp3")).unwrap();
    player.pause();
    player.stop();

    let published = surface.published.borrow();
    assert_eq!(published.len(), 3);

    assert_eq!(published[0].title, "song");
    assert_eq!(published[0].state, PlaybackState::Playing);
    assert_eq!(published[0].rate, 1.0);

    assert_eq!(published[1].state, PlaybackState::Paused);
    assert_eq!(published[1].rate, 0.0);

    assert_eq!(published[2].state, PlaybackState::Stopped);
    assert_eq!(published[2].elapsed, Duration::ZERO);
}

#[test]
fn nothing_is_published_before_the_first_load() {
    let backend = FakeBackend::default();
    let (mut player, _store) = player_with(&backend);
    let surface = RecordingSurface::default();
    player.set_metadata_surface(Box::new(surface.clone()));

    player.pause();
    player.stop();

    assert!(surface.published.borrow().is_empty());
}
