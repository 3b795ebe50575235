use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::Settings;
use crate::library::AudioItem;
use crate::mpris::ControlCmd;
use crate::player::Player;
use crate::ui;

/// Main terminal event loop: drives the player tick, drains remote control
/// commands, draws the UI and handles keys. Returns `Ok(())` on shutdown.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    player: &mut Player,
    items: &[AudioItem],
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut selected: usize = 0;

    loop {
        player.tick();

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, player, items)? {
                return Ok(());
            }
        }

        terminal.draw(|f| ui::draw(f, player, items, selected, settings))?;

        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, player, items, &mut selected)? {
                    return Ok(());
                }
            }
        }
    }
}

/// Lazily hand the scanned items to the player the first time a command
/// needs a playlist.
fn ensure_playlist(player: &mut Player, items: &[AudioItem]) {
    if player.playlist().is_empty() {
        player.set_playlist(items.to_vec());
    }
}

fn handle_control_cmd(
    cmd: ControlCmd,
    player: &mut Player,
    items: &[AudioItem],
) -> Result<bool, Box<dyn std::error::Error>> {
    match cmd {
        ControlCmd::Quit => return Ok(true),
        ControlCmd::Play => player.resume(),
        ControlCmd::Pause => player.pause(),
        ControlCmd::PlayPause => {
            ensure_playlist(player, items);
            let _ = player.toggle_play_pause();
        }
        ControlCmd::Stop => player.stop(),
        ControlCmd::Next => {
            ensure_playlist(player, items);
            let _ = player.next();
        }
        ControlCmd::Prev => {
            ensure_playlist(player, items);
            let _ = player.previous();
        }
        ControlCmd::SeekTo(pos) => player.seek(pos),
    }
    Ok(false)
}

fn handle_key_event(
    key: KeyEvent,
    settings: &Settings,
    player: &mut Player,
    items: &[AudioItem],
    selected: &mut usize,
) -> Result<bool, Box<dyn std::error::Error>> {
    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('j') | KeyCode::Down => {
            if !items.is_empty() {
                *selected = if *selected + 1 >= items.len() {
                    0
                } else {
                    *selected + 1
                };
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if !items.is_empty() {
                *selected = if *selected == 0 {
                    items.len() - 1
                } else {
                    *selected - 1
                };
            }
        }
        KeyCode::Enter => {
            if let Some(item) = items.get(*selected).cloned() {
                ensure_playlist(player, items);
                let _ = player.play_item(&item);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            ensure_playlist(player, items);
            let _ = player.toggle_play_pause();
        }
        KeyCode::Char('l') => {
            ensure_playlist(player, items);
            let _ = player.next();
        }
        KeyCode::Char('h') => {
            ensure_playlist(player, items);
            let _ = player.previous();
        }
        KeyCode::Char('L') => {
            let step = Duration::from_secs(settings.controls.scrub_seconds);
            player.seek(player.elapsed() + step);
        }
        KeyCode::Char('H') => {
            let step = Duration::from_secs(settings.controls.scrub_seconds);
            player.seek(player.elapsed().saturating_sub(step));
        }
        KeyCode::Char('>') | KeyCode::Char(']') => player.speed_up(),
        KeyCode::Char('<') | KeyCode::Char('[') => player.speed_down(),
        KeyCode::Char('r') => player.toggle_loop(),
        KeyCode::Char('s') => player.stop(),
        _ => {}
    }

    Ok(false)
}
