//! Terminal runtime: wires the scanner, player, MPRIS service and UI
//! together and owns the terminal for the lifetime of the session.

use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::{FileStateStore, resolve_state_path};
use crate::library::{TypeTag, flatten_items, scan};
use crate::mpris::ControlCmd;
use crate::player::{Player, RodioBackend};

mod event_loop;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = startup::load_settings();

    let dir = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| {
        env::current_dir().unwrap_or_else(|_| PathBuf::from("Music"))
    });

    let root = scan(&dir, &settings.library);
    let items = flatten_items(&root, TypeTag::Audio);

    let state_path = resolve_state_path().unwrap_or_else(|| PathBuf::from("attacca-state.toml"));
    let store = FileStateStore::open(state_path);

    let backend = RodioBackend::new()?;
    let mut player = Player::new(Box::new(backend), Box::new(store));

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    player.set_metadata_surface(Box::new(mpris.clone()));

    if let Some(artwork) = settings.ui.artwork.clone() {
        player.set_artwork(artwork);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut player, &items, &control_rx);

    player.release();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
