//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::config::Settings;
use crate::library::AudioItem;
use crate::player::{PlaybackState, Player};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[enter] play selected song".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next song".to_string(),
        format!("[H/L] scrub -/+{}s", scrub_seconds),
        "[</>] speed -/+".to_string(),
        "[r] loop one".to_string(),
        "[s] stop".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the one-line now-playing summary from the player's state.
fn now_playing_text(player: &Player) -> String {
    let mut parts: Vec<String> = Vec::new();

    match player.current() {
        Some(item) => {
            let mut song = item.display_title().to_string();
            let tags: Vec<&str> = item
                .artist
                .as_deref()
                .into_iter()
                .chain(item.album.as_deref())
                .collect();
            if !tags.is_empty() {
                song.push_str(&format!(" ({})", tags.join(" - ")));
            }
            parts.push(format!("Song: {}", song));
            parts.push(format!(
                "[{} / {}]",
                format_mmss(player.elapsed()),
                format_mmss(player.duration())
            ));
            let state = match player.playback_state() {
                PlaybackState::Playing => "Playing",
                PlaybackState::Paused => "Paused",
                PlaybackState::Stopped => "Stopped",
            };
            parts.push(state.to_string());
        }
        None => parts.push("Stopped".to_string()),
    }

    parts.push(format!("{:.1}x", player.rate()));
    if player.single_loop() {
        parts.push("Loop: ONE".to_string());
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    player: &Player,
    items: &[AudioItem],
    selected: usize,
    settings: &Settings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" attacca ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = Paragraph::new(now_playing_text(player))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Main list
    let current_path = player.current().map(|c| c.path.as_path());
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let marker = if Some(item.path.as_path()) == current_path {
                "> "
            } else {
                "  "
            };
            ListItem::new(format!("{marker}{}", item.display_title()))
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::bordered().title(" songs "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(selected.min(items.len() - 1)));
    }
    frame.render_stateful_widget(list, chunks[2], &mut list_state);

    // Controls
    let controls = Paragraph::new(controls_text(settings.controls.scrub_seconds))
        .alignment(Alignment::Center)
        .block(Block::bordered().title(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(controls, chunks[3]);
}
