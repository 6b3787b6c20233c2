//! Terminal UI: transport bar, track list, loop timeline and oscilloscope.

mod timeline;
mod tracks;
mod transport;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

use timeline::render_timeline;
use tracks::render_tracks;
use transport::render_transport;
use waveform::render_waveform;

const HELP: &str = " [Space] Play/Stop  [R] Rec  [M] Click  [-/+] BPM  [A..K] Play  [Z/X] Oct  \
[Arrows] Cursor  [Enter/Del] Note  [C] Clear  [Tab] Track  [N] New  [Shift+M/S] Mute/Solo  \
[9/0] Vol  [,/.] Pan  [1-4] Wave  [[/]] Cutoff  [;/'] Res  [Q] Quit";

pub fn render(frame: &mut Frame, app: &App) {
    let track_rows = app.status.tracks.len() as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),          // Transport bar
            Constraint::Length(track_rows), // Tracks
            Constraint::Min(8),             // Timeline
            Constraint::Length(8),          // Waveform
            Constraint::Length(2),          // Help / messages
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], app);
    render_tracks(frame, chunks[1], app);
    render_timeline(frame, chunks[2], app);
    render_waveform(frame, chunks[3], &app.scope, app.status.peak);

    let mut lines = vec![Line::styled(HELP, Style::default().fg(Color::DarkGray))];
    if let Some(message) = &app.message {
        lines.push(Line::styled(format!(" {message}"), Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(lines), chunks[4]);
}
