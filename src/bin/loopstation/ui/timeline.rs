//! Timeline widget - the loop's notes as a small piano roll with playhead

use std::collections::BTreeSet;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use loopstation::io::converter::midi_note_name;

use crate::app::App;

const LABEL_WIDTH: u16 = 6;

pub fn render_timeline(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" Loop ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || inner.width < LABEL_WIDTH + 16 {
        return;
    }

    let status = &app.status;
    let loop_length = status.loop_length.max(1.0);
    let width = inner.width.saturating_sub(LABEL_WIDTH) as usize;
    let chars_per_beat = width as f64 / loop_length;
    let column = |beat: f64| ((beat * chars_per_beat) as usize).min(width.saturating_sub(1));

    let mut lines = Vec::new();

    // Bar markers
    let mut markers = " ".repeat(LABEL_WIDTH as usize);
    for col in 0..width {
        let beat = col as f64 / chars_per_beat;
        let prev = (col as f64 - 1.0) / chars_per_beat;
        markers.push(if col == 0 || beat.floor() != prev.floor() {
            if beat.floor() as u32 % 4 == 0 { '|' } else { '.' }
        } else {
            ' '
        });
    }
    lines.push(Line::styled(markers, Style::default().fg(Color::DarkGray)));

    // Highest pitch on top; always show the cursor's row.
    let mut pitches: BTreeSet<i32> = status.notes.iter().map(|n| n.pitch as i32).collect();
    pitches.insert(app.cursor_pitch);
    let rows = inner.height.saturating_sub(2) as usize;

    for pitch in pitches.iter().rev().take(rows) {
        let mut cells = vec!['░'; width];
        for note in status.notes.iter().filter(|n| n.pitch as i32 == *pitch) {
            let start = column(note.start_beat);
            let len = ((note.duration_beats * chars_per_beat).round() as usize).max(1);
            for offset in 0..len {
                cells[(start + offset) % width] = '▓';
            }
        }

        let on_cursor_row = *pitch == app.cursor_pitch;
        if on_cursor_row {
            cells[column(app.cursor_beat)] = '◆';
        }

        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<5} ", midi_note_name(*pitch as u8)),
                Style::default().fg(if on_cursor_row { Color::Yellow } else { Color::White }),
            ),
            Span::styled(cells.into_iter().collect::<String>(), Style::default().fg(Color::Cyan)),
        ]));
    }

    // Playhead
    let mut playhead = " ".repeat(LABEL_WIDTH as usize);
    let head = column(status.beat_position);
    for col in 0..width {
        playhead.push(if col == head { '▲' } else { ' ' });
    }
    lines.push(Line::styled(playhead, Style::default().fg(Color::Yellow)));

    frame.render_widget(Paragraph::new(lines), inner);
}
