//! Top bar: tempo, transport state, loop position and the selected synth.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use loopstation::sequencing::TransportState;

use crate::app::App;

pub fn render_transport(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" loopstation ").borders(Borders::ALL);
    let status = &app.status;

    // 4/4: bar and beat from the loop position, both 1-based
    let bar = (status.beat_position / 4.0).floor() as u32 + 1;
    let beat = (status.beat_position % 4.0).floor() as u32 + 1;

    let (symbol, label, colour) = match status.transport_state() {
        TransportState::Stopped => ("■", "Stopped", Color::Yellow),
        TransportState::Playing => ("▶", "Playing", Color::Green),
        TransportState::Recording => ("●", "Recording", Color::Red),
    };

    let mut spans = vec![
        Span::styled(
            format!(" BPM: {:.0}  ", status.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{symbol} {label}  "), Style::default().fg(colour)),
        Span::styled(
            format!("Bar {bar} | Beat {beat}  "),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:5.2}/{:.0}  ", status.beat_position, status.loop_length),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            if status.metronome { "Click on  " } else { "Click off  " },
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Oct {}  ", app.octave),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if let Some((waveform, cutoff, resonance)) = app.synth_parameters() {
        spans.push(Span::styled(
            format!("{}  Cutoff {:.0}Hz  Res {:.2}", waveform.name(), cutoff, resonance),
            Style::default().fg(Color::Blue),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
