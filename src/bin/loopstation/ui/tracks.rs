//! Track list widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub fn render_tracks(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" Tracks ").borders(Borders::ALL);
    let any_soloed = app.status.tracks.iter().any(|t| t.soloed);

    let lines: Vec<Line> = app
        .status
        .tracks
        .iter()
        .map(|track| {
            let selected = track.index == app.status.selected_track;
            let audible = !track.muted && (!any_soloed || track.soloed);

            let mut name_style = Style::default().fg(if audible { Color::White } else { Color::DarkGray });
            if selected {
                name_style = name_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }

            Line::from(vec![
                Span::raw(if selected { " > " } else { "   " }),
                Span::styled(format!("{:<12}", track.name), name_style),
                Span::styled(
                    format!(
                        " {:<14}",
                        track.generator.as_deref().unwrap_or("(empty)")
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!(" Vol {:4.2}  Pan {:+5.2} ", track.volume, track.pan),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    if track.muted { " M " } else { "   " },
                    Style::default().fg(Color::Red),
                ),
                Span::styled(
                    if track.soloed { " S " } else { "   " },
                    Style::default().fg(Color::Yellow),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
