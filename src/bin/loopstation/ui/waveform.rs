//! Output scope with a peak readout.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Peaks at or above this are drawn as clipping.
const CLIP_LEVEL: f32 = 0.99;

pub fn render_waveform(frame: &mut Frame, area: Rect, samples: &[f32], peak: f32) {
    let color = if peak >= CLIP_LEVEL { Color::Red } else { Color::Cyan };
    let block = Block::default()
        .title(format!(" Output  peak {peak:.2} "))
        .borders(Borders::ALL);

    let width = samples.len().max(1) as f64;
    let points: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 / width, f64::from(s)))
        .collect();

    let trace = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let axis = |bounds: [f64; 2]| {
        Axis::default()
            .bounds(bounds)
            .style(Style::default().fg(Color::DarkGray))
    };

    let chart = Chart::new(vec![trace])
        .block(block)
        .x_axis(axis([0.0, 1.0]))
        .y_axis(axis([-1.0, 1.0]));

    frame.render_widget(chart, area);
}
