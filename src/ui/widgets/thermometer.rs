//! Thermometer widget for a single sensor cell.

use crate::reading::format_temp;
use crate::ui::grid::SensorCell;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Cell footprint in terminal columns and rows, borders included
pub const CELL_WIDTH: u16 = 17;
pub const CELL_HEIGHT: u16 = 9;

const BAR_WIDTH: usize = 3;

/// Number of bar rows to paint for a fill fraction.
///
/// The fraction itself is unclamped; the bar can only show 0..=height rows.
pub fn filled_rows(fraction: f64, height: u16) -> u16 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction * height as f64).round().clamp(0.0, height as f64) as u16
}

/// Render one sensor as label, vertical fill bar and value text
pub fn render_thermometer(frame: &mut Frame, area: Rect, cell: &SensorCell, fraction: f64) {
    let block = Block::default()
        .title(Line::from(Span::styled(
            format!(" {} ", cell.name),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )).centered())
        .title_bottom(Line::from(Span::styled(
            cell.last_update.format("%H:%M:%S").to_string(),
            Style::default().fg(Color::DarkGray),
        )).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightBlue));

    let inner = block.inner(area);
    let bar_height = inner.height.saturating_sub(1);
    let filled = filled_rows(fraction, bar_height);
    let fill_color = if fraction > 1.0 { Color::LightRed } else { Color::Red };

    let mut lines: Vec<Line> = (0..bar_height)
        .map(|row| {
            if row >= bar_height - filled {
                Line::from(Span::styled(
                    "█".repeat(BAR_WIDTH),
                    Style::default().fg(fill_color),
                ))
            } else {
                Line::from(Span::styled(
                    "░".repeat(BAR_WIDTH),
                    Style::default().fg(Color::Gray),
                ))
            }
        })
        .collect();

    lines.push(Line::from(Span::styled(
        format_temp(cell.temp),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
