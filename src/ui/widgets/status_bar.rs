//! Status bar widget.

use crate::ui::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the status bar
pub fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, hidden: usize) {
    let mut spans = vec![];

    // MQTT status
    let mqtt_text = if app.mqtt_connected { "MQTT ✓" } else { "MQTT ✗" };
    let mqtt_color = if app.mqtt_connected { Color::Green } else { Color::Red };
    spans.push(Span::styled(
        mqtt_text,
        Style::default().fg(mqtt_color).add_modifier(Modifier::BOLD),
    ));

    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        format!("{} sensors", app.grid.len()),
        Style::default().fg(Color::Cyan),
    ));
    if hidden > 0 {
        spans.push(Span::styled(
            format!(" ({} off-screen)", hidden),
            Style::default().fg(Color::Yellow),
        ));
    }

    spans.push(Span::raw(" │ "));
    spans.push(Span::raw(format!("rx {}", app.received)));
    if app.dropped > 0 {
        spans.push(Span::styled(
            format!(" dropped {}", app.dropped),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(status) = &app.status_message {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(status.as_str(), Style::default().fg(Color::Gray)));
    }

    spans.push(Span::styled(
        "  ? help",
        Style::default().fg(Color::DarkGray),
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
