//! Help panel widget.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn key_line(keys: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<9}", keys), Style::default().fg(Color::Cyan)),
        Span::raw(format!("- {}", description)),
    ])
}

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

/// Render the help panel
pub fn render_help(frame: &mut Frame, area: Rect, topic: &str) {
    // Clear the area first
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let help_text = vec![
        Line::from(""),
        heading("Controls"),
        key_line("?/h/F1", "Toggle this help"),
        key_line("q/Esc", "Quit application"),
        Line::from(""),
        heading("Dashboard"),
        Line::from(vec![
            Span::raw("  Listening on "),
            Span::styled(topic.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from("  Each sensor gets one cell, placed in order of first reading."),
        Line::from("  Bars fill linearly up to the configured maximum."),
        Line::from(""),
        heading("Status Indicators"),
        Line::from(vec![
            Span::styled("  MQTT ✓", Style::default().fg(Color::Green)),
            Span::raw(" - Broker connected"),
        ]),
        Line::from(vec![
            Span::styled("  MQTT ✗", Style::default().fg(Color::Red)),
            Span::raw(" - Broker disconnected"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("?", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" to close this help"),
        ]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}
