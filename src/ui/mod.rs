//! Terminal UI module using ratatui.
//!
//! This module provides the live thermometer grid, drawn over a dimmed
//! logo with a status bar underneath.

pub mod app;
pub mod grid;
pub mod input;
pub mod widgets;

pub use app::App;
pub use input::{handle_input, InputAction};

use crate::error::UiError;
use crossterm::{cursor, execute, terminal};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io::{self, Stdout};

/// Owns the terminal while the dashboard runs and restores it on drop
pub struct TerminalGuard {
    pub terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn new() -> Result<Self, UiError> {
        terminal::enable_raw_mode().map_err(|e| UiError::InitializationError(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)
            .map_err(|e| UiError::InitializationError(e.to_string()))?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| UiError::InitializationError(e.to_string()))?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, app: &mut App, topic: &str) -> Result<(), UiError> {
        self.terminal
            .draw(|frame| render(frame, app, topic))
            .map(|_| ())
            .map_err(|e| UiError::RenderError(e.to_string()))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = terminal::disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            terminal::LeaveAlternateScreen,
            cursor::Show
        );
    }
}

/// Draw one frame of the dashboard
pub fn render(frame: &mut Frame, app: &mut App, topic: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(frame.area());

    widgets::render_backdrop(frame, chunks[0], &mut app.backdrop);
    let hidden = widgets::render_sensor_grid(frame, chunks[0], &app.grid);
    widgets::render_status_bar(frame, chunks[1], app, hidden);

    if app.show_help {
        widgets::render_help(frame, centered_rect(60, 70, frame.area()), topic);
    }
}

/// Rectangle covering the given percentages of `area`, centered
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Reading;
    use crate::subscriber::DashboardEvent;
    use crate::ui::grid::SensorGrid;
    use crate::ui::widgets::backdrop::Backdrop;
    use crate::ui::widgets::tests::buffer_text;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(SensorGrid::new(10, 100.0), Backdrop::from_text("LOGO").unwrap())
    }

    #[test]
    fn test_full_frame() {
        let mut app = app();
        app.apply(DashboardEvent::Reading(Reading::new("A", 20.0)));
        app.apply(DashboardEvent::Reading(Reading::new("A", 35.0)));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &mut app, "z/workshop/data")).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("35°C"));
        assert!(text.contains("1 sensors"));
        assert_eq!(text.matches("35°C").count(), 1);
    }

    #[test]
    fn test_resize_rescales_backdrop_once() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(f, &mut app, "t")).unwrap();
        terminal.draw(|f| render(f, &mut app, "t")).unwrap();
        assert_eq!(app.backdrop.rescales(), 1);

        terminal.backend_mut().resize(120, 40);
        terminal.draw(|f| render(f, &mut app, "t")).unwrap();
        assert_eq!(app.backdrop.rescales(), 2);
    }

    #[test]
    fn test_help_overlay() {
        let mut app = app();
        app.toggle_help();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| render(f, &mut app, "lab/temps")).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Keyboard Shortcuts"));
        assert!(text.contains("lab/temps"));
    }
}
