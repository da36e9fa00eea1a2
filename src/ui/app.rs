//! Application state management for the TUI.
//!
//! This module owns the sensor grid and the UI flags. All mutation happens
//! on the UI thread through [`App::apply`].

use crate::subscriber::{DashboardEvent, LinkState};
use crate::ui::grid::{SensorGrid, Upsert};
use crate::ui::widgets::backdrop::Backdrop;
use tokio::sync::mpsc;

/// Application state
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,
    /// Show help panel
    pub show_help: bool,
    /// Sensor cells keyed by name
    pub grid: SensorGrid,
    /// Decorative logo behind the grid
    pub backdrop: Backdrop,
    /// Broker link status
    pub mqtt_connected: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Readings applied to the grid
    pub received: u64,
    /// Messages that could not be decoded
    pub dropped: u64,
}

impl App {
    /// Create a new application state
    pub fn new(grid: SensorGrid, backdrop: Backdrop) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            grid,
            backdrop,
            mqtt_connected: false,
            status_message: Some("Waiting for broker".to_string()),
            received: 0,
            dropped: 0,
        }
    }

    /// Apply one event from the subscriber
    pub fn apply(&mut self, event: DashboardEvent) -> Option<Upsert> {
        match event {
            DashboardEvent::Reading(reading) => {
                self.received += 1;
                let outcome = self.grid.upsert(&reading.name, reading.temp);
                if let Upsert::Created(pos) = outcome {
                    self.status_message = Some(format!(
                        "New sensor {} at row {}, col {}",
                        reading.name, pos.row, pos.col
                    ));
                }
                Some(outcome)
            }
            DashboardEvent::Link(state) => {
                self.mqtt_connected = state == LinkState::Connected;
                self.status_message = Some(
                    match state {
                        LinkState::Connected => "Connected to broker",
                        LinkState::Disconnected => "Broker link lost, reconnecting",
                    }
                    .to_string(),
                );
                None
            }
            DashboardEvent::Dropped => {
                self.dropped += 1;
                None
            }
        }
    }

    /// Apply everything currently queued without blocking
    pub fn drain(&mut self, events: &mut mpsc::Receiver<DashboardEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Toggle help panel
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Reading;
    use crate::subscriber::decode_event;

    fn app() -> App {
        App::new(SensorGrid::new(10, 100.0), Backdrop::builtin())
    }

    #[test]
    fn test_valid_reading_sets_state() {
        let mut app = app();
        app.apply(decode_event("t", br#"{"name":"A","temp":20}"#));
        app.apply(decode_event("t", br#"{"name":"A","temp":35}"#));
        assert_eq!(app.grid.len(), 1);
        assert_eq!(app.grid.get("A").unwrap().temp, 35.0);
        assert_eq!(app.received, 2);
    }

    #[test]
    fn test_bad_payloads_leave_state_unchanged() {
        let mut app = app();
        app.apply(DashboardEvent::Reading(Reading::new("A", 20.0)));

        let payloads: [&[u8]; 4] = [
            b"{broken",
            br#"{"name":"A"}"#,
            br#"{"temp":99}"#,
            br#"{"name":"B"}"#,
        ];
        for payload in payloads {
            app.apply(decode_event("t", payload));
        }

        assert_eq!(app.grid.len(), 1);
        assert_eq!(app.grid.get("A").unwrap().temp, 20.0);
        assert_eq!(app.dropped, 4);
    }

    #[test]
    fn test_link_events_update_status() {
        let mut app = app();
        app.apply(DashboardEvent::Link(LinkState::Connected));
        assert!(app.mqtt_connected);
        app.apply(DashboardEvent::Link(LinkState::Disconnected));
        assert!(!app.mqtt_connected);
    }

    #[test]
    fn test_drain_applies_queued_events() {
        let mut app = app();
        let (tx, mut rx) = mpsc::channel(8);
        tx.try_send(DashboardEvent::Reading(Reading::new("A", 1.0))).unwrap();
        tx.try_send(DashboardEvent::Reading(Reading::new("B", 2.0))).unwrap();
        tx.try_send(DashboardEvent::Dropped).unwrap();

        assert_eq!(app.drain(&mut rx), 3);
        assert_eq!(app.grid.len(), 2);
        assert_eq!(app.drain(&mut rx), 0);
        assert_eq!(
            app.status_message.as_deref(),
            Some("New sensor B at row 0, col 1")
        );
    }
}
