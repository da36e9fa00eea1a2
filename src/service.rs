//! Service layer wiring the subscriber to the dashboard.
//!
//! The subscriber and the signal watcher run on a tokio runtime. The
//! dashboard loop runs on the calling thread and is the only owner of the
//! sensor grid; it learns about readings by draining the event queue.

use crate::config::AppConfig;
use crate::error::{Result, ServiceError, UiError};
use crate::mqtt_handler::MqttHandler;
use crate::reading::format_temp;
use crate::subscriber::{DashboardEvent, LinkState, ReconnectPolicy, Subscriber};
use crate::ui::grid::{SensorGrid, Upsert};
use crate::ui::widgets::backdrop::Backdrop;
use crate::ui::{handle_input, App, InputAction, TerminalGuard};
use futures_util::StreamExt;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Run mode for the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Interactive mode with TUI
    Interactive,
    /// Log readings, no drawing
    Headless,
}

pub struct DashboardService {
    config: AppConfig,
    runtime: Runtime,
    shutdown: CancellationToken,
}

impl DashboardService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("thermo-net")
            .enable_all()
            .build()
            .map_err(|e| ServiceError::InitializationError(e.to_string()))?;

        Ok(Self {
            config,
            runtime,
            shutdown: CancellationToken::new(),
        })
    }

    /// Token that stops the service when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until quit, a shutdown signal, or a fatal subscriber error
    pub fn run(self, mode: RunMode) -> Result<()> {
        // An unreadable configured logo is fatal in either mode.
        let backdrop = match &self.config.display.logo {
            Some(path) => Backdrop::load(path)?,
            None => Backdrop::builtin(),
        };
        let grid = SensorGrid::new(self.config.display.blocks_per_row, self.config.display.max_temp);
        let mut app = App::new(grid, backdrop);

        let (tx, mut rx) = mpsc::channel(self.config.service.queue_capacity);
        let handler = {
            let _guard = self.runtime.enter();
            MqttHandler::new(&self.config.mqtt)?
        };
        tracing::info!(
            "Subscribing to {} on {}:{}",
            self.config.mqtt.topic,
            self.config.mqtt.host,
            self.config.mqtt.port
        );

        let subscriber = Subscriber::new(handler, tx, ReconnectPolicy::from_config(&self.config.service));
        let shutdown = self.shutdown_token();
        let subscriber_task = self.runtime.spawn(async move {
            let result = subscriber.run(shutdown.clone()).await;
            shutdown.cancel();
            result
        });

        self.setup_signal_handler()?;

        let ui_result = match mode {
            RunMode::Interactive => self.run_interactive(&mut app, &mut rx),
            RunMode::Headless => self.run_headless(&mut app, &mut rx),
        };

        self.shutdown.cancel();
        drop(rx);
        let subscriber_result = self
            .runtime
            .block_on(subscriber_task)
            .map_err(|e| ServiceError::RuntimeError(e.to_string()))?;
        self.runtime.shutdown_timeout(Duration::from_secs(1));

        tracing::info!(
            "Dashboard stopped after {} readings from {} sensors in {} rows ({} logo rescales)",
            app.received,
            app.grid.len(),
            app.grid.rows(),
            app.backdrop.rescales()
        );
        ui_result?;
        subscriber_result
    }

    fn run_interactive(&self, app: &mut App, events: &mut mpsc::Receiver<DashboardEvent>) -> Result<()> {
        tracing::info!("Starting dashboard in interactive mode");
        let tick = Duration::from_millis(self.config.display.tick_ms);
        let mut screen = TerminalGuard::new()?;

        while !app.should_quit && !self.shutdown.is_cancelled() {
            app.drain(events);
            screen.draw(app, &self.config.mqtt.topic)?;

            match handle_input(tick).map_err(|e| UiError::InputError(e.to_string()))? {
                InputAction::Quit => app.quit(),
                InputAction::ToggleHelp => app.toggle_help(),
                InputAction::None => {}
            }
        }

        Ok(())
    }

    fn run_headless(&self, app: &mut App, events: &mut mpsc::Receiver<DashboardEvent>) -> Result<()> {
        tracing::info!("Starting dashboard in headless mode");
        self.runtime.block_on(async {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => break,
                    event = events.recv() => event,
                };
                let Some(event) = event else { break };
                log_event(app, event);
            }
        });
        Ok(())
    }

    /// Cancel the shutdown token on SIGINT or SIGTERM
    fn setup_signal_handler(&self) -> Result<()> {
        let signals = {
            let _guard = self.runtime.enter();
            Signals::new([SIGINT, SIGTERM])
                .map_err(|e| ServiceError::SignalError(e.to_string()))?
        };
        let handle = signals.handle();
        let shutdown = self.shutdown_token();

        self.runtime.spawn(async move {
            let mut signals = signals;
            tokio::select! {
                _ = shutdown.cancelled() => {}
                signal = signals.next() => {
                    if let Some(signal) = signal {
                        tracing::info!("Received shutdown signal {}", signal);
                        shutdown.cancel();
                    }
                }
            }
            handle.close();
        });

        Ok(())
    }
}

/// Apply an event and describe it in the log
fn log_event(app: &mut App, event: DashboardEvent) {
    match event {
        DashboardEvent::Reading(reading) => {
            let name = reading.name.clone();
            let temp = format_temp(reading.temp);
            match app.apply(DashboardEvent::Reading(reading)) {
                Some(Upsert::Created(pos)) => tracing::info!(
                    "New sensor {} at row {}, col {}: {}",
                    name,
                    pos.row,
                    pos.col,
                    temp
                ),
                _ => {
                    let updates = app.grid.get(&name).map(|c| c.updates).unwrap_or(0);
                    match app.grid.position(&name) {
                        Some(pos) => tracing::info!(
                            "{} at row {}, col {}: {} (update {})",
                            name,
                            pos.row,
                            pos.col,
                            temp,
                            updates
                        ),
                        None => tracing::info!("{}: {} (update {})", name, temp, updates),
                    }
                }
            }
        }
        DashboardEvent::Link(state) => {
            match state {
                LinkState::Connected => tracing::info!("Broker connected"),
                LinkState::Disconnected => tracing::warn!("Broker disconnected"),
            }
            app.apply(DashboardEvent::Link(state));
        }
        DashboardEvent::Dropped => {
            app.apply(DashboardEvent::Dropped);
        }
    }
}
