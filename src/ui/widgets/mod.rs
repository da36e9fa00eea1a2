//! UI widgets for the dashboard.

pub mod backdrop;
pub mod help;
pub mod sensor_grid;
pub mod status_bar;
pub mod thermometer;

pub use backdrop::render_backdrop;
pub use help::render_help;
pub use sensor_grid::render_sensor_grid;
pub use status_bar::render_status_bar;
