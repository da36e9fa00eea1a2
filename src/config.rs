//! Application configuration management.
//!
//! Configuration is layered with the `config` crate: built-in defaults, an
//! optional TOML file, `THERMO__*` environment variables, and finally CLI
//! overrides.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `THERMO__MQTT__HOST`
const ENV_PREFIX: &str = "THERMO";

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "thermo-dashboard.toml";

/// Top-level application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
    pub mqtt: MqttConfig,
    pub display: DisplayConfig,
}

/// Service runtime configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub auto_reconnect: bool,
    pub reconnect_delay_ms: u64,
    pub max_reconnect_delay_ms: u64,
    pub queue_capacity: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    pub json: bool,
    pub colored: bool,
}

/// MQTT broker configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
    /// Fixed client id; unset picks one unique to this process
    pub client_id: Option<String>,
    pub keep_alive_secs: u64,
    pub clean_session: bool,
    pub qos: u8,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Dashboard rendering configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Temperature that fills a thermometer completely
    pub max_temp: f64,
    pub blocks_per_row: usize,
    pub tick_ms: u64,
    /// Text-art logo drawn behind the grid; relative paths resolve next to the executable
    pub logo: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_delay_ms: 1000,
            max_reconnect_delay_ms: 60000,
            queue_capacity: 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
            colored: true,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "test.mosquitto.org".to_string(),
            port: 1883,
            topic: "z/workshop/data".to_string(),
            client_id: None,
            keep_alive_secs: 60,
            clean_session: true,
            qos: 0,
            username: None,
            password: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_temp: 100.0,
            blocks_per_row: 10,
            tick_ms: 100,
            logo: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file layered over defaults and the environment.
    ///
    /// When `required` is false a missing file is treated as empty.
    pub fn load<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        let path = path.as_ref();
        if required && !path.exists() {
            return Err(ConfigError::ReadError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ))
            .into());
        }

        let config: AppConfig = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.mqtt.host.is_empty() {
            return Err(invalid("mqtt.host", "cannot be empty"));
        }

        if self.mqtt.port == 0 {
            return Err(invalid("mqtt.port", "must be greater than 0"));
        }

        if self.mqtt.qos > 2 {
            return Err(invalid("mqtt.qos", "must be 0, 1, or 2"));
        }

        if self.mqtt.keep_alive_secs == 0 {
            return Err(invalid("mqtt.keep_alive_secs", "must be at least 1"));
        }

        if self.mqtt.topic.is_empty() {
            return Err(invalid("mqtt.topic", "cannot be empty"));
        }

        match (&self.mqtt.username, &self.mqtt.password) {
            (Some(_), None) => {
                return Err(invalid("mqtt.password", "required when mqtt.username is set"));
            }
            (None, Some(_)) => {
                return Err(invalid("mqtt.username", "required when mqtt.password is set"));
            }
            _ => {}
        }

        if self.display.blocks_per_row == 0 {
            return Err(invalid("display.blocks_per_row", "must be greater than 0"));
        }

        if !self.display.max_temp.is_finite() || self.display.max_temp <= 0.0 {
            return Err(invalid("display.max_temp", "must be a positive number"));
        }

        if self.display.tick_ms == 0 {
            return Err(invalid("display.tick_ms", "must be greater than 0"));
        }

        if self.service.queue_capacity == 0 {
            return Err(invalid("service.queue_capacity", "must be greater than 0"));
        }

        if self.service.reconnect_delay_ms > self.service.max_reconnect_delay_ms {
            return Err(invalid(
                "service.reconnect_delay_ms",
                "cannot exceed service.max_reconnect_delay_ms",
            ));
        }

        Ok(())
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(host) = &cli.mqtt_host {
            self.mqtt.host = host.clone();
        }

        if let Some(port) = cli.mqtt_port {
            self.mqtt.port = port;
        }

        if let Some(topic) = &cli.topic {
            self.mqtt.topic = topic.clone();
        }

        if let Some(level) = cli.log_level {
            self.logging.level = level.to_filter_string().to_string();
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }
}

fn invalid(field: &str, message: &str) -> crate::error::AppError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}
