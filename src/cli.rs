//! Command-line interface argument parsing.
//!
//! This module defines the CLI structure and parsing logic using gumdrop.
//! Every option is an override; anything left unset falls back to the
//! configuration file.

use gumdrop::Options;
use std::path::PathBuf;
use std::str::FromStr;

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert LogLevel to an EnvFilter directive
    pub fn to_filter_string(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Live MQTT temperature dashboard
#[derive(Debug, Options)]
pub struct Cli {
    #[options(help = "print help message")]
    pub help: bool,

    #[options(short = "V", help = "print version and exit")]
    pub version: bool,

    #[options(meta = "PATH", help = "path to configuration file (default: thermo-dashboard.toml)")]
    pub config: Option<PathBuf>,

    #[options(meta = "LEVEL", help = "log level: trace, debug, info, warn, error")]
    pub log_level: Option<LogLevel>,

    #[options(meta = "TOPIC", help = "MQTT topic to subscribe to (overrides config file)")]
    pub topic: Option<String>,

    #[options(no_short, meta = "HOST", help = "MQTT broker host (overrides config file)")]
    pub mqtt_host: Option<String>,

    #[options(no_short, meta = "PORT", help = "MQTT broker port (overrides config file)")]
    pub mqtt_port: Option<u16>,

    #[options(no_short, help = "log readings instead of drawing the dashboard")]
    pub headless: bool,

    #[options(no_short, help = "print the effective configuration as TOML and exit")]
    pub dump_config: bool,
}

impl Cli {
    /// Parse command-line arguments, exiting on error or `--help`
    pub fn from_env_args() -> Self {
        Self::parse_args_default_or_exit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Info.to_filter_string(), "info");
        assert_eq!(LogLevel::Debug.to_filter_string(), "debug");
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::parse_args_default::<&str>(&[]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.log_level.is_none());
        assert!(!cli.headless);
        assert!(!cli.dump_config);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::parse_args_default(&[
            "-c",
            "/etc/thermo.toml",
            "--headless",
            "--mqtt-port",
            "8883",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/thermo.toml")));
        assert!(cli.headless);
        assert_eq!(cli.mqtt_port, Some(8883));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::parse_args_default(&["--mqtt-port", "not-a-port"]).is_err());
    }
}
