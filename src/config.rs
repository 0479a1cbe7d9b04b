//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! radio-config.toml file. It provides a centralized way to configure the
//! GPIO wiring of the receiver module and the polling behavior of the
//! application.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration loaded from radio-config.toml
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Receiver module wiring
    pub receiver: ReceiverConfig,
    /// Polling behavior
    pub poll: PollConfig,
}

/// GPIO wiring of the DCF77 receiver module
#[derive(Debug, Deserialize, Serialize)]
pub struct ReceiverConfig {
    /// BCM number of the demodulated data line
    pub data_pin: u8,
    /// BCM number of the power-enable (PON) line
    pub power_pin: u8,
}

/// Polling configuration for the status loop
#[derive(Debug, Deserialize, Serialize)]
pub struct PollConfig {
    /// Interval between status polls in milliseconds
    pub interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            receiver: ReceiverConfig {
                data_pin: 4,   // Pin 7, next to the ground pin most modules need
                power_pin: 17, // Pin 11
            },
            poll: PollConfig { interval_ms: 1000 },
        }
    }
}

impl Config {
    /// Load configuration from radio-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path("radio-config.toml")
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    println!(
                        "Loaded configuration: data GPIO {}, power GPIO {}",
                        config.receiver.data_pin, config.receiver.power_pin
                    );
                    config
                }
                Err(e) => {
                    eprintln!("Warning: Invalid config file format: {}", e);
                    eprintln!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                eprintln!("Info: No config file found, using default configuration");
                Self::default()
            }
        }
    }

    /// Save current configuration to radio-config.toml
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write("radio-config.toml", contents)?;
        println!("Configuration saved to radio-config.toml");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.receiver.data_pin, 4);
        assert_eq!(config.receiver.power_pin, 17);
        assert_eq!(config.poll.interval_ms, 1000);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.receiver.data_pin, parsed.receiver.data_pin);
        assert_eq!(config.receiver.power_pin, parsed.receiver.power_pin);
        assert_eq!(config.poll.interval_ms, parsed.poll.interval_ms);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.receiver.data_pin, 4);
    }

    #[test]
    fn test_load_from_written_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[receiver]\ndata_pin = 22\npower_pin = 23\n\n[poll]\ninterval_ms = 250\n"
        )
        .unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.receiver.data_pin, 22);
        assert_eq!(config.receiver.power_pin, 23);
        assert_eq!(config.poll.interval_ms, 250);
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not valid toml [[").unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.receiver.data_pin, 4);
        assert_eq!(config.poll.interval_ms, 1000);
    }
}
