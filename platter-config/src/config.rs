//! Simple configuration persistence for platter
//!
//! Stores record player tuning and the host frame rate.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use platter_core::Tuning;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Record player rates and thresholds
    pub tuning: Tuning,
    /// Host frame rate
    pub fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            fps: 60,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("platter")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                match key {
                    "arm_swing_rate" => config.tuning.set_arm_swing_rate(parse_value(key, value)?),
                    "spin_ramp_rate" => config.tuning.set_spin_ramp_rate(parse_value(key, value)?),
                    "arm_engaged_angle" => {
                        config.tuning.set_arm_engaged_angle(parse_value(key, value)?)
                    }
                    "audible_speed" => config.tuning.set_audible_speed(parse_value(key, value)?),
                    "fps" => {
                        let fps: u32 = parse_value(key, value)?;
                        config.fps = fps.clamp(1, 1000);
                    }
                    _ => {} // Ignore unknown keys
                }
            }
        }

        Ok(config)
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let lines = [
            "# platter configuration".to_string(),
            format!("arm_swing_rate={}", self.tuning.arm_swing_rate()),
            format!("spin_ramp_rate={}", self.tuning.spin_ramp_rate()),
            format!("arm_engaged_angle={}", self.tuning.arm_engaged_angle()),
            format!("audible_speed={}", self.tuning.audible_speed()),
            format!("fps={}", self.fps),
        ];

        lines.join("\n")
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_tuning() {
        let content = "arm_swing_rate=45\nspin_ramp_rate = 120.5\naudible_speed=2\nfps=90";
        let config = Config::parse(content).unwrap();
        assert_eq!(config.tuning.arm_swing_rate(), 45.0);
        assert_eq!(config.tuning.spin_ramp_rate(), 120.5);
        assert_eq!(config.tuning.arm_engaged_angle(), 30.0);
        assert_eq!(config.tuning.audible_speed(), 2.0);
        assert_eq!(config.fps, 90);
    }

    #[test]
    fn test_parse_with_comments() {
        let content = "# Comment\nfps=30\n# Another comment\nunknown=1";
        let config = Config::parse(content).unwrap();
        assert_eq!(config.fps, 30);
    }

    #[test]
    fn test_parse_invalid_value() {
        let err = Config::parse("spin_ramp_rate=fast").unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "spin_ramp_rate");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_fps_clamped() {
        let config = Config::parse("fps=0").unwrap();
        assert_eq!(config.fps, 1);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = Config::default();
        config.tuning.set_arm_swing_rate(20.0);
        config.fps = 72;

        let serialized = config.serialize();
        let parsed = Config::parse(&serialized).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("platter-config-test-{}", std::process::id()))
            .join("config.txt");
        let mut config = Config::default();
        config.tuning.set_audible_speed(0.5);

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("platter-config-does-not-exist.txt");
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Io(_))));
    }
}
