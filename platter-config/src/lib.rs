//! Tuning configuration for platter

mod config;

pub use config::{Config, ConfigError};
