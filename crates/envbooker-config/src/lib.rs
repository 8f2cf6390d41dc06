// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration for the EnvBooker booking engine.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`ENVBOOKER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use envbooker_config::load_config;
//!
//! let config = load_config()?;
//! let policy = config.booking.policy();
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
	pub database: DatabaseConfig,
	pub booking: BookingConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ENVBOOKER_*`)
/// 2. Config file (`/etc/envbooker/config.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<Config, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<Config, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<Config, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ConfigLayer) -> Result<Config, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let booking = layer.booking.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&booking)?;

	info!(
		database = %database.url,
		max_duration_minutes = booking.max_duration_minutes,
		daily_utilization_cap = booking.daily_utilization_cap,
		suggestion_step_minutes = booking.suggestion_step_minutes,
		"Configuration loaded"
	);

	Ok(Config {
		database,
		booking,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(booking: &BookingConfig) -> Result<(), ConfigError> {
	if booking.max_duration_minutes <= 0 {
		return Err(ConfigError::Validation(format!(
			"max_duration_minutes must be positive, got {}",
			booking.max_duration_minutes
		)));
	}
	if booking.daily_utilization_cap <= 0.0 || booking.daily_utilization_cap > 1.0 {
		return Err(ConfigError::Validation(format!(
			"daily_utilization_cap must be in (0, 1], got {}",
			booking.daily_utilization_cap
		)));
	}
	if booking.suggestion_step_minutes <= 0 {
		return Err(ConfigError::Validation(format!(
			"suggestion_step_minutes must be positive, got {}",
			booking.suggestion_step_minutes
		)));
	}
	if booking.suggestion_window_minutes < booking.suggestion_step_minutes {
		return Err(ConfigError::Validation(format!(
			"suggestion_window_minutes ({}) must be at least suggestion_step_minutes ({})",
			booking.suggestion_window_minutes, booking.suggestion_step_minutes
		)));
	}

	Ok(())
}
