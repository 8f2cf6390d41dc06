// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration.

use serde::Deserialize;

const DEFAULT_FILTER: &str = "info";

/// Logging configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// Tracing filter directive, e.g. `info` or `envbooker=debug,sqlx=warn`.
	pub filter: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			filter: DEFAULT_FILTER.to_string(),
		}
	}
}

/// Partial logging section, for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub filter: Option<String>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if other.filter.is_some() {
			self.filter = other.filter;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			filter: self.filter.unwrap_or_else(|| DEFAULT_FILTER.to_string()),
		}
	}
}
