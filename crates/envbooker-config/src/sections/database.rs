// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database location.

use serde::Deserialize;

const DEFAULT_URL: &str = "sqlite:./envbooker.db";

/// Where the booking database lives (fully resolved).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	/// SQLite connection string, e.g. `sqlite:./envbooker.db`.
	pub url: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_URL.to_string(),
		}
	}
}

/// Partial database section, for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_a_local_file() {
		assert_eq!(DatabaseConfigLayer::default().finalize().url, DEFAULT_URL);
	}

	#[test]
	fn merge_prefers_the_later_layer() {
		let mut base = DatabaseConfigLayer {
			url: Some("sqlite:./base.db".to_string()),
		};
		base.merge(DatabaseConfigLayer {
			url: Some("sqlite:/var/lib/envbooker/data.db".to_string()),
		});
		base.merge(DatabaseConfigLayer::default());
		assert_eq!(
			base.finalize().url,
			"sqlite:/var/lib/envbooker/data.db"
		);
	}
}
