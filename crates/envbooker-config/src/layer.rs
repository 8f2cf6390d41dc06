// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration assembled from one source.
//!
//! Every source produces a [`ConfigLayer`]; later layers override earlier
//! ones field by field, so a TOML file can set the booking step while the
//! environment overrides only the database URL.

use serde::Deserialize;

use crate::sections::{BookingConfigLayer, DatabaseConfigLayer, LoggingConfigLayer};

/// One source's worth of configuration. Absent sections mean "no opinion".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub booking: Option<BookingConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ConfigLayer {
	/// Fold `other` on top of this layer, section by section.
	pub fn merge(&mut self, other: ConfigLayer) {
		if let Some(theirs) = other.database {
			match self.database.as_mut() {
				Some(mine) => mine.merge(theirs),
				None => self.database = Some(theirs),
			}
		}
		if let Some(theirs) = other.booking {
			match self.booking.as_mut() {
				Some(mine) => mine.merge(theirs),
				None => self.booking = Some(theirs),
			}
		}
		if let Some(theirs) = other.logging {
			match self.logging.as_mut() {
				Some(mine) => mine.merge(theirs),
				None => self.logging = Some(theirs),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_a_full_toml_document() {
		let layer: ConfigLayer = toml::from_str(
			r#"
			[database]
			url = "sqlite:/srv/envbooker.db"

			[booking]
			max_duration_minutes = 240
			daily_utilization_cap = 0.75

			[logging]
			filter = "debug"
			"#,
		)
		.unwrap();

		assert_eq!(
			layer.database.unwrap().url.as_deref(),
			Some("sqlite:/srv/envbooker.db")
		);
		let booking = layer.booking.unwrap();
		assert_eq!(booking.max_duration_minutes, Some(240));
		assert_eq!(booking.daily_utilization_cap, Some(0.75));
		assert!(booking.suggestion_step_minutes.is_none());
		assert_eq!(layer.logging.unwrap().filter.as_deref(), Some("debug"));
	}

	#[test]
	fn absent_sections_do_not_clobber_present_ones() {
		let mut base: ConfigLayer = toml::from_str(
			r#"
			[booking]
			suggestion_step_minutes = 30
			"#,
		)
		.unwrap();
		base.merge(ConfigLayer::default());

		let booking = base.booking.unwrap();
		assert_eq!(booking.suggestion_step_minutes, Some(30));
	}

	#[test]
	fn later_sections_override_field_by_field() {
		let mut base: ConfigLayer = toml::from_str(
			r#"
			[booking]
			max_duration_minutes = 240
			suggestion_step_minutes = 30
			"#,
		)
		.unwrap();
		let overlay: ConfigLayer = toml::from_str(
			r#"
			[booking]
			suggestion_step_minutes = 10
			"#,
		)
		.unwrap();
		base.merge(overlay);

		let booking = base.booking.unwrap();
		assert_eq!(booking.max_duration_minutes, Some(240));
		assert_eq!(booking.suggestion_step_minutes, Some(10));
	}
}
