// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scheduling policy knobs.
//!
//! These four values parameterize the core validator and the suggestion
//! search. Durations are configured in whole minutes; the resolved config
//! converts them into a [`BookingPolicy`] for the engine.

use chrono::Duration;
use envbooker_core::BookingPolicy;
use serde::Deserialize;

const DEFAULT_MAX_DURATION_MINUTES: i64 = 480;
const DEFAULT_DAILY_UTILIZATION_CAP: f64 = 0.90;
const DEFAULT_SUGGESTION_WINDOW_MINUTES: i64 = 180;
const DEFAULT_SUGGESTION_STEP_MINUTES: i64 = 15;

/// Scheduling rules (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct BookingConfig {
	/// Longest single booking a regular user may place.
	pub max_duration_minutes: i64,
	/// Fraction of a calendar day an environment may be booked, in `(0, 1]`.
	pub daily_utilization_cap: f64,
	/// How far either side of the desired slot a suggestion may land.
	pub suggestion_window_minutes: i64,
	/// Granularity of the suggestion search.
	pub suggestion_step_minutes: i64,
}

impl Default for BookingConfig {
	fn default() -> Self {
		Self {
			max_duration_minutes: DEFAULT_MAX_DURATION_MINUTES,
			daily_utilization_cap: DEFAULT_DAILY_UTILIZATION_CAP,
			suggestion_window_minutes: DEFAULT_SUGGESTION_WINDOW_MINUTES,
			suggestion_step_minutes: DEFAULT_SUGGESTION_STEP_MINUTES,
		}
	}
}

impl BookingConfig {
	/// The policy handed to the scheduling engine.
	pub fn policy(&self) -> BookingPolicy {
		BookingPolicy {
			max_duration: Duration::minutes(self.max_duration_minutes),
			daily_utilization_cap: self.daily_utilization_cap,
			suggestion_window: Duration::minutes(self.suggestion_window_minutes),
			suggestion_step: Duration::minutes(self.suggestion_step_minutes),
		}
	}
}

/// Partial booking section, for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingConfigLayer {
	#[serde(default)]
	pub max_duration_minutes: Option<i64>,
	#[serde(default)]
	pub daily_utilization_cap: Option<f64>,
	#[serde(default)]
	pub suggestion_window_minutes: Option<i64>,
	#[serde(default)]
	pub suggestion_step_minutes: Option<i64>,
}

impl BookingConfigLayer {
	pub fn merge(&mut self, other: BookingConfigLayer) {
		if other.max_duration_minutes.is_some() {
			self.max_duration_minutes = other.max_duration_minutes;
		}
		if other.daily_utilization_cap.is_some() {
			self.daily_utilization_cap = other.daily_utilization_cap;
		}
		if other.suggestion_window_minutes.is_some() {
			self.suggestion_window_minutes = other.suggestion_window_minutes;
		}
		if other.suggestion_step_minutes.is_some() {
			self.suggestion_step_minutes = other.suggestion_step_minutes;
		}
	}

	pub fn finalize(self) -> BookingConfig {
		BookingConfig {
			max_duration_minutes: self
				.max_duration_minutes
				.unwrap_or(DEFAULT_MAX_DURATION_MINUTES),
			daily_utilization_cap: self
				.daily_utilization_cap
				.unwrap_or(DEFAULT_DAILY_UTILIZATION_CAP),
			suggestion_window_minutes: self
				.suggestion_window_minutes
				.unwrap_or(DEFAULT_SUGGESTION_WINDOW_MINUTES),
			suggestion_step_minutes: self
				.suggestion_step_minutes
				.unwrap_or(DEFAULT_SUGGESTION_STEP_MINUTES),
		}
	}
}
