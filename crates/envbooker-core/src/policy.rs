// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tunable limits applied by the validator and the suggestion search.

use chrono::Duration;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Scheduling limits for one deployment.
///
/// The defaults are the product rules: bookings of at most eight hours, a 90%
/// daily utilization ceiling per environment, and suggestions searched in
/// 15 minute steps up to three hours either side of the requested start.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingPolicy {
	/// Longest interval a single booking or series slot may cover.
	pub max_duration: Duration,
	/// Fraction of a calendar day an environment may be booked, in `(0, 1]`.
	pub daily_utilization_cap: f64,
	/// How far either side of the requested start the suggestion search
	/// looks.
	pub suggestion_window: Duration,
	/// Granularity of candidate offsets in the suggestion search.
	pub suggestion_step: Duration,
}

impl Default for BookingPolicy {
	fn default() -> Self {
		Self {
			max_duration: Duration::hours(8),
			daily_utilization_cap: 0.90,
			suggestion_window: Duration::hours(3),
			suggestion_step: Duration::minutes(15),
		}
	}
}

impl BookingPolicy {
	/// Booked seconds allowed per environment per calendar day.
	pub fn daily_cap_seconds(&self) -> i64 {
		(SECONDS_PER_DAY as f64 * self.daily_utilization_cap).floor() as i64
	}

	/// Number of step multiples that fit inside the suggestion window.
	pub fn suggestion_steps(&self) -> i64 {
		let step = self.suggestion_step.num_seconds();
		if step <= 0 {
			return 0;
		}
		self.suggestion_window.num_seconds() / step
	}
}
