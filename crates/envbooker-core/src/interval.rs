// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Half-open time intervals in naive wall-clock time.
//!
//! All booking arithmetic happens on [`Interval`]. Intervals are half-open,
//! `[start, end)`, so two bookings that touch at a boundary do not overlap.
//! Timestamps are [`chrono::NaiveDateTime`]: the engine schedules wall-clock
//! time in the environment's local zone and never converts.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A half-open interval `[start, end)` of naive wall-clock time.
///
/// Construction does not check that `end > start`; the validator reports
/// backwards or empty intervals as a rejection so that callers get a uniform
/// error path instead of a constructor panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
	pub start: NaiveDateTime,
	pub end: NaiveDateTime,
}

impl Interval {
	pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
		Self { start, end }
	}

	/// Whether the interval is non-empty, that is `end > start`.
	pub fn is_valid(&self) -> bool {
		self.end > self.start
	}

	/// Signed length of the interval. Negative for backwards intervals.
	pub fn duration(&self) -> Duration {
		self.end - self.start
	}

	/// Two half-open intervals overlap when each starts before the other
	/// ends.
	pub fn overlaps(&self, other: &Interval) -> bool {
		other.end > self.start && other.start < self.end
	}

	/// Seconds of this interval that fall within the given calendar day.
	///
	/// A booking that spills past midnight only charges each day for the
	/// portion actually inside it.
	pub fn seconds_within_day(&self, day: NaiveDate) -> i64 {
		let day_start = day.and_time(NaiveTime::MIN);
		let day_end = match day.succ_opt() {
			Some(next) => next.and_time(NaiveTime::MIN),
			None => NaiveDateTime::MAX,
		};
		let lo = self.start.max(day_start);
		let hi = self.end.min(day_end);
		(hi - lo).num_seconds().max(0)
	}

	/// The same interval moved by `offset`, preserving its duration.
	pub fn shift(&self, offset: Duration) -> Interval {
		Interval {
			start: self.start + offset,
			end: self.end + offset,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(y, mo, d)
			.unwrap()
			.and_hms_opt(h, mi, 0)
			.unwrap()
	}

	#[test]
	fn touching_intervals_do_not_overlap() {
		let a = Interval::new(dt(2025, 5, 12, 9, 0), dt(2025, 5, 12, 10, 0));
		let b = Interval::new(dt(2025, 5, 12, 10, 0), dt(2025, 5, 12, 11, 0));
		assert!(!a.overlaps(&b));
		assert!(!b.overlaps(&a));
	}

	#[test]
	fn contained_interval_overlaps() {
		let outer = Interval::new(dt(2025, 5, 12, 9, 0), dt(2025, 5, 12, 17, 0));
		let inner = Interval::new(dt(2025, 5, 12, 11, 0), dt(2025, 5, 12, 12, 0));
		assert!(outer.overlaps(&inner));
		assert!(inner.overlaps(&outer));
	}

	#[test]
	fn partial_overlap_is_detected() {
		let a = Interval::new(dt(2025, 5, 12, 9, 0), dt(2025, 5, 12, 11, 0));
		let b = Interval::new(dt(2025, 5, 12, 10, 0), dt(2025, 5, 12, 12, 0));
		assert!(a.overlaps(&b));
	}

	#[test]
	fn backwards_interval_is_invalid() {
		let iv = Interval::new(dt(2025, 5, 12, 10, 0), dt(2025, 5, 12, 9, 0));
		assert!(!iv.is_valid());
		let empty = Interval::new(dt(2025, 5, 12, 9, 0), dt(2025, 5, 12, 9, 0));
		assert!(!empty.is_valid());
	}

	#[test]
	fn seconds_within_day_clamps_midnight_spill() {
		// 23:00 Monday to 01:00 Tuesday: one hour charged to each day.
		let iv = Interval::new(dt(2025, 5, 12, 23, 0), dt(2025, 5, 13, 1, 0));
		let monday = NaiveDate::from_ymd_opt(2025, 5, 12).unwrap();
		let tuesday = NaiveDate::from_ymd_opt(2025, 5, 13).unwrap();
		assert_eq!(iv.seconds_within_day(monday), 3600);
		assert_eq!(iv.seconds_within_day(tuesday), 3600);
	}

	#[test]
	fn seconds_within_unrelated_day_is_zero() {
		let iv = Interval::new(dt(2025, 5, 12, 9, 0), dt(2025, 5, 12, 10, 0));
		let wednesday = NaiveDate::from_ymd_opt(2025, 5, 14).unwrap();
		assert_eq!(iv.seconds_within_day(wednesday), 0);
	}

	#[test]
	fn shift_preserves_duration() {
		let iv = Interval::new(dt(2025, 5, 12, 9, 0), dt(2025, 5, 12, 10, 30));
		let moved = iv.shift(Duration::minutes(-45));
		assert_eq!(moved.start, dt(2025, 5, 12, 8, 15));
		assert_eq!(moved.end, dt(2025, 5, 12, 9, 45));
		assert_eq!(moved.duration(), iv.duration());
	}

	proptest! {
		#[test]
		fn overlap_is_symmetric(
			a_start in 0i64..5_000_000,
			a_len in 1i64..100_000,
			b_start in 0i64..5_000_000,
			b_len in 1i64..100_000,
		) {
			let base = dt(2025, 1, 1, 0, 0);
			let a = Interval::new(
				base + Duration::seconds(a_start),
				base + Duration::seconds(a_start + a_len),
			);
			let b = Interval::new(
				base + Duration::seconds(b_start),
				base + Duration::seconds(b_start + b_len),
			);
			prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
		}

		#[test]
		fn day_portions_sum_to_duration(
			start_offset in 0i64..172_800,
			len in 1i64..86_400,
		) {
			let base = dt(2025, 3, 1, 0, 0);
			let iv = Interval::new(
				base + Duration::seconds(start_offset),
				base + Duration::seconds(start_offset + len),
			);
			// Every date the interval can touch lies in this range.
			let days = [
				NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
				NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
				NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
				NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
			];
			let total: i64 = days.iter().map(|d| iv.seconds_within_day(*d)).sum();
			prop_assert_eq!(total, len);
		}
	}
}
