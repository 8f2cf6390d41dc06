// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The booking validator.
//!
//! [`validate`] decides whether a candidate interval may be booked on an
//! environment, given a snapshot of that environment's existing bookings.
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. the interval must be non-empty ([`BookingError::InvalidInterval`])
//! 2. its duration must not exceed the policy maximum
//!    ([`BookingError::DurationExceeded`])
//! 3. the start day's total booked time, plus the candidate, must stay under
//!    the daily utilization cap ([`BookingError::CapacityExceeded`])
//! 4. the interval must not overlap any existing booking
//!    ([`BookingError::Clash`])
//!
//! A candidate that is simultaneously over capacity and clashing is reported
//! as over capacity. Utilization charges each calendar day only for the
//! portion of a booking that falls inside it, so a booking spilling past
//! midnight counts toward both days it touches. The candidate's own duration
//! is charged in full to its start day.

use crate::error::BookingError;
use crate::interval::Interval;
use crate::model::BookedSpan;
use crate::policy::BookingPolicy;
use crate::types::BookingId;

/// Check a candidate interval against an environment's booking snapshot.
///
/// `exclude` removes one booking from every check, which is how edits avoid
/// colliding with their own current slot.
pub fn validate(
	policy: &BookingPolicy,
	existing: &[BookedSpan],
	candidate: Interval,
	exclude: Option<BookingId>,
) -> Result<(), BookingError> {
	if !candidate.is_valid() {
		return Err(BookingError::InvalidInterval);
	}
	if candidate.duration() > policy.max_duration {
		return Err(BookingError::DurationExceeded);
	}

	let day = candidate.start.date();
	let used: i64 = retained(existing, exclude)
		.map(|span| span.interval().seconds_within_day(day))
		.sum();
	if used + candidate.duration().num_seconds() > policy.daily_cap_seconds() {
		return Err(BookingError::CapacityExceeded);
	}

	if overlap_exists(existing, &candidate, exclude) {
		return Err(BookingError::Clash {
			slot_start: candidate.start,
		});
	}

	Ok(())
}

/// Whether any booking in the snapshot overlaps `candidate`.
///
/// This is the whole conflict test used by the suggestion search, which
/// deliberately skips the duration and capacity checks when probing
/// alternative slots.
pub fn overlap_exists(
	existing: &[BookedSpan],
	candidate: &Interval,
	exclude: Option<BookingId>,
) -> bool {
	retained(existing, exclude).any(|span| span.interval().overlaps(candidate))
}

fn retained(
	existing: &[BookedSpan],
	exclude: Option<BookingId>,
) -> impl Iterator<Item = &BookedSpan> {
	existing.iter().filter(move |span| exclude != Some(span.id))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::BookingId;
	use chrono::{Duration, NaiveDate, NaiveDateTime};
	use proptest::prelude::*;

	fn dt(d: u32, h: u32, mi: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2025, 5, d)
			.unwrap()
			.and_hms_opt(h, mi, 0)
			.unwrap()
	}

	fn span(d: u32, start_h: u32, end_d: u32, end_h: u32) -> BookedSpan {
		BookedSpan {
			id: BookingId::generate(),
			start: dt(d, start_h, 0),
			end: dt(end_d, end_h, 0),
		}
	}

	#[test]
	fn empty_environment_accepts_a_valid_interval() {
		let policy = BookingPolicy::default();
		let candidate = Interval::new(dt(12, 9, 0), dt(12, 10, 0));
		assert_eq!(validate(&policy, &[], candidate, None), Ok(()));
	}

	#[test]
	fn backwards_interval_is_rejected_first() {
		let policy = BookingPolicy::default();
		// Backwards and longer than the maximum; interval validity wins.
		let candidate = Interval::new(dt(12, 20, 0), dt(12, 1, 0));
		assert_eq!(
			validate(&policy, &[], candidate, None),
			Err(BookingError::InvalidInterval)
		);
	}

	#[test]
	fn zero_length_interval_is_rejected() {
		let policy = BookingPolicy::default();
		let candidate = Interval::new(dt(12, 9, 0), dt(12, 9, 0));
		assert_eq!(
			validate(&policy, &[], candidate, None),
			Err(BookingError::InvalidInterval)
		);
	}

	#[test]
	fn maximum_duration_is_inclusive() {
		let policy = BookingPolicy::default();
		let exactly_eight = Interval::new(dt(12, 8, 0), dt(12, 16, 0));
		assert_eq!(validate(&policy, &[], exactly_eight, None), Ok(()));

		let over = Interval::new(dt(12, 8, 0), dt(12, 16, 1));
		assert_eq!(
			validate(&policy, &[], over, None),
			Err(BookingError::DurationExceeded)
		);
	}

	#[test]
	fn full_day_rejects_for_capacity() {
		let policy = BookingPolicy::default();
		// 20 hours already booked on the day; cap is 21.6 hours.
		let existing = vec![span(12, 0, 12, 8), span(12, 8, 12, 16), span(12, 16, 12, 20)];
		let candidate = Interval::new(dt(12, 21, 0), dt(12, 23, 0));
		assert_eq!(
			validate(&policy, &existing, candidate, None),
			Err(BookingError::CapacityExceeded)
		);
	}

	#[test]
	fn capacity_is_checked_before_overlap() {
		let policy = BookingPolicy::default();
		let existing = vec![span(12, 0, 12, 8), span(12, 8, 12, 16), span(12, 16, 12, 20)];
		// Overlaps the 16:00-20:00 booking and busts the cap; capacity wins.
		let candidate = Interval::new(dt(12, 19, 0), dt(12, 21, 0));
		assert_eq!(
			validate(&policy, &existing, candidate, None),
			Err(BookingError::CapacityExceeded)
		);
	}

	#[test]
	fn clash_reports_the_candidate_start() {
		let policy = BookingPolicy::default();
		let existing = vec![span(12, 9, 12, 10)];
		let candidate = Interval::new(dt(12, 9, 30), dt(12, 10, 30));
		assert_eq!(
			validate(&policy, &existing, candidate, None),
			Err(BookingError::Clash {
				slot_start: dt(12, 9, 30)
			})
		);
	}

	#[test]
	fn back_to_back_bookings_are_allowed() {
		let policy = BookingPolicy::default();
		let existing = vec![span(12, 9, 12, 10)];
		let candidate = Interval::new(dt(12, 10, 0), dt(12, 11, 0));
		assert_eq!(validate(&policy, &existing, candidate, None), Ok(()));
	}

	#[test]
	fn excluded_booking_does_not_clash_with_itself() {
		let policy = BookingPolicy::default();
		let own = span(12, 9, 12, 10);
		let own_id = own.id;
		let existing = vec![own];
		// Move the booking half an hour later.
		let candidate = Interval::new(dt(12, 9, 30), dt(12, 10, 30));
		assert!(validate(&policy, &existing, candidate, None).is_err());
		assert_eq!(
			validate(&policy, &existing, candidate, Some(own_id)),
			Ok(())
		);
	}

	#[test]
	fn midnight_spill_charges_both_days() {
		let policy = BookingPolicy::default();
		// 22:00 Monday to 06:00 Tuesday puts six hours on Tuesday, and
		// Tuesday carries another fourteen booked hours of its own.
		let existing = vec![span(12, 22, 13, 6), span(13, 6, 13, 20)];

		// Tuesday sits at 20 booked hours, so two more break the cap.
		let tuesday_candidate = Interval::new(dt(13, 20, 30), dt(13, 22, 30));
		assert_eq!(
			validate(&policy, &existing, tuesday_candidate, None),
			Err(BookingError::CapacityExceeded)
		);

		// Monday only carries the two pre-midnight hours.
		let monday_candidate = Interval::new(dt(12, 9, 0), dt(12, 11, 0));
		assert_eq!(validate(&policy, &existing, monday_candidate, None), Ok(()));
	}

	#[test]
	fn overlap_exists_matches_the_validator() {
		let existing = vec![span(12, 9, 12, 10)];
		let clashing = Interval::new(dt(12, 9, 30), dt(12, 10, 30));
		let clear = Interval::new(dt(12, 11, 0), dt(12, 12, 0));
		assert!(overlap_exists(&existing, &clashing, None));
		assert!(!overlap_exists(&existing, &clear, None));
	}

	proptest! {
		#[test]
		fn any_short_interval_fits_an_empty_environment(
			start_minute in 0i64..(14 * 24 * 60),
			duration_minutes in 1i64..=(8 * 60),
		) {
			let policy = BookingPolicy::default();
			let base = dt(1, 0, 0);
			let start = base + Duration::minutes(start_minute);
			let candidate = Interval::new(start, start + Duration::minutes(duration_minutes));
			prop_assert_eq!(validate(&policy, &[], candidate, None), Ok(()));
		}

		#[test]
		fn validator_never_accepts_an_overlap(
			existing_start in 0i64..1440,
			existing_len in 1i64..480,
			candidate_start in 0i64..1440,
			candidate_len in 1i64..480,
		) {
			let policy = BookingPolicy::default();
			let base = dt(1, 0, 0);
			let existing = BookedSpan {
				id: BookingId::generate(),
				start: base + Duration::minutes(existing_start),
				end: base + Duration::minutes(existing_start + existing_len),
			};
			let candidate = Interval::new(
				base + Duration::minutes(candidate_start),
				base + Duration::minutes(candidate_start + candidate_len),
			);
			let overlaps = existing.interval().overlaps(&candidate);
			let verdict = validate(&policy, &[existing], candidate, None);
			if verdict.is_ok() {
				prop_assert!(!overlaps);
			}
		}
	}
}
