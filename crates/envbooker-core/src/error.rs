// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::NaiveDateTime;
use thiserror::Error;

/// Reasons a booking request can be refused by the scheduling rules.
///
/// The validator reports exactly one reason per attempt, chosen by a fixed
/// check order: interval validity, then duration, then daily capacity, then
/// overlap. Callers that want to offer an alternative slot should do so only
/// for [`BookingError::Clash`]; the other reasons cannot be fixed by moving
/// the booking a few minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookingError {
	/// The requested end is not strictly after the requested start.
	#[error("end time must be after start time")]
	InvalidInterval,

	/// The requested interval is longer than the configured maximum.
	#[error("booking exceeds the maximum allowed duration")]
	DurationExceeded,

	/// Adding this booking would push the environment past its daily
	/// utilization cap.
	#[error("environment has reached its daily utilization cap")]
	CapacityExceeded,

	/// The requested interval overlaps an existing booking. For series
	/// requests `slot_start` identifies the first slot that failed.
	#[error("slot starting {slot_start} overlaps an existing booking")]
	Clash {
		/// Start of the interval that could not be placed.
		slot_start: NaiveDateTime,
	},

	/// A series request matched no dates at all, either because the date
	/// range is empty or because none of its days fall on a selected
	/// weekday.
	#[error("no dates in the requested range fall on the selected weekdays")]
	NoMatchingWeekdays,
}

impl BookingError {
	/// Whether this rejection can potentially be resolved by shifting the
	/// requested interval to a nearby slot.
	pub fn is_clash(&self) -> bool {
		matches!(self, BookingError::Clash { .. })
	}
}
