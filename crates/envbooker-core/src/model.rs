// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistent entities of the booking engine.

use crate::interval::Interval;
use crate::types::{BookingId, EnvironmentId, UserId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookable environment, for example a staging cluster or test rig.
///
/// Environment names are unique across the system. `created_at` and
/// `created_by_email` are provenance metadata and play no part in
/// scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
	pub id: EnvironmentId,
	pub name: String,
	/// Team accountable for the environment.
	pub owner_squad: String,
	pub created_at: DateTime<Utc>,
	pub created_by_email: String,
}

/// A reservation of one environment for one interval of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
	pub id: BookingId,
	pub environment_id: EnvironmentId,
	pub user_id: UserId,
	pub start: NaiveDateTime,
	pub end: NaiveDateTime,
}

impl Booking {
	pub fn interval(&self) -> Interval {
		Interval::new(self.start, self.end)
	}
}

/// Read-only snapshot row used by the validator and the suggestion search.
///
/// Carrying the booking id lets edit validation exclude the booking being
/// moved from its own conflict checks. Owner and environment are deliberately
/// absent: scheduling decisions must not depend on who holds a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedSpan {
	pub id: BookingId,
	pub start: NaiveDateTime,
	pub end: NaiveDateTime,
}

impl BookedSpan {
	pub fn interval(&self) -> Interval {
		Interval::new(self.start, self.end)
	}
}

impl From<&Booking> for BookedSpan {
	fn from(booking: &Booking) -> Self {
		Self {
			id: booking.id,
			start: booking.start,
			end: booking.end,
		}
	}
}
