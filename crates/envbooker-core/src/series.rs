// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Recurring booking patterns.
//!
//! A [`SeriesPattern`] describes "every Monday and Wednesday, 09:00 to 11:00,
//! from May 1st through May 31st". Expansion turns the pattern into concrete
//! per-day intervals which then flow through the same validator as single
//! bookings.

use crate::interval::Interval;
use crate::weekday::WeekdaySet;
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A recurring weekly pattern over an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPattern {
	pub start_date: NaiveDate,
	pub end_date: NaiveDate,
	pub weekdays: WeekdaySet,
	pub start_time: NaiveTime,
	pub end_time: NaiveTime,
}

impl SeriesPattern {
	pub fn new(
		start_date: NaiveDate,
		end_date: NaiveDate,
		weekdays: WeekdaySet,
		start_time: NaiveTime,
		end_time: NaiveTime,
	) -> Self {
		Self {
			start_date,
			end_date,
			weekdays,
			start_time,
			end_time,
		}
	}

	/// Dates in `[start_date, end_date]` falling on a selected weekday, in
	/// ascending order. Empty when the range is backwards or no day matches.
	pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
		self.start_date
			.iter_days()
			.take_while(move |date| *date <= self.end_date)
			.filter(move |date| self.weekdays.contains(date.weekday()))
	}

	/// The concrete slot this pattern books on `date`.
	pub fn slot_on(&self, date: NaiveDate) -> Interval {
		Interval::new(date.and_time(self.start_time), date.and_time(self.end_time))
	}

	/// Expand into one interval per matching date, ordered by date.
	pub fn expand(&self) -> Vec<Interval> {
		self.dates().map(|date| self.slot_on(date)).collect()
	}
}
