// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Weekday selections for series bookings.

use chrono::Weekday;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const ALL_DAYS: [Weekday; 7] = [
	Weekday::Mon,
	Weekday::Tue,
	Weekday::Wed,
	Weekday::Thu,
	Weekday::Fri,
	Weekday::Sat,
	Weekday::Sun,
];

/// A set of weekdays, Monday through Sunday.
///
/// Stored as a bitmask with Monday at bit 0 and Sunday at bit 6. Serializes
/// as a sorted array of day indices (`[0, 2, 4]` for Monday, Wednesday,
/// Friday), which is also the shape used in audit detail payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
	pub const fn empty() -> Self {
		Self(0)
	}

	pub fn from_days(days: &[Weekday]) -> Self {
		let mut set = Self::empty();
		for day in days {
			set.insert(*day);
		}
		set
	}

	pub fn insert(&mut self, day: Weekday) {
		self.0 |= bit(day);
	}

	pub fn contains(&self, day: Weekday) -> bool {
		self.0 & bit(day) != 0
	}

	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}

	pub fn len(&self) -> usize {
		self.0.count_ones() as usize
	}

	/// Contained days in Monday-to-Sunday order.
	pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
		ALL_DAYS.into_iter().filter(|day| self.contains(*day))
	}

	/// Day indices (Monday = 0) in ascending order.
	pub fn indices(&self) -> Vec<u8> {
		self.iter().map(|day| day.num_days_from_monday() as u8).collect()
	}
}

impl FromIterator<Weekday> for WeekdaySet {
	fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
		let mut set = Self::empty();
		for day in iter {
			set.insert(day);
		}
		set
	}
}

fn bit(day: Weekday) -> u8 {
	1 << day.num_days_from_monday()
}

impl Serialize for WeekdaySet {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(self.len()))?;
		for index in self.indices() {
			seq.serialize_element(&index)?;
		}
		seq.end()
	}
}

impl<'de> Deserialize<'de> for WeekdaySet {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct IndexVisitor;

		impl<'de> Visitor<'de> for IndexVisitor {
			type Value = WeekdaySet;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "a sequence of weekday indices between 0 and 6")
			}

			fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
				let mut set = WeekdaySet::empty();
				while let Some(index) = seq.next_element::<u8>()? {
					let day = ALL_DAYS
						.get(index as usize)
						.ok_or_else(|| serde::de::Error::custom(format!("invalid weekday index: {}", index)))?;
					set.insert(*day);
				}
				Ok(set)
			}
		}

		deserializer.deserialize_seq(IndexVisitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_days_and_contains() {
		let set = WeekdaySet::from_days(&[Weekday::Mon, Weekday::Fri]);
		assert!(set.contains(Weekday::Mon));
		assert!(set.contains(Weekday::Fri));
		assert!(!set.contains(Weekday::Sun));
		assert_eq!(set.len(), 2);
	}

	#[test]
	fn duplicate_days_collapse() {
		let set = WeekdaySet::from_days(&[Weekday::Tue, Weekday::Tue, Weekday::Tue]);
		assert_eq!(set.len(), 1);
	}

	#[test]
	fn iter_is_monday_to_sunday_ordered() {
		let set = WeekdaySet::from_days(&[Weekday::Sun, Weekday::Wed, Weekday::Mon]);
		let days: Vec<Weekday> = set.iter().collect();
		assert_eq!(days, vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]);
		assert_eq!(set.indices(), vec![0, 2, 6]);
	}

	#[test]
	fn empty_set() {
		assert!(WeekdaySet::empty().is_empty());
		assert_eq!(WeekdaySet::empty().len(), 0);
	}

	#[test]
	fn serde_round_trips_index_arrays() {
		let set = WeekdaySet::from_days(&[Weekday::Mon, Weekday::Wed, Weekday::Fri]);
		let json = serde_json::to_string(&set).unwrap();
		assert_eq!(json, "[0,2,4]");
		let back: WeekdaySet = serde_json::from_str(&json).unwrap();
		assert_eq!(back, set);
	}

	#[test]
	fn serde_rejects_out_of_range_index() {
		assert!(serde_json::from_str::<WeekdaySet>("[7]").is_err());
	}
}
