// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Alternative slot search for clashing requests.
//!
//! When a request is refused only because of an overlap, the engine probes
//! nearby slots of the same duration and offers the first free one. Offsets
//! are tried nearest first, and at equal distance the earlier slot is tried
//! before the later one: -15m, +15m, -30m, +30m, up to the policy window.
//!
//! The probe checks overlap only. Duration was already accepted for the
//! original request, and a shifted slot is deliberately allowed to exceed the
//! daily cap; acceptance re-validates in full, so a capacity-busting
//! suggestion is refused at that point rather than silently skipped here.

use crate::interval::Interval;
use crate::model::BookedSpan;
use crate::policy::BookingPolicy;
use crate::series::SeriesPattern;
use crate::validate::overlap_exists;
use chrono::{Duration, NaiveTime};

/// Candidate shift offsets in probe order.
pub fn offsets(policy: &BookingPolicy) -> impl Iterator<Item = Duration> + '_ {
	(1..=policy.suggestion_steps()).flat_map(move |multiple| {
		let magnitude = Duration::seconds(policy.suggestion_step.num_seconds() * multiple);
		[-magnitude, magnitude]
	})
}

/// Find the nearest clash-free slot of the same duration as `desired`.
///
/// Returns `None` when every candidate inside the window overlaps an
/// existing booking, or when `desired` is empty or backwards.
pub fn suggest(
	policy: &BookingPolicy,
	existing: &[BookedSpan],
	desired: Interval,
) -> Option<Interval> {
	if !desired.is_valid() {
		return None;
	}
	offsets(policy)
		.map(|offset| desired.shift(offset))
		.find(|candidate| !overlap_exists(existing, candidate, None))
}

/// Find a single time-of-day shift that clears every slot of a series.
///
/// The same offset must work for every expanded date; a shift that frees
/// Monday but still clashes on Wednesday is rejected. Returns the shifted
/// start and end times, or `None` when no offset in the window works or the
/// pattern expands to nothing.
pub fn suggest_series(
	policy: &BookingPolicy,
	existing: &[BookedSpan],
	pattern: &SeriesPattern,
) -> Option<(NaiveTime, NaiveTime)> {
	let slots = pattern.expand();
	if slots.is_empty() {
		return None;
	}
	for offset in offsets(policy) {
		let all_clear = slots
			.iter()
			.all(|slot| !overlap_exists(existing, &slot.shift(offset), None));
		if all_clear {
			let shifted = slots[0].shift(offset);
			return Some((shifted.start.time(), shifted.end.time()));
		}
	}
	None
}
