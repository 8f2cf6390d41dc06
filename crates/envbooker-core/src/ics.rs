// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! iCalendar export of a single booking.
//!
//! Produces a minimal VCALENDAR document with one VEVENT that common
//! calendar clients import. Booking times are emitted as floating (zoneless)
//! local times, matching how the engine stores them; only DTSTAMP is UTC.

use crate::model::Booking;
use crate::types::BookingId;
use chrono::{DateTime, Utc};

const PRODID: &str = "-//EnvBooker//EN";

/// Render one booking as an iCalendar document.
///
/// `generated_at` becomes the DTSTAMP, passed in rather than sampled here so
/// exports are reproducible.
pub fn render_booking_ics(
	booking: &Booking,
	environment_name: &str,
	generated_at: DateTime<Utc>,
) -> String {
	let lines = [
		"BEGIN:VCALENDAR".to_string(),
		"VERSION:2.0".to_string(),
		format!("PRODID:{}", PRODID),
		"BEGIN:VEVENT".to_string(),
		format!("UID:booking-{}@envbooker.local", booking.id),
		format!("DTSTAMP:{}", generated_at.format("%Y%m%dT%H%M%SZ")),
		format!("DTSTART:{}", booking.start.format("%Y%m%dT%H%M%S")),
		format!("DTEND:{}", booking.end.format("%Y%m%dT%H%M%S")),
		format!("SUMMARY:Booking for {}", environment_name),
		"END:VEVENT".to_string(),
		"END:VCALENDAR".to_string(),
		String::new(),
	];
	lines.join("\r\n")
}

/// Suggested attachment filename for a booking export.
pub fn ics_filename(id: BookingId) -> String {
	format!("booking-{}.ics", id)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{EnvironmentId, UserId};
	use chrono::{NaiveDate, TimeZone};
	use std::str::FromStr;
	use uuid::Uuid;

	fn fixture() -> Booking {
		Booking {
			id: BookingId::new(Uuid::from_str("6f9c0f6e-6f70-4a6f-9a31-3a54c6a2b7cd").unwrap()),
			environment_id: EnvironmentId::generate(),
			user_id: UserId::generate(),
			start: NaiveDate::from_ymd_opt(2025, 5, 12)
				.unwrap()
				.and_hms_opt(9, 0, 0)
				.unwrap(),
			end: NaiveDate::from_ymd_opt(2025, 5, 12)
				.unwrap()
				.and_hms_opt(11, 30, 0)
				.unwrap(),
		}
	}

	#[test]
	fn renders_the_expected_document() {
		let booking = fixture();
		let stamp = Utc.with_ymd_and_hms(2025, 5, 1, 8, 15, 0).unwrap();
		let ics = render_booking_ics(&booking, "staging-1", stamp);
		let expected = concat!(
			"BEGIN:VCALENDAR\r\n",
			"VERSION:2.0\r\n",
			"PRODID:-//EnvBooker//EN\r\n",
			"BEGIN:VEVENT\r\n",
			"UID:booking-6f9c0f6e-6f70-4a6f-9a31-3a54c6a2b7cd@envbooker.local\r\n",
			"DTSTAMP:20250501T081500Z\r\n",
			"DTSTART:20250512T090000\r\n",
			"DTEND:20250512T113000\r\n",
			"SUMMARY:Booking for staging-1\r\n",
			"END:VEVENT\r\n",
			"END:VCALENDAR\r\n",
		);
		assert_eq!(ics, expected);
	}

	#[test]
	fn document_ends_with_a_line_break() {
		let booking = fixture();
		let ics = render_booking_ics(&booking, "qa-rig", Utc::now());
		assert!(ics.ends_with("END:VCALENDAR\r\n"));
	}

	#[test]
	fn filename_embeds_the_booking_id() {
		let id = BookingId::new(Uuid::from_str("6f9c0f6e-6f70-4a6f-9a31-3a54c6a2b7cd").unwrap());
		assert_eq!(
			ics_filename(id),
			"booking-6f9c0f6e-6f70-4a6f-9a31-3a54c6a2b7cd.ics"
		);
	}
}
