// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit trail vocabulary and entries.
//!
//! Every mutation the engine performs writes exactly one audit entry in the
//! same transaction as the mutation itself, so the trail can never show an
//! action that did not happen. The action vocabulary is a closed enum; the
//! stable string forms below are what lands in storage and what downstream
//! consumers filter on.

use crate::types::{AuditEntryId, BookingId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a mutation did, in the stable vocabulary of the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
	/// A booking created through the normal validated path.
	CreateBooking,
	/// A booking created by accepting an offered alternative slot.
	AcceptSuggestion,
	/// A single booking forced past the scheduling rules by an admin.
	ForcedSingleBook,
	EditBooking,
	ForcedEdit,
	DeleteBooking,
	/// One slot of a validated series.
	CreateSeries,
	/// The per-series summary entry written after all slots of a
	/// validated series.
	CreateSeriesSummary,
	/// One slot of a forced series.
	ForcedSeriesBook,
	/// The per-series summary entry for a forced series.
	ForcedSeriesBookingSummary,
	CreateEnvironment,
	UpdateEnvironment,
	DeleteEnvironment,
}

impl AuditAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			AuditAction::CreateBooking => "create_booking",
			AuditAction::AcceptSuggestion => "accept_suggestion",
			AuditAction::ForcedSingleBook => "forced_single_book",
			AuditAction::EditBooking => "edit_booking",
			AuditAction::ForcedEdit => "forced_edit",
			AuditAction::DeleteBooking => "delete_booking",
			AuditAction::CreateSeries => "create_series",
			AuditAction::CreateSeriesSummary => "create_series_summary",
			AuditAction::ForcedSeriesBook => "forced_series_book",
			AuditAction::ForcedSeriesBookingSummary => "forced_series_booking_summary",
			AuditAction::CreateEnvironment => "create_environment",
			AuditAction::UpdateEnvironment => "update_environment",
			AuditAction::DeleteEnvironment => "delete_environment",
		}
	}

	/// Every action in the vocabulary.
	pub fn all() -> &'static [AuditAction] {
		&[
			AuditAction::CreateBooking,
			AuditAction::AcceptSuggestion,
			AuditAction::ForcedSingleBook,
			AuditAction::EditBooking,
			AuditAction::ForcedEdit,
			AuditAction::DeleteBooking,
			AuditAction::CreateSeries,
			AuditAction::CreateSeriesSummary,
			AuditAction::ForcedSeriesBook,
			AuditAction::ForcedSeriesBookingSummary,
			AuditAction::CreateEnvironment,
			AuditAction::UpdateEnvironment,
			AuditAction::DeleteEnvironment,
		]
	}
}

impl fmt::Display for AuditAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for AuditAction {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		AuditAction::all()
			.iter()
			.find(|action| action.as_str() == s)
			.copied()
			.ok_or_else(|| format!("unknown audit action: {}", s))
	}
}

/// One immutable line of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
	pub id: AuditEntryId,
	pub action: AuditAction,
	pub actor_id: UserId,
	/// Booking the entry concerns. Absent for environment administration
	/// and for series summary lines.
	pub booking_id: Option<BookingId>,
	/// Free-form context, usually a compact JSON object.
	pub details: Option<String>,
	pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
	/// Start a new entry stamped with a fresh id and the current time.
	pub fn new(action: AuditAction, actor_id: UserId) -> Self {
		Self {
			id: AuditEntryId::generate(),
			action,
			actor_id,
			booking_id: None,
			details: None,
			timestamp: Utc::now(),
		}
	}

	pub fn with_booking(mut self, booking_id: BookingId) -> Self {
		self.booking_id = Some(booking_id);
		self
	}

	pub fn with_details(mut self, details: impl Into<String>) -> Self {
		self.details = Some(details.into());
		self
	}

	/// Attach a JSON payload as the detail string.
	pub fn with_details_json(self, value: &serde_json::Value) -> Self {
		self.with_details(value.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn action_strings_are_stable() {
		let expected = [
			(AuditAction::CreateBooking, "create_booking"),
			(AuditAction::AcceptSuggestion, "accept_suggestion"),
			(AuditAction::ForcedSingleBook, "forced_single_book"),
			(AuditAction::EditBooking, "edit_booking"),
			(AuditAction::ForcedEdit, "forced_edit"),
			(AuditAction::DeleteBooking, "delete_booking"),
			(AuditAction::CreateSeries, "create_series"),
			(AuditAction::CreateSeriesSummary, "create_series_summary"),
			(AuditAction::ForcedSeriesBook, "forced_series_book"),
			(
				AuditAction::ForcedSeriesBookingSummary,
				"forced_series_booking_summary",
			),
			(AuditAction::CreateEnvironment, "create_environment"),
			(AuditAction::UpdateEnvironment, "update_environment"),
			(AuditAction::DeleteEnvironment, "delete_environment"),
		];
		assert_eq!(expected.len(), AuditAction::all().len());
		for (action, text) in expected {
			assert_eq!(action.as_str(), text);
			assert_eq!(AuditAction::from_str(text), Ok(action));
		}
	}

	#[test]
	fn serde_uses_the_stable_strings() {
		for action in AuditAction::all() {
			let json = serde_json::to_string(action).unwrap();
			assert_eq!(json, format!("\"{}\"", action.as_str()));
			let back: AuditAction = serde_json::from_str(&json).unwrap();
			assert_eq!(back, *action);
		}
	}

	#[test]
	fn unknown_action_fails_to_parse() {
		assert!(AuditAction::from_str("drop_table").is_err());
	}

	#[test]
	fn builder_fills_optional_fields() {
		let actor = UserId::generate();
		let booking = BookingId::generate();
		let entry = AuditEntry::new(AuditAction::CreateBooking, actor)
			.with_booking(booking)
			.with_details_json(&serde_json::json!({"environment": "staging-1"}));
		assert_eq!(entry.action, AuditAction::CreateBooking);
		assert_eq!(entry.actor_id, actor);
		assert_eq!(entry.booking_id, Some(booking));
		assert_eq!(entry.details.as_deref(), Some(r#"{"environment":"staging-1"}"#));
	}

	#[test]
	fn bare_entry_has_no_booking_or_details() {
		let entry = AuditEntry::new(AuditAction::DeleteEnvironment, UserId::generate());
		assert_eq!(entry.booking_id, None);
		assert_eq!(entry.details, None);
	}
}
