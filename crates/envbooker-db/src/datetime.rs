// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Timestamp encoding for TEXT columns.
//!
//! Booking times are naive wall-clock values stored as
//! `YYYY-MM-DDTHH:MM:SS`. With zero-padded fields the lexicographic order of
//! the stored strings equals chronological order, so range predicates in SQL
//! compare TEXT directly. Audit and provenance timestamps are UTC instants
//! stored as RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::DbError;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn format_naive(ts: NaiveDateTime) -> String {
	ts.format(NAIVE_FORMAT).to_string()
}

pub(crate) fn parse_naive(raw: &str) -> Result<NaiveDateTime, DbError> {
	NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
		.map_err(|e| DbError::Corrupt(format!("invalid booking timestamp {raw:?}: {e}")))
}

pub(crate) fn format_utc(ts: DateTime<Utc>) -> String {
	ts.to_rfc3339()
}

pub(crate) fn parse_utc(raw: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|ts| ts.with_timezone(&Utc))
		.map_err(|e| DbError::Corrupt(format!("invalid UTC timestamp {raw:?}: {e}")))
}
