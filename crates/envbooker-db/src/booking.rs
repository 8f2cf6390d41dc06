// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Booking repository.
//!
//! Interval columns are the sortable TEXT encoding from [`crate::datetime`],
//! which lets the overlap predicate `end_at > ?start AND start_at < ?end`
//! run directly in SQL against the `(environment_id, start_at)` index.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use envbooker_core::{BookedSpan, Booking, BookingId, EnvironmentId, Interval, UserId};
use sqlx::sqlite::SqlitePool;
use sqlx::{Row, SqliteConnection};
use std::str::FromStr;

use crate::datetime::{format_naive, parse_naive};
use crate::error::DbError;

#[async_trait]
pub trait BookingStore: Send + Sync {
	async fn get_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DbError>;
	async fn list_all(&self) -> Result<Vec<Booking>, DbError>;
	async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Booking>, DbError>;
	async fn list_for_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> Result<Vec<Booking>, DbError>;
	async fn list_overlapping(
		&self,
		environment_id: &EnvironmentId,
		from: NaiveDateTime,
		to: NaiveDateTime,
	) -> Result<Vec<BookedSpan>, DbError>;
	async fn count_for_environment(&self, environment_id: &EnvironmentId) -> Result<i64, DbError>;
}

/// Repository for booking rows.
#[derive(Clone)]
pub struct BookingRepository {
	pool: SqlitePool,
}

impl BookingRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	// =========================================================================
	// Reads
	// =========================================================================

	#[tracing::instrument(skip(self), fields(booking_id = %id))]
	pub async fn get_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, environment_id, user_id, start_at, end_at
			FROM bookings
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_booking(&r)).transpose()
	}

	/// List every booking in the system ordered by start time.
	#[tracing::instrument(skip(self))]
	pub async fn list_all(&self) -> Result<Vec<Booking>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, environment_id, user_id, start_at, end_at
			FROM bookings
			ORDER BY start_at
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_booking(r)).collect()
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Booking>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, environment_id, user_id, start_at, end_at
			FROM bookings
			WHERE user_id = ?
			ORDER BY start_at
			"#,
		)
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_booking(r)).collect()
	}

	#[tracing::instrument(skip(self), fields(environment_id = %environment_id))]
	pub async fn list_for_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> Result<Vec<Booking>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, environment_id, user_id, start_at, end_at
			FROM bookings
			WHERE environment_id = ?
			ORDER BY start_at
			"#,
		)
		.bind(environment_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_booking(r)).collect()
	}

	/// Bookings of one environment intersecting the half-open range
	/// `[from, to)`, as validator snapshot rows ordered by start.
	///
	/// Bookings that merely touch a range endpoint are not included, which
	/// mirrors the half-open overlap rule the validator applies.
	#[tracing::instrument(skip(self), fields(environment_id = %environment_id))]
	pub async fn list_overlapping(
		&self,
		environment_id: &EnvironmentId,
		from: NaiveDateTime,
		to: NaiveDateTime,
	) -> Result<Vec<BookedSpan>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, start_at, end_at
			FROM bookings
			WHERE environment_id = ? AND end_at > ? AND start_at < ?
			ORDER BY start_at
			"#,
		)
		.bind(environment_id.to_string())
		.bind(format_naive(from))
		.bind(format_naive(to))
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_span(r)).collect()
	}

	#[tracing::instrument(skip(self), fields(environment_id = %environment_id))]
	pub async fn count_for_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> Result<i64, DbError> {
		let row = sqlx::query("SELECT COUNT(*) AS n FROM bookings WHERE environment_id = ?")
			.bind(environment_id.to_string())
			.fetch_one(&self.pool)
			.await?;
		Ok(row.get("n"))
	}

	// =========================================================================
	// Transactional writes
	// =========================================================================

	/// Insert one booking inside the caller's transaction.
	pub async fn insert_in_tx(
		conn: &mut SqliteConnection,
		booking: &Booking,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO bookings (id, environment_id, user_id, start_at, end_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(booking.id.to_string())
		.bind(booking.environment_id.to_string())
		.bind(booking.user_id.to_string())
		.bind(format_naive(booking.start))
		.bind(format_naive(booking.end))
		.execute(conn)
		.await?;

		tracing::debug!(booking_id = %booking.id, environment_id = %booking.environment_id, "booking created");
		Ok(())
	}

	/// Rewrite a booking's environment and interval inside the caller's
	/// transaction. The owner never changes on edit.
	pub async fn update_in_tx(
		conn: &mut SqliteConnection,
		booking: &Booking,
	) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE bookings
			SET environment_id = ?, start_at = ?, end_at = ?
			WHERE id = ?
			"#,
		)
		.bind(booking.environment_id.to_string())
		.bind(format_naive(booking.start))
		.bind(format_naive(booking.end))
		.bind(booking.id.to_string())
		.execute(conn)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("booking {}", booking.id)));
		}

		tracing::debug!(booking_id = %booking.id, "booking updated");
		Ok(())
	}

	/// Delete one booking inside the caller's transaction.
	pub async fn delete_in_tx(conn: &mut SqliteConnection, id: &BookingId) -> Result<(), DbError> {
		let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
			.bind(id.to_string())
			.execute(conn)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("booking {id}")));
		}

		tracing::debug!(booking_id = %id, "booking deleted");
		Ok(())
	}

	/// Re-check for an overlap inside the caller's transaction.
	///
	/// Series inserts run this immediately before each slot insert so a
	/// booking committed after pre-validation still rolls the batch back.
	pub async fn overlap_exists_in_tx(
		conn: &mut SqliteConnection,
		environment_id: &EnvironmentId,
		candidate: &Interval,
		exclude: Option<BookingId>,
	) -> Result<bool, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id
			FROM bookings
			WHERE environment_id = ?1 AND end_at > ?2 AND start_at < ?3
				AND (?4 IS NULL OR id <> ?4)
			LIMIT 1
			"#,
		)
		.bind(environment_id.to_string())
		.bind(format_naive(candidate.start))
		.bind(format_naive(candidate.end))
		.bind(exclude.map(|id| id.to_string()))
		.fetch_optional(conn)
		.await?;

		Ok(row.is_some())
	}

	fn row_to_booking(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Booking, DbError> {
		let id_str: String = row.get("id");
		let environment_str: String = row.get("environment_id");
		let user_str: String = row.get("user_id");
		let start_at: String = row.get("start_at");
		let end_at: String = row.get("end_at");

		Ok(Booking {
			id: BookingId::from_str(&id_str)
				.map_err(|e| DbError::Corrupt(format!("invalid booking ID: {e}")))?,
			environment_id: EnvironmentId::from_str(&environment_str)
				.map_err(|e| DbError::Corrupt(format!("invalid environment ID: {e}")))?,
			user_id: UserId::from_str(&user_str)
				.map_err(|e| DbError::Corrupt(format!("invalid user ID: {e}")))?,
			start: parse_naive(&start_at)?,
			end: parse_naive(&end_at)?,
		})
	}

	fn row_to_span(&self, row: &sqlx::sqlite::SqliteRow) -> Result<BookedSpan, DbError> {
		let id_str: String = row.get("id");
		let start_at: String = row.get("start_at");
		let end_at: String = row.get("end_at");

		Ok(BookedSpan {
			id: BookingId::from_str(&id_str)
				.map_err(|e| DbError::Corrupt(format!("invalid booking ID: {e}")))?,
			start: parse_naive(&start_at)?,
			end: parse_naive(&end_at)?,
		})
	}
}

#[async_trait]
impl BookingStore for BookingRepository {
	async fn get_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DbError> {
		self.get_by_id(id).await
	}

	async fn list_all(&self) -> Result<Vec<Booking>, DbError> {
		self.list_all().await
	}

	async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Booking>, DbError> {
		self.list_for_user(user_id).await
	}

	async fn list_for_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> Result<Vec<Booking>, DbError> {
		self.list_for_environment(environment_id).await
	}

	async fn list_overlapping(
		&self,
		environment_id: &EnvironmentId,
		from: NaiveDateTime,
		to: NaiveDateTime,
	) -> Result<Vec<BookedSpan>, DbError> {
		self.list_overlapping(environment_id, from, to).await
	}

	async fn count_for_environment(&self, environment_id: &EnvironmentId) -> Result<i64, DbError> {
		self.count_for_environment(environment_id).await
	}
}
