// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Booking workflows.
//!
//! [`BookingService`] is the only writer of booking rows. Every mutation
//! runs as one transaction containing the row change and its audit entry,
//! so a failed request leaves no trace and a successful one always leaves
//! exactly its own audit lines.
//!
//! Validation happens against a snapshot read before the transaction;
//! series inserts additionally re-check each slot for overlaps inside the
//! transaction, which closes the race against bookings committed after the
//! snapshot was taken.

use chrono::{NaiveDateTime, NaiveTime, Utc};
use envbooker_core::{
	render_booking_ics, suggest, suggest_series, validate, Actor, AuditAction, AuditEntry,
	BookedSpan, Booking, BookingError, BookingId, BookingPolicy, Environment, EnvironmentId,
	Interval, SeriesPattern,
};
use envbooker_db::{
	AuditQuery, AuditRepository, BookingRepository, DbError, EnvironmentRepository,
};
use sqlx::sqlite::SqlitePool;

use crate::error::{Result, ServiceError};

/// How a single-slot create request should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
	/// Validate fully and refuse on any rule violation.
	#[default]
	Standard,
	/// The caller is accepting a previously offered alternative slot.
	/// Validation is identical to [`CreateMode::Standard`]; only the audit
	/// action differs, so the trail shows the slot came from a suggestion.
	AcceptSuggestion,
	/// Skip the duration, capacity and overlap checks. Honored only for
	/// admins; for everyone else this behaves exactly like
	/// [`CreateMode::Standard`]. A backwards interval is refused even when
	/// forced.
	Force,
}

/// Booking operations against one database.
#[derive(Clone)]
pub struct BookingService {
	pool: SqlitePool,
	environments: EnvironmentRepository,
	bookings: BookingRepository,
	audit: AuditRepository,
	policy: BookingPolicy,
}

impl BookingService {
	pub fn new(pool: SqlitePool, policy: BookingPolicy) -> Self {
		Self {
			environments: EnvironmentRepository::new(pool.clone()),
			bookings: BookingRepository::new(pool.clone()),
			audit: AuditRepository::new(pool.clone()),
			pool,
			policy,
		}
	}

	pub fn policy(&self) -> &BookingPolicy {
		&self.policy
	}

	// =========================================================================
	// Single bookings
	// =========================================================================

	/// Book one interval on an environment.
	///
	/// On a clash the caller typically runs [`Self::find_suggestion`] and, if
	/// the user agrees, retries with [`CreateMode::AcceptSuggestion`].
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, environment_id = %environment_id))]
	pub async fn create_single(
		&self,
		actor: &Actor,
		environment_id: EnvironmentId,
		interval: Interval,
		mode: CreateMode,
	) -> Result<Booking> {
		let environment = self.require_environment(&environment_id).await?;
		let forced = matches!(mode, CreateMode::Force) && actor.is_admin();

		if forced {
			if !interval.is_valid() {
				return Err(BookingError::InvalidInterval.into());
			}
		} else {
			let snapshot = self.validation_snapshot(&environment_id, interval).await?;
			validate(&self.policy, &snapshot, interval, None)?;
		}

		let booking = Booking {
			id: BookingId::generate(),
			environment_id,
			user_id: actor.id,
			start: interval.start,
			end: interval.end,
		};
		let action = if forced {
			AuditAction::ForcedSingleBook
		} else if matches!(mode, CreateMode::AcceptSuggestion) {
			AuditAction::AcceptSuggestion
		} else {
			AuditAction::CreateBooking
		};
		let entry = AuditEntry::new(action, actor.id)
			.with_booking(booking.id)
			.with_details_json(&booking_details(&environment, &booking));

		let mut tx = self.pool.begin().await.map_err(DbError::from)?;
		BookingRepository::insert_in_tx(&mut tx, &booking).await?;
		AuditRepository::record_in_tx(&mut tx, &entry).await?;
		tx.commit().await.map_err(DbError::from)?;

		tracing::info!(booking_id = %booking.id, action = %action, "booking created");
		Ok(booking)
	}

	// =========================================================================
	// Series bookings
	// =========================================================================

	/// Book every slot of a weekly pattern, or nothing.
	///
	/// All slots are validated against a snapshot first; the first clash
	/// rejects the whole batch naming that slot. The inserts then run in one
	/// transaction with a per-slot overlap re-check, so a concurrent booking
	/// rolls the entire series back rather than leaving a partial one.
	#[tracing::instrument(skip(self, actor, pattern), fields(actor_id = %actor.id, environment_id = %environment_id))]
	pub async fn create_series(
		&self,
		actor: &Actor,
		environment_id: EnvironmentId,
		pattern: &SeriesPattern,
		force: bool,
	) -> Result<Vec<Booking>> {
		let environment = self.require_environment(&environment_id).await?;
		let slots = pattern.expand();
		if slots.is_empty() {
			return Err(BookingError::NoMatchingWeekdays.into());
		}
		let forced = force && actor.is_admin();

		if forced {
			// Slots share the pattern times, so one validity check covers
			// all of them. Force never licenses a backwards interval.
			if !slots[0].is_valid() {
				return Err(BookingError::InvalidInterval.into());
			}
		} else {
			let snapshot = self.series_snapshot(&environment_id, &slots).await?;
			for slot in &slots {
				validate(&self.policy, &snapshot, *slot, None)?;
			}
		}

		let mut tx = self.pool.begin().await.map_err(DbError::from)?;
		let mut created = Vec::with_capacity(slots.len());
		for slot in &slots {
			if !forced
				&& BookingRepository::overlap_exists_in_tx(&mut tx, &environment_id, slot, None)
					.await?
			{
				return Err(BookingError::Clash {
					slot_start: slot.start,
				}
				.into());
			}

			let booking = Booking {
				id: BookingId::generate(),
				environment_id,
				user_id: actor.id,
				start: slot.start,
				end: slot.end,
			};
			BookingRepository::insert_in_tx(&mut tx, &booking).await?;

			let action = if forced {
				AuditAction::ForcedSeriesBook
			} else {
				AuditAction::CreateSeries
			};
			let entry = AuditEntry::new(action, actor.id)
				.with_booking(booking.id)
				.with_details_json(&booking_details(&environment, &booking));
			AuditRepository::record_in_tx(&mut tx, &entry).await?;

			created.push(booking);
		}

		let summary_action = if forced {
			AuditAction::ForcedSeriesBookingSummary
		} else {
			AuditAction::CreateSeriesSummary
		};
		let summary = AuditEntry::new(summary_action, actor.id)
			.with_details_json(&series_details(&environment, pattern, created.len()));
		AuditRepository::record_in_tx(&mut tx, &summary).await?;
		tx.commit().await.map_err(DbError::from)?;

		tracing::info!(slots = created.len(), forced, "series created");
		Ok(created)
	}

	// =========================================================================
	// Edits and deletes
	// =========================================================================

	/// Move a booking to a new interval, possibly on another environment.
	///
	/// Only the owner or an admin may edit. The booking being moved is
	/// excluded from validation so it never clashes with itself.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, booking_id = %booking_id))]
	pub async fn update_booking(
		&self,
		actor: &Actor,
		booking_id: BookingId,
		environment_id: EnvironmentId,
		interval: Interval,
		force: bool,
	) -> Result<Booking> {
		let existing = self
			.bookings
			.get_by_id(&booking_id)
			.await?
			.ok_or(ServiceError::BookingNotFound(booking_id))?;
		if !actor.can_modify_booking_of(existing.user_id) {
			return Err(ServiceError::Forbidden);
		}
		let environment = self.require_environment(&environment_id).await?;
		let forced = force && actor.is_admin();

		if forced {
			if !interval.is_valid() {
				return Err(BookingError::InvalidInterval.into());
			}
		} else {
			let snapshot = self.validation_snapshot(&environment_id, interval).await?;
			validate(&self.policy, &snapshot, interval, Some(booking_id))?;
		}

		let updated = Booking {
			id: existing.id,
			environment_id,
			user_id: existing.user_id,
			start: interval.start,
			end: interval.end,
		};
		let action = if forced {
			AuditAction::ForcedEdit
		} else {
			AuditAction::EditBooking
		};
		let entry = AuditEntry::new(action, actor.id)
			.with_booking(updated.id)
			.with_details_json(&edit_details(&environment, &existing, &updated));

		let mut tx = self.pool.begin().await.map_err(DbError::from)?;
		BookingRepository::update_in_tx(&mut tx, &updated).await?;
		AuditRepository::record_in_tx(&mut tx, &entry).await?;
		tx.commit().await.map_err(DbError::from)?;

		tracing::info!(booking_id = %updated.id, action = %action, "booking updated");
		Ok(updated)
	}

	/// Delete a booking. Owner or admin only; no scheduling rules apply.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, booking_id = %booking_id))]
	pub async fn delete_booking(&self, actor: &Actor, booking_id: BookingId) -> Result<()> {
		let existing = self
			.bookings
			.get_by_id(&booking_id)
			.await?
			.ok_or(ServiceError::BookingNotFound(booking_id))?;
		if !actor.can_modify_booking_of(existing.user_id) {
			return Err(ServiceError::Forbidden);
		}

		let environment_name = self
			.environments
			.get_by_id(&existing.environment_id)
			.await?
			.map(|e| e.name)
			.unwrap_or_else(|| existing.environment_id.to_string());
		let entry = AuditEntry::new(AuditAction::DeleteBooking, actor.id)
			.with_booking(existing.id)
			.with_details(format!(
				"Removed booking of {} from {} to {}",
				environment_name, existing.start, existing.end
			));

		let mut tx = self.pool.begin().await.map_err(DbError::from)?;
		BookingRepository::delete_in_tx(&mut tx, &booking_id).await?;
		AuditRepository::record_in_tx(&mut tx, &entry).await?;
		tx.commit().await.map_err(DbError::from)?;

		tracing::info!(booking_id = %booking_id, "booking deleted");
		Ok(())
	}

	// =========================================================================
	// Suggestions
	// =========================================================================

	/// Nearest clash-free alternative for a refused single booking.
	#[tracing::instrument(skip(self), fields(environment_id = %environment_id))]
	pub async fn find_suggestion(
		&self,
		environment_id: EnvironmentId,
		desired: Interval,
	) -> Result<Option<Interval>> {
		self.require_environment(&environment_id).await?;
		let from = desired.start - self.policy.suggestion_window;
		let to = desired.end + self.policy.suggestion_window;
		let snapshot = self.bookings.list_overlapping(&environment_id, from, to).await?;
		Ok(suggest(&self.policy, &snapshot, desired))
	}

	/// One time-of-day shift that frees every slot of a refused series.
	#[tracing::instrument(skip(self, pattern), fields(environment_id = %environment_id))]
	pub async fn find_series_suggestion(
		&self,
		environment_id: EnvironmentId,
		pattern: &SeriesPattern,
	) -> Result<Option<(NaiveTime, NaiveTime)>> {
		self.require_environment(&environment_id).await?;
		let slots = pattern.expand();
		let Some(first) = slots.first() else {
			return Ok(None);
		};
		let last = slots[slots.len() - 1];
		let from = first.start - self.policy.suggestion_window;
		let to = last.start.max(last.end) + self.policy.suggestion_window;
		let snapshot = self.bookings.list_overlapping(&environment_id, from, to).await?;
		Ok(suggest_series(&self.policy, &snapshot, pattern))
	}

	// =========================================================================
	// Read views and export
	// =========================================================================

	/// Bookings visible to the actor: admins see everything, everyone else
	/// sees their own.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id))]
	pub async fn list_bookings(&self, actor: &Actor) -> Result<Vec<Booking>> {
		let bookings = if actor.is_admin() {
			self.bookings.list_all().await?
		} else {
			self.bookings.list_for_user(&actor.id).await?
		};
		Ok(bookings)
	}

	/// One booking, visible to its owner or an admin.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, booking_id = %booking_id))]
	pub async fn get_booking(&self, actor: &Actor, booking_id: BookingId) -> Result<Booking> {
		let booking = self
			.bookings
			.get_by_id(&booking_id)
			.await?
			.ok_or(ServiceError::BookingNotFound(booking_id))?;
		if !actor.can_modify_booking_of(booking.user_id) {
			return Err(ServiceError::Forbidden);
		}
		Ok(booking)
	}

	/// Full schedule of one environment ordered by start.
	#[tracing::instrument(skip(self), fields(environment_id = %environment_id))]
	pub async fn environment_schedule(
		&self,
		environment_id: EnvironmentId,
	) -> Result<Vec<Booking>> {
		self.require_environment(&environment_id).await?;
		Ok(self.bookings.list_for_environment(&environment_id).await?)
	}

	/// Render one booking as an iCalendar document. Owner or admin only.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, booking_id = %booking_id))]
	pub async fn calendar_export(&self, actor: &Actor, booking_id: BookingId) -> Result<String> {
		let booking = self
			.bookings
			.get_by_id(&booking_id)
			.await?
			.ok_or(ServiceError::BookingNotFound(booking_id))?;
		if !actor.can_modify_booking_of(booking.user_id) {
			return Err(ServiceError::Forbidden);
		}
		let environment = self.require_environment(&booking.environment_id).await?;
		Ok(render_booking_ics(&booking, &environment.name, Utc::now()))
	}

	/// Read the audit trail. Admin only.
	#[tracing::instrument(skip(self, actor, query), fields(actor_id = %actor.id))]
	pub async fn list_audit(
		&self,
		actor: &Actor,
		query: &AuditQuery,
	) -> Result<(Vec<AuditEntry>, i64)> {
		if !actor.is_admin() {
			return Err(ServiceError::Forbidden);
		}
		Ok(self.audit.query(query).await?)
	}

	// =========================================================================
	// Internals
	// =========================================================================

	async fn require_environment(&self, id: &EnvironmentId) -> Result<Environment> {
		self.environments
			.get_by_id(id)
			.await?
			.ok_or(ServiceError::EnvironmentNotFound(*id))
	}

	/// Snapshot of every booking that can affect validation of `candidate`:
	/// everything touching the candidate's start day (for the utilization
	/// sum) plus the candidate interval itself (for the overlap check).
	async fn validation_snapshot(
		&self,
		environment_id: &EnvironmentId,
		candidate: Interval,
	) -> Result<Vec<BookedSpan>> {
		let day = candidate.start.date();
		let day_start = day.and_time(NaiveTime::MIN);
		let day_end = match day.succ_opt() {
			Some(next) => next.and_time(NaiveTime::MIN),
			None => NaiveDateTime::MAX,
		};
		let from = day_start.min(candidate.start);
		let to = day_end.max(candidate.end);
		Ok(self.bookings.list_overlapping(environment_id, from, to).await?)
	}

	/// Snapshot covering every calendar day a series expansion touches.
	async fn series_snapshot(
		&self,
		environment_id: &EnvironmentId,
		slots: &[Interval],
	) -> Result<Vec<BookedSpan>> {
		let first = slots[0];
		let last = slots[slots.len() - 1];
		let from = first.start.date().and_time(NaiveTime::MIN);
		let last_day = last.start.date().max(last.end.date());
		let to = match last_day.succ_opt() {
			Some(next) => next.and_time(NaiveTime::MIN),
			None => NaiveDateTime::MAX,
		};
		Ok(self.bookings.list_overlapping(environment_id, from, to).await?)
	}
}

fn booking_details(environment: &Environment, booking: &Booking) -> serde_json::Value {
	serde_json::json!({
		"environment": environment.name,
		"start": booking.start.to_string(),
		"end": booking.end.to_string(),
	})
}

fn edit_details(
	environment: &Environment,
	original: &Booking,
	updated: &Booking,
) -> serde_json::Value {
	serde_json::json!({
		"environment": environment.name,
		"from": {
			"start": original.start.to_string(),
			"end": original.end.to_string(),
		},
		"to": {
			"start": updated.start.to_string(),
			"end": updated.end.to_string(),
		},
	})
}

fn series_details(
	environment: &Environment,
	pattern: &SeriesPattern,
	slots: usize,
) -> serde_json::Value {
	serde_json::json!({
		"environment": environment.name,
		"start_date": pattern.start_date.to_string(),
		"end_date": pattern.end_date.to_string(),
		"weekdays": pattern.weekdays.indices(),
		"start_time": pattern.start_time.format("%H:%M").to_string(),
		"end_time": pattern.end_time.format("%H:%M").to_string(),
		"slots": slots,
	})
}
