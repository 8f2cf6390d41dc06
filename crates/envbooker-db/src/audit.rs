// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit log repository.
//!
//! Entries are append-only. Writes happen through [`AuditRepository::record_in_tx`]
//! only, inside the same transaction as the mutation they describe; there is
//! no update or delete.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use envbooker_core::{AuditAction, AuditEntry, AuditEntryId, BookingId, UserId};
use sqlx::sqlite::SqlitePool;
use sqlx::{Row, SqliteConnection};
use std::str::FromStr;

use crate::datetime::{format_utc, parse_utc};
use crate::error::DbError;

/// Filters for reading the audit trail. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
	pub action: Option<AuditAction>,
	pub actor_id: Option<UserId>,
	pub booking_id: Option<BookingId>,
	pub from: Option<DateTime<Utc>>,
	pub to: Option<DateTime<Utc>>,
	pub limit: Option<i64>,
	pub offset: i64,
}

#[async_trait]
pub trait AuditStore: Send + Sync {
	async fn query(&self, query: &AuditQuery) -> Result<(Vec<AuditEntry>, i64), DbError>;
	async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>, DbError>;
}

/// Repository for audit log rows.
#[derive(Clone)]
pub struct AuditRepository {
	pool: SqlitePool,
}

impl AuditRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Append one audit entry inside the caller's transaction.
	pub async fn record_in_tx(
		conn: &mut SqliteConnection,
		entry: &AuditEntry,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO audit_log (id, action, actor_id, booking_id, details, timestamp)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(entry.id.to_string())
		.bind(entry.action.as_str())
		.bind(entry.actor_id.to_string())
		.bind(entry.booking_id.map(|id| id.to_string()))
		.bind(entry.details.as_deref())
		.bind(format_utc(entry.timestamp))
		.execute(conn)
		.await?;

		tracing::debug!(action = %entry.action, actor_id = %entry.actor_id, "audit entry recorded");
		Ok(())
	}

	/// Query the trail newest first, returning the page and the total match
	/// count.
	#[tracing::instrument(skip(self, query))]
	pub async fn query(&self, query: &AuditQuery) -> Result<(Vec<AuditEntry>, i64), DbError> {
		let mut conditions: Vec<&str> = Vec::new();
		let mut binds: Vec<String> = Vec::new();

		if let Some(action) = query.action {
			conditions.push("action = ?");
			binds.push(action.as_str().to_string());
		}
		if let Some(actor_id) = query.actor_id {
			conditions.push("actor_id = ?");
			binds.push(actor_id.to_string());
		}
		if let Some(booking_id) = query.booking_id {
			conditions.push("booking_id = ?");
			binds.push(booking_id.to_string());
		}
		if let Some(from) = query.from {
			conditions.push("timestamp >= ?");
			binds.push(format_utc(from));
		}
		if let Some(to) = query.to {
			conditions.push("timestamp < ?");
			binds.push(format_utc(to));
		}

		let where_clause = if conditions.is_empty() {
			String::new()
		} else {
			format!("WHERE {}", conditions.join(" AND "))
		};

		let count_sql = format!("SELECT COUNT(*) AS n FROM audit_log {where_clause}");
		let mut count_query = sqlx::query(&count_sql);
		for bind in &binds {
			count_query = count_query.bind(bind);
		}
		let total: i64 = count_query.fetch_one(&self.pool).await?.get("n");

		let page_sql = format!(
			r#"
			SELECT id, action, actor_id, booking_id, details, timestamp
			FROM audit_log
			{where_clause}
			ORDER BY timestamp DESC
			LIMIT ? OFFSET ?
			"#
		);
		let mut page_query = sqlx::query(&page_sql);
		for bind in &binds {
			page_query = page_query.bind(bind);
		}
		let rows = page_query
			.bind(query.limit.unwrap_or(i64::MAX))
			.bind(query.offset)
			.fetch_all(&self.pool)
			.await?;

		let entries = rows
			.iter()
			.map(|r| self.row_to_entry(r))
			.collect::<Result<Vec<_>, _>>()?;
		Ok((entries, total))
	}

	/// The newest `limit` entries.
	#[tracing::instrument(skip(self))]
	pub async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>, DbError> {
		let query = AuditQuery {
			limit: Some(limit),
			..AuditQuery::default()
		};
		let (entries, _) = self.query(&query).await?;
		Ok(entries)
	}

	fn row_to_entry(&self, row: &sqlx::sqlite::SqliteRow) -> Result<AuditEntry, DbError> {
		let id_str: String = row.get("id");
		let action_str: String = row.get("action");
		let actor_str: String = row.get("actor_id");
		let booking_str: Option<String> = row.get("booking_id");
		let timestamp: String = row.get("timestamp");

		let booking_id = booking_str
			.map(|raw| {
				BookingId::from_str(&raw)
					.map_err(|e| DbError::Corrupt(format!("invalid booking ID: {e}")))
			})
			.transpose()?;

		Ok(AuditEntry {
			id: AuditEntryId::from_str(&id_str)
				.map_err(|e| DbError::Corrupt(format!("invalid audit entry ID: {e}")))?,
			action: AuditAction::from_str(&action_str).map_err(DbError::Corrupt)?,
			actor_id: UserId::from_str(&actor_str)
				.map_err(|e| DbError::Corrupt(format!("invalid actor ID: {e}")))?,
			booking_id,
			details: row.get("details"),
			timestamp: parse_utc(&timestamp)?,
		})
	}
}

#[async_trait]
impl AuditStore for AuditRepository {
	async fn query(&self, query: &AuditQuery) -> Result<(Vec<AuditEntry>, i64), DbError> {
		self.query(query).await
	}

	async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>, DbError> {
		self.list_recent(limit).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;
	use chrono::{Duration, TimeZone};

	async fn record(pool: &SqlitePool, entry: &AuditEntry) {
		let mut tx = pool.begin().await.unwrap();
		AuditRepository::record_in_tx(&mut tx, entry).await.unwrap();
		tx.commit().await.unwrap();
	}

	fn entry_at(action: AuditAction, actor: UserId, at: DateTime<Utc>) -> AuditEntry {
		let mut entry = AuditEntry::new(action, actor);
		entry.timestamp = at;
		entry
	}

	#[tokio::test]
	async fn record_and_read_back_round_trips() {
		let pool = create_test_pool().await;
		let repo = AuditRepository::new(pool.clone());
		let actor = UserId::generate();
		let booking = BookingId::generate();
		let entry = AuditEntry::new(AuditAction::CreateBooking, actor)
			.with_booking(booking)
			.with_details(r#"{"environment":"staging-1"}"#);
		record(&pool, &entry).await;

		let stored = repo.list_recent(10).await.unwrap();
		assert_eq!(stored, vec![entry]);
	}

	#[tokio::test]
	async fn entries_come_back_newest_first() {
		let pool = create_test_pool().await;
		let repo = AuditRepository::new(pool.clone());
		let actor = UserId::generate();
		let base = Utc.with_ymd_and_hms(2025, 5, 12, 8, 0, 0).unwrap();

		let first = entry_at(AuditAction::CreateBooking, actor, base);
		let second = entry_at(AuditAction::EditBooking, actor, base + Duration::minutes(5));
		let third = entry_at(AuditAction::DeleteBooking, actor, base + Duration::minutes(10));
		for entry in [&first, &second, &third] {
			record(&pool, entry).await;
		}

		let stored = repo.list_recent(10).await.unwrap();
		let actions: Vec<AuditAction> = stored.iter().map(|e| e.action).collect();
		assert_eq!(
			actions,
			vec![
				AuditAction::DeleteBooking,
				AuditAction::EditBooking,
				AuditAction::CreateBooking
			]
		);
	}

	#[tokio::test]
	async fn filters_narrow_the_result() {
		let pool = create_test_pool().await;
		let repo = AuditRepository::new(pool.clone());
		let alice = UserId::generate();
		let bob = UserId::generate();
		let base = Utc.with_ymd_and_hms(2025, 5, 12, 8, 0, 0).unwrap();

		record(&pool, &entry_at(AuditAction::CreateBooking, alice, base)).await;
		record(
			&pool,
			&entry_at(AuditAction::CreateBooking, bob, base + Duration::minutes(1)),
		)
		.await;
		record(
			&pool,
			&entry_at(AuditAction::DeleteBooking, alice, base + Duration::minutes(2)),
		)
		.await;

		let (by_action, total) = repo
			.query(&AuditQuery {
				action: Some(AuditAction::CreateBooking),
				..AuditQuery::default()
			})
			.await
			.unwrap();
		assert_eq!(total, 2);
		assert_eq!(by_action.len(), 2);

		let (by_actor, total) = repo
			.query(&AuditQuery {
				actor_id: Some(alice),
				..AuditQuery::default()
			})
			.await
			.unwrap();
		assert_eq!(total, 2);
		assert!(by_actor.iter().all(|e| e.actor_id == alice));

		let (by_window, total) = repo
			.query(&AuditQuery {
				from: Some(base + Duration::minutes(1)),
				to: Some(base + Duration::minutes(2)),
				..AuditQuery::default()
			})
			.await
			.unwrap();
		assert_eq!(total, 1);
		assert_eq!(by_window[0].actor_id, bob);
	}

	#[tokio::test]
	async fn paging_reports_the_full_total() {
		let pool = create_test_pool().await;
		let repo = AuditRepository::new(pool.clone());
		let actor = UserId::generate();
		let base = Utc.with_ymd_and_hms(2025, 5, 12, 8, 0, 0).unwrap();
		for i in 0..5 {
			record(
				&pool,
				&entry_at(AuditAction::CreateBooking, actor, base + Duration::minutes(i)),
			)
			.await;
		}

		let (page, total) = repo
			.query(&AuditQuery {
				limit: Some(2),
				offset: 2,
				..AuditQuery::default()
			})
			.await
			.unwrap();
		assert_eq!(total, 5);
		assert_eq!(page.len(), 2);
		// Newest first with offset 2 lands on minutes 2 and 1.
		assert_eq!(page[0].timestamp, base + Duration::minutes(2));
		assert_eq!(page[1].timestamp, base + Duration::minutes(1));
	}

	#[tokio::test]
	async fn unknown_action_string_is_corrupt() {
		let pool = create_test_pool().await;
		let repo = AuditRepository::new(pool.clone());
		sqlx::query(
			r#"
			INSERT INTO audit_log (id, action, actor_id, booking_id, details, timestamp)
			VALUES (?, 'drop_table', ?, NULL, NULL, ?)
			"#,
		)
		.bind(AuditEntryId::generate().to_string())
		.bind(UserId::generate().to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(&pool)
		.await
		.unwrap();

		let err = repo.list_recent(1).await.unwrap_err();
		assert!(matches!(err, DbError::Corrupt(_)));
	}
}
