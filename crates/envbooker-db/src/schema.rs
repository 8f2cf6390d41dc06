// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema bootstrap.
//!
//! The full schema is three tables. Every statement is idempotent, so
//! [`apply_schema`] can run on every startup; existing data is never touched.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

/// Create all tables and indexes if they do not exist yet.
#[tracing::instrument(skip(pool))]
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS environments (
			id TEXT PRIMARY KEY,
			name TEXT NOT NULL UNIQUE,
			owner_squad TEXT NOT NULL,
			created_at TEXT NOT NULL,
			created_by_email TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS bookings (
			id TEXT PRIMARY KEY,
			environment_id TEXT NOT NULL REFERENCES environments(id),
			user_id TEXT NOT NULL,
			start_at TEXT NOT NULL,
			end_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE INDEX IF NOT EXISTS idx_bookings_environment_start
		ON bookings (environment_id, start_at)
		"#,
	)
	.execute(pool)
	.await?;

	// booking_id carries no foreign key: audit lines outlive the bookings
	// they describe.
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS audit_log (
			id TEXT PRIMARY KEY,
			action TEXT NOT NULL,
			actor_id TEXT NOT NULL,
			booking_id TEXT,
			details TEXT,
			timestamp TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp
		ON audit_log (timestamp)
		"#,
	)
	.execute(pool)
	.await?;

	tracing::debug!("database schema applied");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn schema_applies_twice_without_error() {
		let pool = SqlitePool::connect(":memory:").await.unwrap();
		apply_schema(&pool).await.unwrap();
		apply_schema(&pool).await.unwrap();
	}

	#[tokio::test]
	async fn all_tables_exist_after_apply() {
		let pool = SqlitePool::connect(":memory:").await.unwrap();
		apply_schema(&pool).await.unwrap();
		for table in ["environments", "bookings", "audit_log"] {
			let found: Option<(String,)> = sqlx::query_as(
				"SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
			)
			.bind(table)
			.fetch_optional(&pool)
			.await
			.unwrap();
			assert!(found.is_some(), "missing table {table}");
		}
	}
}
