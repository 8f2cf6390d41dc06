// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment repository.
//!
//! Reads go through the pool; writes are associated functions taking a live
//! connection so the caller can put them in one transaction with the audit
//! entry that describes them.

use async_trait::async_trait;
use envbooker_core::{Environment, EnvironmentId};
use sqlx::sqlite::SqlitePool;
use sqlx::{Row, SqliteConnection};
use std::str::FromStr;

use crate::datetime::{format_utc, parse_utc};
use crate::error::DbError;

#[async_trait]
pub trait EnvironmentStore: Send + Sync {
	async fn get_by_id(&self, id: &EnvironmentId) -> Result<Option<Environment>, DbError>;
	async fn get_by_name(&self, name: &str) -> Result<Option<Environment>, DbError>;
	async fn list(&self) -> Result<Vec<Environment>, DbError>;
}

/// Repository for environment rows.
///
/// All IDs are UUIDs stored as strings in SQLite.
#[derive(Clone)]
pub struct EnvironmentRepository {
	pool: SqlitePool,
}

impl EnvironmentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	// =========================================================================
	// Reads
	// =========================================================================

	/// Get an environment by ID.
	///
	/// # Returns
	/// `None` if no environment exists with this ID.
	#[tracing::instrument(skip(self), fields(environment_id = %id))]
	pub async fn get_by_id(&self, id: &EnvironmentId) -> Result<Option<Environment>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, owner_squad, created_at, created_by_email
			FROM environments
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_environment(&r)).transpose()
	}

	/// Get an environment by its unique name.
	#[tracing::instrument(skip(self), fields(name = %name))]
	pub async fn get_by_name(&self, name: &str) -> Result<Option<Environment>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, owner_squad, created_at, created_by_email
			FROM environments
			WHERE name = ?
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_environment(&r)).transpose()
	}

	/// List all environments ordered by name.
	#[tracing::instrument(skip(self))]
	pub async fn list(&self) -> Result<Vec<Environment>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, owner_squad, created_at, created_by_email
			FROM environments
			ORDER BY name
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_environment(r)).collect()
	}

	// =========================================================================
	// Transactional writes
	// =========================================================================

	/// Insert a new environment inside the caller's transaction.
	///
	/// # Errors
	/// Returns `DbError::Conflict` when the name is already taken.
	pub async fn insert_in_tx(
		conn: &mut SqliteConnection,
		environment: &Environment,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO environments (id, name, owner_squad, created_at, created_by_email)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(environment.id.to_string())
		.bind(&environment.name)
		.bind(&environment.owner_squad)
		.bind(format_utc(environment.created_at))
		.bind(&environment.created_by_email)
		.execute(conn)
		.await
		.map_err(|e| map_unique_name(e, &environment.name))?;

		tracing::debug!(environment_id = %environment.id, name = %environment.name, "environment created");
		Ok(())
	}

	/// Update an environment's name and owner squad inside the caller's
	/// transaction.
	pub async fn update_in_tx(
		conn: &mut SqliteConnection,
		environment: &Environment,
	) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE environments
			SET name = ?, owner_squad = ?
			WHERE id = ?
			"#,
		)
		.bind(&environment.name)
		.bind(&environment.owner_squad)
		.bind(environment.id.to_string())
		.execute(conn)
		.await
		.map_err(|e| map_unique_name(e, &environment.name))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("environment {}", environment.id)));
		}

		tracing::debug!(environment_id = %environment.id, "environment updated");
		Ok(())
	}

	/// Delete an environment inside the caller's transaction.
	pub async fn delete_in_tx(
		conn: &mut SqliteConnection,
		id: &EnvironmentId,
	) -> Result<(), DbError> {
		let result = sqlx::query("DELETE FROM environments WHERE id = ?")
			.bind(id.to_string())
			.execute(conn)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("environment {id}")));
		}

		tracing::debug!(environment_id = %id, "environment deleted");
		Ok(())
	}

	fn row_to_environment(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Environment, DbError> {
		let id_str: String = row.get("id");
		let created_at: String = row.get("created_at");

		let id = EnvironmentId::from_str(&id_str)
			.map_err(|e| DbError::Corrupt(format!("invalid environment ID: {e}")))?;

		Ok(Environment {
			id,
			name: row.get("name"),
			owner_squad: row.get("owner_squad"),
			created_at: parse_utc(&created_at)?,
			created_by_email: row.get("created_by_email"),
		})
	}
}

#[async_trait]
impl EnvironmentStore for EnvironmentRepository {
	async fn get_by_id(&self, id: &EnvironmentId) -> Result<Option<Environment>, DbError> {
		self.get_by_id(id).await
	}

	async fn get_by_name(&self, name: &str) -> Result<Option<Environment>, DbError> {
		self.get_by_name(name).await
	}

	async fn list(&self) -> Result<Vec<Environment>, DbError> {
		self.list().await
	}
}

fn map_unique_name(e: sqlx::Error, name: &str) -> DbError {
	if let sqlx::Error::Database(ref db) = e {
		if db.message().contains("UNIQUE constraint failed: environments.name") {
			return DbError::Conflict(format!("environment name already in use: {name}"));
		}
	}
	DbError::Sqlx(e)
}
