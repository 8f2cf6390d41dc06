// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment management.
//!
//! Environments are the things people book. Creating, renaming and deleting
//! them is admin-only and audited; reading is open to everyone. Deletion is
//! refused while bookings exist so the schedule never points at a missing
//! environment.

use chrono::Utc;
use envbooker_core::{Actor, AuditAction, AuditEntry, Environment, EnvironmentId};
use envbooker_db::{AuditRepository, BookingRepository, DbError, EnvironmentRepository};
use sqlx::sqlite::SqlitePool;

use crate::error::{Result, ServiceError};

/// Input for a new environment, before validation.
#[derive(Debug, Clone)]
pub struct NewEnvironment {
	pub name: String,
	pub owner_squad: String,
	pub created_by_email: String,
}

/// Environment administration against one database.
#[derive(Clone)]
pub struct EnvironmentService {
	pool: SqlitePool,
	environments: EnvironmentRepository,
	bookings: BookingRepository,
}

impl EnvironmentService {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			environments: EnvironmentRepository::new(pool.clone()),
			bookings: BookingRepository::new(pool.clone()),
			pool,
		}
	}

	/// Create an environment. Admin only.
	#[tracing::instrument(skip(self, actor, draft), fields(actor_id = %actor.id))]
	pub async fn create_environment(
		&self,
		actor: &Actor,
		draft: NewEnvironment,
	) -> Result<Environment> {
		if !actor.is_admin() {
			return Err(ServiceError::Forbidden);
		}
		let name = normalized_name(&draft.name)?;
		let owner_squad = normalized_owner_squad(&draft.owner_squad)?;
		if self.environments.get_by_name(&name).await?.is_some() {
			return Err(ServiceError::NameTaken(name));
		}

		let environment = Environment {
			id: EnvironmentId::generate(),
			name,
			owner_squad,
			created_at: Utc::now(),
			created_by_email: draft.created_by_email,
		};
		let entry = AuditEntry::new(AuditAction::CreateEnvironment, actor.id).with_details_json(
			&serde_json::json!({
				"name": environment.name,
				"owner_squad": environment.owner_squad,
			}),
		);

		let mut tx = self.pool.begin().await.map_err(DbError::from)?;
		if let Err(err) = EnvironmentRepository::insert_in_tx(&mut tx, &environment).await {
			// Lost a race against a concurrent create with the same name.
			return Err(match err {
				DbError::Conflict(_) => ServiceError::NameTaken(environment.name),
				other => other.into(),
			});
		}
		AuditRepository::record_in_tx(&mut tx, &entry).await?;
		tx.commit().await.map_err(DbError::from)?;

		tracing::info!(environment_id = %environment.id, name = %environment.name, "environment created");
		Ok(environment)
	}

	/// Rename an environment or reassign its owner squad. Admin only.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, environment_id = %environment_id))]
	pub async fn update_environment(
		&self,
		actor: &Actor,
		environment_id: EnvironmentId,
		name: &str,
		owner_squad: &str,
	) -> Result<Environment> {
		if !actor.is_admin() {
			return Err(ServiceError::Forbidden);
		}
		let existing = self.get(environment_id).await?;
		let name = normalized_name(name)?;
		let owner_squad = normalized_owner_squad(owner_squad)?;
		if let Some(holder) = self.environments.get_by_name(&name).await? {
			if holder.id != environment_id {
				return Err(ServiceError::NameTaken(name));
			}
		}

		let updated = Environment {
			id: existing.id,
			name,
			owner_squad,
			created_at: existing.created_at,
			created_by_email: existing.created_by_email.clone(),
		};
		let entry = AuditEntry::new(AuditAction::UpdateEnvironment, actor.id).with_details_json(
			&serde_json::json!({
				"from": { "name": existing.name, "owner_squad": existing.owner_squad },
				"to": { "name": updated.name, "owner_squad": updated.owner_squad },
			}),
		);

		let mut tx = self.pool.begin().await.map_err(DbError::from)?;
		if let Err(err) = EnvironmentRepository::update_in_tx(&mut tx, &updated).await {
			return Err(match err {
				DbError::Conflict(_) => ServiceError::NameTaken(updated.name),
				other => other.into(),
			});
		}
		AuditRepository::record_in_tx(&mut tx, &entry).await?;
		tx.commit().await.map_err(DbError::from)?;

		tracing::info!(environment_id = %updated.id, name = %updated.name, "environment updated");
		Ok(updated)
	}

	/// Delete an environment with no bookings. Admin only.
	#[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id, environment_id = %environment_id))]
	pub async fn delete_environment(
		&self,
		actor: &Actor,
		environment_id: EnvironmentId,
	) -> Result<()> {
		if !actor.is_admin() {
			return Err(ServiceError::Forbidden);
		}
		let existing = self.get(environment_id).await?;
		if self.bookings.count_for_environment(&environment_id).await? > 0 {
			return Err(ServiceError::EnvironmentInUse);
		}

		let entry = AuditEntry::new(AuditAction::DeleteEnvironment, actor.id)
			.with_details(format!("Deleted environment '{}'", existing.name));

		let mut tx = self.pool.begin().await.map_err(DbError::from)?;
		EnvironmentRepository::delete_in_tx(&mut tx, &environment_id).await?;
		AuditRepository::record_in_tx(&mut tx, &entry).await?;
		tx.commit().await.map_err(DbError::from)?;

		tracing::info!(environment_id = %environment_id, name = %existing.name, "environment deleted");
		Ok(())
	}

	/// All environments ordered by name. Open to every role.
	pub async fn list(&self) -> Result<Vec<Environment>> {
		Ok(self.environments.list().await?)
	}

	/// One environment by id.
	pub async fn get(&self, environment_id: EnvironmentId) -> Result<Environment> {
		self.environments
			.get_by_id(&environment_id)
			.await?
			.ok_or(ServiceError::EnvironmentNotFound(environment_id))
	}
}

fn normalized_name(raw: &str) -> Result<String> {
	let name = raw.trim();
	if name.is_empty() {
		return Err(ServiceError::InvalidData("Name cannot be blank.".into()));
	}
	if name.chars().count() > 100 {
		return Err(ServiceError::InvalidData(
			"Name must be 100 characters or fewer.".into(),
		));
	}
	Ok(name.to_string())
}

fn normalized_owner_squad(raw: &str) -> Result<String> {
	let squad = raw.trim();
	if squad.is_empty() {
		return Err(ServiceError::InvalidData("Owner Squad is required.".into()));
	}
	if squad.chars().count() > 50 {
		return Err(ServiceError::InvalidData(
			"Owner Squad must be 50 characters or fewer.".into(),
		));
	}
	let allowed = |c: char| c.is_ascii_alphanumeric() || c == ' ' || c == '_' || c == '-';
	if !squad.chars().all(allowed) {
		return Err(ServiceError::InvalidData(
			"Owner Squad contains invalid characters.".into(),
		));
	}
	Ok(squad.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;
	use envbooker_core::{Role, UserId};
	use envbooker_db::testing::{create_test_pool, seed_booking};
	use envbooker_db::AuditQuery;

	fn admin() -> Actor {
		Actor::new(UserId::generate(), Role::Admin)
	}

	fn regular() -> Actor {
		Actor::new(UserId::generate(), Role::Regular)
	}

	fn draft(name: &str) -> NewEnvironment {
		NewEnvironment {
			name: name.to_string(),
			owner_squad: "Platform Team".to_string(),
			created_by_email: "ops@example.com".to_string(),
		}
	}

	async fn setup() -> (EnvironmentService, SqlitePool) {
		let pool = create_test_pool().await;
		(EnvironmentService::new(pool.clone()), pool)
	}

	async fn audit_count(pool: &SqlitePool, action: AuditAction) -> i64 {
		let (_, total) = AuditRepository::new(pool.clone())
			.query(&AuditQuery {
				action: Some(action),
				..AuditQuery::default()
			})
			.await
			.unwrap();
		total
	}

	#[tokio::test]
	async fn admin_creates_environment_with_audit_entry() {
		let (service, pool) = setup().await;
		let actor = admin();

		let environment = service
			.create_environment(&actor, draft("staging-1"))
			.await
			.unwrap();
		assert_eq!(environment.name, "staging-1");
		assert_eq!(environment.owner_squad, "Platform Team");

		let stored = EnvironmentRepository::new(pool.clone())
			.get_by_id(&environment.id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(stored, environment);
		assert_eq!(audit_count(&pool, AuditAction::CreateEnvironment).await, 1);
	}

	#[tokio::test]
	async fn create_by_regular_user_is_forbidden() {
		let (service, pool) = setup().await;

		let err = service
			.create_environment(&regular(), draft("staging-1"))
			.await
			.unwrap_err();
		assert!(matches!(err, ServiceError::Forbidden));
		assert!(service.list().await.unwrap().is_empty());
		assert_eq!(audit_count(&pool, AuditAction::CreateEnvironment).await, 0);
	}

	#[tokio::test]
	async fn name_is_trimmed_and_validated() {
		let (service, _pool) = setup().await;
		let actor = admin();

		let environment = service
			.create_environment(&actor, draft("  staging-9  "))
			.await
			.unwrap();
		assert_eq!(environment.name, "staging-9");

		let err = service
			.create_environment(&actor, draft("   "))
			.await
			.unwrap_err();
		match err {
			ServiceError::InvalidData(message) => assert_eq!(message, "Name cannot be blank."),
			other => panic!("unexpected error: {other:?}"),
		}

		let err = service
			.create_environment(&actor, draft(&"x".repeat(101)))
			.await
			.unwrap_err();
		match err {
			ServiceError::InvalidData(message) => {
				assert_eq!(message, "Name must be 100 characters or fewer.");
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn owner_squad_is_validated() {
		let (service, _pool) = setup().await;
		let actor = admin();

		let too_long = "s".repeat(51);
		let cases = [
			("  ", "Owner Squad is required."),
			(too_long.as_str(), "Owner Squad must be 50 characters or fewer."),
			("platform/infra", "Owner Squad contains invalid characters."),
		];
		for (squad, expected) in cases {
			let err = service
				.create_environment(
					&actor,
					NewEnvironment {
						name: "staging-1".to_string(),
						owner_squad: squad.to_string(),
						created_by_email: "ops@example.com".to_string(),
					},
				)
				.await
				.unwrap_err();
			match err {
				ServiceError::InvalidData(message) => assert_eq!(message, expected),
				other => panic!("unexpected error: {other:?}"),
			}
		}

		// Spaces, underscores and hyphens are all fine.
		service
			.create_environment(
				&actor,
				NewEnvironment {
					name: "staging-1".to_string(),
					owner_squad: "Core_Infra Team-2".to_string(),
					created_by_email: "ops@example.com".to_string(),
				},
			)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn duplicate_name_is_refused_without_audit() {
		let (service, pool) = setup().await;
		let actor = admin();
		service.create_environment(&actor, draft("staging-1")).await.unwrap();

		let err = service
			.create_environment(&actor, draft("staging-1"))
			.await
			.unwrap_err();
		assert!(matches!(err, ServiceError::NameTaken(name) if name == "staging-1"));
		assert_eq!(service.list().await.unwrap().len(), 1);
		assert_eq!(audit_count(&pool, AuditAction::CreateEnvironment).await, 1);
	}

	#[tokio::test]
	async fn update_records_before_and_after() {
		let (service, pool) = setup().await;
		let actor = admin();
		let environment = service
			.create_environment(&actor, draft("staging-1"))
			.await
			.unwrap();

		let updated = service
			.update_environment(&actor, environment.id, "staging-one", "Core Infra")
			.await
			.unwrap();
		assert_eq!(updated.name, "staging-one");
		assert_eq!(updated.owner_squad, "Core Infra");
		assert_eq!(updated.created_by_email, environment.created_by_email);

		let (entries, _) = AuditRepository::new(pool.clone())
			.query(&AuditQuery {
				action: Some(AuditAction::UpdateEnvironment),
				..AuditQuery::default()
			})
			.await
			.unwrap();
		let details = entries[0].details.as_deref().unwrap();
		assert!(details.contains("staging-1"));
		assert!(details.contains("staging-one"));
	}

	#[tokio::test]
	async fn rename_to_own_name_is_allowed_but_not_to_a_taken_one() {
		let (service, _pool) = setup().await;
		let actor = admin();
		let first = service.create_environment(&actor, draft("staging-1")).await.unwrap();
		service.create_environment(&actor, draft("staging-2")).await.unwrap();

		// Keeping its own name while changing the squad is not a collision.
		service
			.update_environment(&actor, first.id, "staging-1", "Core Infra")
			.await
			.unwrap();

		let err = service
			.update_environment(&actor, first.id, "staging-2", "Core Infra")
			.await
			.unwrap_err();
		assert!(matches!(err, ServiceError::NameTaken(name) if name == "staging-2"));
	}

	#[tokio::test]
	async fn delete_refused_while_bookings_exist() {
		let (service, pool) = setup().await;
		let actor = admin();
		let environment = service
			.create_environment(&actor, draft("staging-1"))
			.await
			.unwrap();
		seed_booking(
			&pool,
			&environment.id,
			NaiveDate::from_ymd_opt(2025, 5, 12).unwrap().and_hms_opt(9, 0, 0).unwrap(),
			NaiveDate::from_ymd_opt(2025, 5, 12).unwrap().and_hms_opt(10, 0, 0).unwrap(),
		)
		.await;

		let err = service
			.delete_environment(&actor, environment.id)
			.await
			.unwrap_err();
		assert!(matches!(err, ServiceError::EnvironmentInUse));
		assert!(service.get(environment.id).await.is_ok());
		assert_eq!(audit_count(&pool, AuditAction::DeleteEnvironment).await, 0);
	}

	#[tokio::test]
	async fn delete_of_empty_environment_is_audited() {
		let (service, pool) = setup().await;
		let actor = admin();
		let environment = service
			.create_environment(&actor, draft("staging-1"))
			.await
			.unwrap();

		service.delete_environment(&actor, environment.id).await.unwrap();

		let err = service.get(environment.id).await.unwrap_err();
		assert!(matches!(err, ServiceError::EnvironmentNotFound(_)));
		assert_eq!(audit_count(&pool, AuditAction::DeleteEnvironment).await, 1);

		let entries = AuditRepository::new(pool.clone()).list_recent(1).await.unwrap();
		assert_eq!(
			entries[0].details.as_deref(),
			Some("Deleted environment 'staging-1'")
		);
	}

	#[tokio::test]
	async fn list_is_ordered_by_name_and_get_reports_missing() {
		let (service, _pool) = setup().await;
		let actor = admin();
		service.create_environment(&actor, draft("staging-2")).await.unwrap();
		service.create_environment(&actor, draft("staging-1")).await.unwrap();

		let names: Vec<String> = service
			.list()
			.await
			.unwrap()
			.into_iter()
			.map(|e| e.name)
			.collect();
		assert_eq!(names, vec!["staging-1", "staging-2"]);

		let ghost = EnvironmentId::generate();
		let err = service.get(ghost).await.unwrap_err();
		assert!(matches!(err, ServiceError::EnvironmentNotFound(id) if id == ghost));
	}
}
