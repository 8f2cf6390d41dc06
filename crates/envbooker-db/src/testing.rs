// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helpers for tests that need a real database.
//!
//! Pools are in-memory SQLite with the full schema applied, so repository
//! and service tests run against the same DDL as production.

use chrono::{NaiveDateTime, Utc};
use envbooker_core::{Booking, BookingId, Environment, EnvironmentId, UserId};
use sqlx::sqlite::SqlitePool;

use crate::booking::BookingRepository;
use crate::environment::EnvironmentRepository;
use crate::schema::apply_schema;

pub async fn create_test_pool() -> SqlitePool {
	let pool = SqlitePool::connect(":memory:").await.unwrap();
	apply_schema(&pool).await.unwrap();
	pool
}

/// An environment value with a fixed shape and the given name.
pub fn sample_environment(name: &str) -> Environment {
	Environment {
		id: EnvironmentId::generate(),
		name: name.to_string(),
		owner_squad: "platform".to_string(),
		created_at: Utc::now(),
		created_by_email: "ops@example.com".to_string(),
	}
}

/// Insert and return an environment with the given name.
pub async fn seed_environment(pool: &SqlitePool, name: &str) -> Environment {
	let environment = sample_environment(name);
	let mut tx = pool.begin().await.unwrap();
	EnvironmentRepository::insert_in_tx(&mut tx, &environment)
		.await
		.unwrap();
	tx.commit().await.unwrap();
	environment
}

/// Insert and return a booking for a fresh random user.
pub async fn seed_booking(
	pool: &SqlitePool,
	environment_id: &EnvironmentId,
	start: NaiveDateTime,
	end: NaiveDateTime,
) -> Booking {
	seed_booking_for(pool, environment_id, UserId::generate(), start, end).await
}

/// Insert and return a booking owned by `user_id`.
pub async fn seed_booking_for(
	pool: &SqlitePool,
	environment_id: &EnvironmentId,
	user_id: UserId,
	start: NaiveDateTime,
	end: NaiveDateTime,
) -> Booking {
	let booking = Booking {
		id: BookingId::generate(),
		environment_id: *environment_id,
		user_id,
		start,
		end,
	};
	let mut tx = pool.begin().await.unwrap();
	BookingRepository::insert_in_tx(&mut tx, &booking).await.unwrap();
	tx.commit().await.unwrap();
	booking
}
