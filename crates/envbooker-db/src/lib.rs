// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite storage for EnvBooker.
//!
//! Repositories expose pool-level reads and connection-level writes. The
//! write functions take `&mut SqliteConnection` so a service can compose a
//! mutation and its audit entry into one transaction; nothing in this crate
//! commits on its own.

pub mod audit;
pub mod booking;
mod datetime;
pub mod environment;
pub mod error;
pub mod pool;
pub mod schema;
pub mod testing;

pub use audit::{AuditQuery, AuditRepository, AuditStore};
pub use booking::{BookingRepository, BookingStore};
pub use environment::{EnvironmentRepository, EnvironmentStore};
pub use error::DbError;
pub use pool::create_pool;
pub use schema::apply_schema;
