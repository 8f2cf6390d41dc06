// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core domain model and scheduling rules for EnvBooker.
//!
//! This crate is pure logic: it knows nothing about storage or transport.
//! The validator, series expansion, and suggestion search all operate on
//! in-memory snapshots ([`BookedSpan`]) handed in by the caller, which keeps
//! every scheduling rule unit-testable without a database.

pub mod audit;
pub mod error;
pub mod ics;
pub mod interval;
pub mod model;
pub mod policy;
pub mod series;
pub mod suggest;
pub mod types;
pub mod validate;
pub mod weekday;

pub use audit::{AuditAction, AuditEntry};
pub use error::BookingError;
pub use ics::{ics_filename, render_booking_ics};
pub use interval::Interval;
pub use model::{BookedSpan, Booking, Environment};
pub use policy::BookingPolicy;
pub use series::SeriesPattern;
pub use suggest::{suggest, suggest_series};
pub use types::{Actor, AuditEntryId, BookingId, EnvironmentId, Role, UserId};
pub use validate::{overlap_exists, validate};
pub use weekday::WeekdaySet;
