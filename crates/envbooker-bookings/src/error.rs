// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the booking services.

use envbooker_core::{BookingError, BookingId, EnvironmentId};
use envbooker_db::DbError;
use thiserror::Error;

/// Errors surfaced by the booking and environment services.
#[derive(Debug, Error)]
pub enum ServiceError {
	/// The scheduling rules refused the request. The inner reason says
	/// which rule; only a clash is worth retrying at a nearby slot.
	#[error(transparent)]
	Rejected(#[from] BookingError),

	/// Referenced environment does not exist
	#[error("environment not found: {0}")]
	EnvironmentNotFound(EnvironmentId),

	/// Referenced booking does not exist
	#[error("booking not found: {0}")]
	BookingNotFound(BookingId),

	/// The actor lacks permission for this operation
	#[error("operation not permitted")]
	Forbidden,

	/// Environment name or owner squad failed validation
	#[error("invalid environment data: {0}")]
	InvalidData(String),

	/// Environment name collides with an existing one
	#[error("environment name already in use: {0}")]
	NameTaken(String),

	/// Environment still has bookings and cannot be deleted
	#[error("environment has bookings and cannot be deleted")]
	EnvironmentInUse,

	/// Storage failure outside the domain rules
	#[error("storage error: {0}")]
	Unexpected(#[from] DbError),
}

/// Result type for booking service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
