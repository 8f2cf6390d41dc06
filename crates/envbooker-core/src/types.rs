// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity and capability types shared across the booking engine.
//!
//! - **ID newtypes**: type-safe wrappers around UUIDs ([`EnvironmentId`],
//!   [`BookingId`], [`UserId`], [`AuditEntryId`]) preventing accidental mixing
//! - **[`Role`]**: the two permission levels the engine distinguishes
//! - **[`Actor`]**: the identity an operation runs as, carried explicitly as a
//!   parameter rather than read from ambient request state
//!
//! All ID types serialize transparently as UUID strings and parse back via
//! [`std::str::FromStr`], which is how the storage layer round-trips them
//! through TEXT columns.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create an ID from an existing UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl std::str::FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(Uuid::parse_str(s)?))
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(EnvironmentId, "Unique identifier for a bookable environment.");
define_id_type!(BookingId, "Unique identifier for a booking.");
define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(AuditEntryId, "Unique identifier for an audit log entry.");

// =============================================================================
// Roles and Actors
// =============================================================================

/// Permission level of a user.
///
/// The engine recognizes exactly two levels. Administrators can manage
/// environments, read the audit log, act on any booking, and force bookings
/// past the scheduling rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	Admin,
	Regular,
}

impl Role {
	pub fn is_admin(&self) -> bool {
		matches!(self, Role::Admin)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Admin => write!(f, "admin"),
			Role::Regular => write!(f, "regular"),
		}
	}
}

impl std::str::FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(Role::Admin),
			"regular" => Ok(Role::Regular),
			_ => Err(format!("invalid role: {}", s)),
		}
	}
}

/// The identity an operation runs as.
///
/// Every mutating entry point takes an `Actor` so that permission decisions
/// are explicit in the call, not recovered from ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
	pub id: UserId,
	pub role: Role,
}

impl Actor {
	pub fn new(id: UserId, role: Role) -> Self {
		Self { id, role }
	}

	pub fn is_admin(&self) -> bool {
		self.role.is_admin()
	}

	/// Whether this actor may edit or delete a booking owned by `owner`.
	pub fn can_modify_booking_of(&self, owner: UserId) -> bool {
		self.is_admin() || self.id == owner
	}
}
