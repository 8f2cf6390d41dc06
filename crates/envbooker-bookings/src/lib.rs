// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Booking and environment workflows for the EnvBooker engine.
//!
//! Ties the pure scheduling rules of `envbooker-core` to the SQLite
//! persistence of `envbooker-db`. The services here own the transaction
//! boundaries: every mutation commits its row change together with its
//! audit entry, or not at all.

pub mod environment;
pub mod error;
pub mod service;

pub use environment::{EnvironmentService, NewEnvironment};
pub use error::{Result, ServiceError};
pub use service::{BookingService, CreateMode};
