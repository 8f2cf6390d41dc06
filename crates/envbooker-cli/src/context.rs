// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared state handed to every command handler.

use envbooker_bookings::{BookingService, EnvironmentService};
use envbooker_core::Actor;

pub struct CliContext {
	pub bookings: BookingService,
	pub environments: EnvironmentService,
	pub actor: Actor,
	/// Email recorded on environments this actor creates.
	pub actor_email: String,
}
