// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command handlers, one module per area.

pub mod audit;
pub mod booking;
pub mod environment;

use envbooker_core::{Environment, EnvironmentId};

use crate::context::CliContext;

/// Look an environment up by id or by exact name.
pub async fn resolve_environment(
	ctx: &CliContext,
	reference: &str,
) -> anyhow::Result<Environment> {
	if let Ok(id) = reference.parse::<EnvironmentId>() {
		if let Ok(environment) = ctx.environments.get(id).await {
			return Ok(environment);
		}
	}
	ctx.environments
		.list()
		.await?
		.into_iter()
		.find(|environment| environment.name == reference)
		.ok_or_else(|| {
			anyhow::anyhow!("no environment matching '{reference}' (try 'envbooker env list')")
		})
}
