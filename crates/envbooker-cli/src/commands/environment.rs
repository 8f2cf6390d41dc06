// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment management commands.

use clap::Subcommand;
use tracing::instrument;

use envbooker_bookings::NewEnvironment;

use crate::commands::resolve_environment;
use crate::context::CliContext;

#[derive(Debug, Subcommand)]
pub enum EnvCommand {
	/// Create an environment (admin)
	Create {
		/// Environment name
		#[arg(long)]
		name: String,
		/// Owning squad
		#[arg(long)]
		squad: String,
	},
	/// Rename an environment or change its squad (admin)
	Update {
		/// Environment name or id
		environment: String,
		/// New name
		#[arg(long)]
		name: String,
		/// New owning squad
		#[arg(long)]
		squad: String,
	},
	/// Delete an environment with no bookings (admin)
	Delete {
		/// Environment name or id
		environment: String,
	},
	/// List environments
	List {
		/// Output as JSON
		#[arg(long)]
		json: bool,
	},
	/// Show every booking on an environment
	Schedule {
		/// Environment name or id
		environment: String,
	},
}

#[instrument(skip(ctx))]
pub async fn handle_env(command: EnvCommand, ctx: &CliContext) -> anyhow::Result<()> {
	match command {
		EnvCommand::Create { name, squad } => {
			let environment = ctx
				.environments
				.create_environment(
					&ctx.actor,
					NewEnvironment {
						name,
						owner_squad: squad,
						created_by_email: ctx.actor_email.clone(),
					},
				)
				.await?;
			println!("Created environment {} ({})", environment.name, environment.id);
		}
		EnvCommand::Update {
			environment,
			name,
			squad,
		} => {
			let existing = resolve_environment(ctx, &environment).await?;
			let updated = ctx
				.environments
				.update_environment(&ctx.actor, existing.id, &name, &squad)
				.await?;
			println!("Updated environment {} ({})", updated.name, updated.id);
		}
		EnvCommand::Delete { environment } => {
			let existing = resolve_environment(ctx, &environment).await?;
			ctx.environments
				.delete_environment(&ctx.actor, existing.id)
				.await?;
			println!("Deleted environment {}", existing.name);
		}
		EnvCommand::List { json } => {
			let environments = ctx.environments.list().await?;
			if json {
				println!("{}", serde_json::to_string_pretty(&environments)?);
				return Ok(());
			}
			if environments.is_empty() {
				println!("No environments. Create one with 'envbooker env create'.");
				return Ok(());
			}
			for environment in &environments {
				println!(
					"{}  {}  squad={}",
					environment.id, environment.name, environment.owner_squad
				);
			}
		}
		EnvCommand::Schedule { environment } => {
			let existing = resolve_environment(ctx, &environment).await?;
			let schedule = ctx.bookings.environment_schedule(existing.id).await?;
			if schedule.is_empty() {
				println!("{} has no bookings.", existing.name);
				return Ok(());
			}
			println!("Schedule for {}:", existing.name);
			for booking in &schedule {
				println!(
					"  {} to {}  user={}",
					booking.start, booking.end, booking.user_id
				);
			}
		}
	}
	Ok(())
}
