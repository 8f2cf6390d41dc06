// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! EnvBooker CLI - book shared test environments from the command line.
//!
//! Configuration comes from `/etc/envbooker/config.toml` (or `--config`)
//! with `ENVBOOKER_*` environment variables layered on top. Identity is a
//! persistent generated user id unless `--user` is given; `--role admin`
//! unlocks environment management, forced bookings and the audit trail.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use envbooker_bookings::{BookingService, EnvironmentService};
use envbooker_config::{load_config, load_config_with_file, Config};
use envbooker_core::{Actor, BookingId, Role, UserId};
use envbooker_db::{apply_schema, create_pool};

mod commands;
mod context;
mod identity;

use commands::{audit, booking, environment};
use context::CliContext;

/// EnvBooker - shared environment booking
#[derive(Parser, Debug)]
#[command(name = "envbooker", version, about, long_about = None)]
struct Args {
	/// Path to a custom configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Act as this user id (defaults to a persistent generated identity)
	#[arg(long, env = "ENVBOOKER_USER")]
	user: Option<UserId>,

	/// Role to act as: admin or regular
	#[arg(long, env = "ENVBOOKER_ROLE", default_value = "regular")]
	role: Role,

	/// Email recorded when creating environments
	#[arg(long, env = "ENVBOOKER_EMAIL")]
	email: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create the database file and schema
	Init,
	/// Manage environments
	Env {
		#[command(subcommand)]
		command: environment::EnvCommand,
	},
	/// Book an environment for a single interval
	Book(booking::BookArgs),
	/// Book a recurring weekly series
	BookSeries(booking::BookSeriesArgs),
	/// Move an existing booking to a new slot
	Edit(booking::EditArgs),
	/// Cancel a booking
	Cancel {
		/// Booking id to cancel
		booking_id: BookingId,
	},
	/// List bookings visible to you
	List {
		/// Output as JSON
		#[arg(long)]
		json: bool,
	},
	/// Write a booking as an iCalendar file
	ExportIcs(booking::ExportArgs),
	/// Read the audit trail (admin)
	Audit(audit::AuditArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => load_config_with_file(path),
		None => load_config(),
	}?;

	init_tracing(&config);

	let user_id = match args.user {
		Some(id) => id,
		None => {
			let dir = identity::default_identity_dir()
				.context("could not determine a config directory; pass --user instead")?;
			identity::get_or_create_user_id(&dir)?
		}
	};
	let actor = Actor::new(user_id, args.role);
	let actor_email = args
		.email
		.unwrap_or_else(|| format!("{}@envbooker.local", actor.id));

	let pool = create_pool(&config.database.url).await?;
	apply_schema(&pool).await?;

	let ctx = CliContext {
		bookings: BookingService::new(pool.clone(), config.booking.policy()),
		environments: EnvironmentService::new(pool),
		actor,
		actor_email,
	};

	match args.command {
		Command::Init => {
			println!("Database ready at {}", config.database.url);
			Ok(())
		}
		Command::Env { command } => environment::handle_env(command, &ctx).await,
		Command::Book(book_args) => booking::handle_book(book_args, &ctx).await,
		Command::BookSeries(series_args) => booking::handle_book_series(series_args, &ctx).await,
		Command::Edit(edit_args) => booking::handle_edit(edit_args, &ctx).await,
		Command::Cancel { booking_id } => booking::handle_cancel(booking_id, &ctx).await,
		Command::List { json } => booking::handle_list(json, &ctx).await,
		Command::ExportIcs(export_args) => booking::handle_export(export_args, &ctx).await,
		Command::Audit(audit_args) => audit::handle_audit(audit_args, &ctx).await,
	}
}

fn init_tracing(config: &Config) {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
		)
		.init();
}
