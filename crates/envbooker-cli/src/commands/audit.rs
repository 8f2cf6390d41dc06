// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit trail reading (admin).

use clap::Args;
use tracing::instrument;

use envbooker_core::{AuditAction, UserId};
use envbooker_db::AuditQuery;

use crate::commands::booking::parse_datetime;
use crate::context::CliContext;

#[derive(Debug, Clone, Args)]
pub struct AuditArgs {
	/// Only entries with this action, e.g. "create_booking"
	#[arg(long)]
	pub action: Option<String>,

	/// Only entries by this actor id
	#[arg(long)]
	pub actor: Option<UserId>,

	/// Only entries at or after this time, e.g. "2025-05-12T00:00"
	#[arg(long)]
	pub since: Option<String>,

	/// Maximum entries to print
	#[arg(long, default_value = "50")]
	pub limit: i64,

	/// Output as JSON
	#[arg(long)]
	pub json: bool,
}

#[instrument(skip(ctx))]
pub async fn handle_audit(args: AuditArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let action = match &args.action {
		Some(name) => Some(name.parse::<AuditAction>().map_err(anyhow::Error::msg)?),
		None => None,
	};
	let from = match &args.since {
		Some(raw) => Some(parse_datetime(raw)?.and_utc()),
		None => None,
	};
	let query = AuditQuery {
		action,
		actor_id: args.actor,
		from,
		limit: Some(args.limit),
		..AuditQuery::default()
	};

	let (entries, total) = ctx.bookings.list_audit(&ctx.actor, &query).await?;
	if args.json {
		println!("{}", serde_json::to_string_pretty(&entries)?);
		return Ok(());
	}
	if entries.is_empty() {
		println!("No audit entries match.");
		return Ok(());
	}

	for entry in &entries {
		let booking = entry
			.booking_id
			.map(|id| format!(" booking={id}"))
			.unwrap_or_default();
		println!(
			"{}  {:<30} actor={}{}  {}",
			entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
			entry.action,
			entry.actor_id,
			booking,
			entry.details.as_deref().unwrap_or("")
		);
	}
	println!("Showing {} of {} matching entries", entries.len(), total);
	Ok(())
}
