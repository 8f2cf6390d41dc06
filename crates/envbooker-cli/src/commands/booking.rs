// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Booking commands: create, series, edit, cancel, list and export.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use clap::Args;
use tracing::instrument;

use envbooker_bookings::{CreateMode, ServiceError};
use envbooker_core::{
	ics_filename, BookingError, BookingId, EnvironmentId, Interval, SeriesPattern, WeekdaySet,
};

use crate::commands::resolve_environment;
use crate::context::CliContext;

#[derive(Debug, Clone, Args)]
pub struct BookArgs {
	/// Environment name or id
	pub environment: String,

	/// Slot start, e.g. "2025-05-12T09:00"
	#[arg(long)]
	pub from: String,

	/// Slot end, e.g. "2025-05-12T17:00"
	#[arg(long)]
	pub to: String,

	/// Book the nearest free slot if the requested one clashes
	#[arg(long)]
	pub accept: bool,

	/// Bypass the scheduling rules (admins only)
	#[arg(long)]
	pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct BookSeriesArgs {
	/// Environment name or id
	pub environment: String,

	/// First date of the series (inclusive), e.g. "2025-05-12"
	#[arg(long)]
	pub from_date: String,

	/// Last date of the series (inclusive)
	#[arg(long)]
	pub to_date: String,

	/// Weekdays to book, e.g. "mon,wed,fri"
	#[arg(long)]
	pub days: String,

	/// Daily start time, e.g. "09:00"
	#[arg(long)]
	pub start: String,

	/// Daily end time, e.g. "11:00"
	#[arg(long)]
	pub end: String,

	/// Book at the suggested shifted times if the requested ones clash
	#[arg(long)]
	pub accept: bool,

	/// Bypass the scheduling rules (admins only)
	#[arg(long)]
	pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
	/// Booking id to move
	pub booking_id: BookingId,

	/// Move to a different environment (name or id)
	#[arg(long)]
	pub environment: Option<String>,

	/// New slot start
	#[arg(long)]
	pub from: String,

	/// New slot end
	#[arg(long)]
	pub to: String,

	/// Bypass the scheduling rules (admins only)
	#[arg(long)]
	pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
	/// Booking id to export
	pub booking_id: BookingId,

	/// Output path (defaults to booking-<id>.ics)
	#[arg(long, short)]
	pub out: Option<PathBuf>,
}

#[instrument(skip(ctx))]
pub async fn handle_book(args: BookArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let environment = resolve_environment(ctx, &args.environment).await?;
	let interval = parse_interval(&args.from, &args.to)?;
	let mode = if args.force {
		CreateMode::Force
	} else {
		CreateMode::Standard
	};

	match ctx
		.bookings
		.create_single(&ctx.actor, environment.id, interval, mode)
		.await
	{
		Ok(booking) => {
			println!(
				"Booked {} from {} to {} (booking {})",
				environment.name, booking.start, booking.end, booking.id
			);
			Ok(())
		}
		Err(ServiceError::Rejected(reason @ BookingError::Clash { .. })) => {
			let suggestion = ctx.bookings.find_suggestion(environment.id, interval).await?;
			match suggestion {
				Some(alternative) if args.accept => {
					let booking = ctx
						.bookings
						.create_single(
							&ctx.actor,
							environment.id,
							alternative,
							CreateMode::AcceptSuggestion,
						)
						.await?;
					println!(
						"Requested slot clashes; booked nearest free slot {} to {} instead (booking {})",
						booking.start, booking.end, booking.id
					);
					Ok(())
				}
				Some(alternative) => {
					println!(
						"Nearest free slot: {} to {}",
						alternative.start, alternative.end
					);
					println!("Re-run with --accept to book it.");
					Err(reason.into())
				}
				None => Err(anyhow::anyhow!(
					"{reason}, and no free slot within {} minutes either side",
					ctx.bookings.policy().suggestion_window.num_minutes()
				)),
			}
		}
		Err(err) => Err(err.into()),
	}
}

#[instrument(skip(ctx))]
pub async fn handle_book_series(args: BookSeriesArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let environment = resolve_environment(ctx, &args.environment).await?;
	let pattern = SeriesPattern::new(
		parse_date(&args.from_date)?,
		parse_date(&args.to_date)?,
		parse_weekdays(&args.days)?,
		parse_time(&args.start)?,
		parse_time(&args.end)?,
	);

	match ctx
		.bookings
		.create_series(&ctx.actor, environment.id, &pattern, args.force)
		.await
	{
		Ok(bookings) => {
			println!("Booked {} slot(s) on {}:", bookings.len(), environment.name);
			for booking in &bookings {
				println!("  {} to {}", booking.start, booking.end);
			}
			Ok(())
		}
		Err(ServiceError::Rejected(reason @ BookingError::Clash { .. })) => {
			let suggestion = ctx
				.bookings
				.find_series_suggestion(environment.id, &pattern)
				.await?;
			match suggestion {
				Some((start_time, end_time)) if args.accept => {
					let shifted = SeriesPattern {
						start_time,
						end_time,
						..pattern
					};
					let bookings = ctx
						.bookings
						.create_series(&ctx.actor, environment.id, &shifted, false)
						.await?;
					println!(
						"Requested times clash; booked {} slot(s) at {} to {} instead",
						bookings.len(),
						start_time.format("%H:%M"),
						end_time.format("%H:%M")
					);
					Ok(())
				}
				Some((start_time, end_time)) => {
					println!(
						"All selected days are free at {} to {}.",
						start_time.format("%H:%M"),
						end_time.format("%H:%M")
					);
					println!("Re-run with --accept to book those times.");
					Err(reason.into())
				}
				None => Err(anyhow::anyhow!(
					"{reason}, and no shift within {} minutes frees every day",
					ctx.bookings.policy().suggestion_window.num_minutes()
				)),
			}
		}
		Err(err) => Err(err.into()),
	}
}

#[instrument(skip(ctx))]
pub async fn handle_edit(args: EditArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let existing = ctx.bookings.get_booking(&ctx.actor, args.booking_id).await?;
	let environment = match &args.environment {
		Some(reference) => resolve_environment(ctx, reference).await?,
		None => ctx.environments.get(existing.environment_id).await?,
	};
	let interval = parse_interval(&args.from, &args.to)?;

	let updated = ctx
		.bookings
		.update_booking(&ctx.actor, args.booking_id, environment.id, interval, args.force)
		.await?;
	println!(
		"Moved booking {} to {} from {} to {}",
		updated.id, environment.name, updated.start, updated.end
	);
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_cancel(booking_id: BookingId, ctx: &CliContext) -> anyhow::Result<()> {
	ctx.bookings.delete_booking(&ctx.actor, booking_id).await?;
	println!("Cancelled booking {booking_id}");
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_list(json: bool, ctx: &CliContext) -> anyhow::Result<()> {
	let bookings = ctx.bookings.list_bookings(&ctx.actor).await?;
	if json {
		println!("{}", serde_json::to_string_pretty(&bookings)?);
		return Ok(());
	}
	if bookings.is_empty() {
		println!("No bookings.");
		return Ok(());
	}

	let names: HashMap<EnvironmentId, String> = ctx
		.environments
		.list()
		.await?
		.into_iter()
		.map(|environment| (environment.id, environment.name))
		.collect();
	for booking in &bookings {
		let name = names
			.get(&booking.environment_id)
			.map(String::as_str)
			.unwrap_or("(unknown environment)");
		println!(
			"{}  {}  {} to {}",
			booking.id, name, booking.start, booking.end
		);
	}
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_export(args: ExportArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let document = ctx.bookings.calendar_export(&ctx.actor, args.booking_id).await?;
	let path = args
		.out
		.unwrap_or_else(|| PathBuf::from(ics_filename(args.booking_id)));
	std::fs::write(&path, document)
		.with_context(|| format!("failed to write {}", path.display()))?;
	println!("Wrote {}", path.display());
	Ok(())
}

// ===== Input parsing =====

const DATETIME_FORMATS: &[&str] = &[
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%dT%H:%M",
	"%Y-%m-%d %H:%M:%S",
	"%Y-%m-%d %H:%M",
];

pub fn parse_datetime(s: &str) -> anyhow::Result<NaiveDateTime> {
	for format in DATETIME_FORMATS {
		if let Ok(parsed) = NaiveDateTime::parse_from_str(s, format) {
			return Ok(parsed);
		}
	}
	anyhow::bail!("unrecognized date-time '{s}', expected e.g. 2025-05-12T09:00")
}

fn parse_interval(from: &str, to: &str) -> anyhow::Result<Interval> {
	Ok(Interval::new(parse_datetime(from)?, parse_datetime(to)?))
}

pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
	s.parse()
		.map_err(|_| anyhow::anyhow!("unrecognized date '{s}', expected e.g. 2025-05-12"))
}

pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
	for format in ["%H:%M:%S", "%H:%M"] {
		if let Ok(parsed) = NaiveTime::parse_from_str(s, format) {
			return Ok(parsed);
		}
	}
	anyhow::bail!("unrecognized time '{s}', expected e.g. 09:00")
}

pub fn parse_weekdays(s: &str) -> anyhow::Result<WeekdaySet> {
	let mut days = WeekdaySet::empty();
	for part in s.split(',') {
		let part = part.trim();
		if part.is_empty() {
			continue;
		}
		let day: Weekday = part
			.parse()
			.map_err(|_| anyhow::anyhow!("unknown weekday '{part}'"))?;
		days.insert(day);
	}
	if days.is_empty() {
		anyhow::bail!("no weekdays given, expected e.g. mon,wed,fri");
	}
	Ok(days)
}
