// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistent CLI identity.
//!
//! The engine scopes bookings to a user id. Without a login flow the CLI
//! keeps a generated id in the user's config directory and reuses it, so
//! "my bookings" stays stable across invocations. `--user` overrides it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use envbooker_core::UserId;
use tracing::instrument;

pub const IDENTITY_FILENAME: &str = "identity";

/// Default identity directory, `~/.config/envbooker` on Linux.
pub fn default_identity_dir() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("envbooker"))
}

#[instrument(skip(config_dir))]
pub fn get_or_create_user_id(config_dir: &Path) -> anyhow::Result<UserId> {
	let path = config_dir.join(IDENTITY_FILENAME);
	if path.exists() {
		let content = std::fs::read_to_string(&path)
			.with_context(|| format!("failed to read identity file {}", path.display()))?;
		return content
			.trim()
			.parse()
			.with_context(|| format!("corrupt identity file {}", path.display()));
	}

	let user_id = UserId::generate();
	std::fs::create_dir_all(config_dir)
		.with_context(|| format!("failed to create {}", config_dir.display()))?;
	std::fs::write(&path, user_id.to_string())
		.with_context(|| format!("failed to write identity file {}", path.display()))?;
	tracing::info!(user_id = %user_id, path = %path.display(), "created new identity");
	Ok(user_id)
}
