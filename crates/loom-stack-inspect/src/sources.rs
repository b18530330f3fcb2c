// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML file and environment variables.

use std::path::PathBuf;

use tracing::{debug, info, trace};

use crate::config::{InspectConfig, InspectConfigLayer, Mode};
use crate::error::{ConfigError, Result};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<InspectConfigLayer>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<InspectConfigLayer> {
		debug!("loading defaults");
		Ok(InspectConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/loom/stack-inspect.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<InspectConfigLayer> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(InspectConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: InspectConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// `LOOM_STACK_ENV` selects the mode, falling back to `NODE_ENV`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<InspectConfigLayer> {
		debug!("loading environment variables");
		Ok(InspectConfigLayer {
			mode: env_var("LOOM_STACK_ENV")
				.or_else(|| env_var("NODE_ENV"))
				.map(|v| Mode::from_env_value(&v)),
			show_ignore_listed: env_bool("LOOM_STACK_SHOW_IGNORE_LISTED")?,
			lines_above: env_usize("LOOM_STACK_LINES_ABOVE")?,
			lines_below: env_usize("LOOM_STACK_LINES_BELOW")?,
			flavor: env_var("LOOM_STACK_INSPECT_FLAVOR")
				.map(|v| v.parse())
				.transpose()?,
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Result<Option<bool>> {
	match env_var(name) {
		Some(v) => match v.to_ascii_lowercase().as_str() {
			"true" | "1" | "yes" => Ok(Some(true)),
			"false" | "0" | "no" => Ok(Some(false)),
			_ => Err(ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid boolean value '{v}'"),
			}),
		},
		None => Ok(None),
	}
}

fn env_usize(name: &str) -> Result<Option<usize>> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid integer value '{v}'"),
		}),
		None => Ok(None),
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LOOM_STACK_*`, `NODE_ENV`)
/// 2. Config file (`/etc/loom/stack-inspect.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<InspectConfig> {
	load_config_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<InspectConfig> {
	load_config_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order.
pub fn load_config_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<InspectConfig> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = InspectConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	let config = merged.finalize();
	info!(
		mode = %config.mode,
		show_ignore_listed = config.show_ignore_listed,
		flavor = %config.flavor,
		"stack inspection configuration loaded"
	);
	Ok(config)
}
