// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inspection configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Build mode. Code excerpts are only rendered in development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	#[default]
	Development,
	Production,
}

impl Mode {
	/// Interpret a `NODE_ENV`-style value. Anything but `production` is development.
	pub fn from_env_value(value: &str) -> Self {
		if value.trim().eq_ignore_ascii_case("production") {
			Self::Production
		} else {
			Self::Development
		}
	}

	pub fn is_development(self) -> bool {
		self == Self::Development
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Development => write!(f, "development"),
			Self::Production => write!(f, "production"),
		}
	}
}

/// Which host inspection protocol the hook is installed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InspectFlavor {
	#[default]
	Node,
	EdgeLite,
}

impl FromStr for InspectFlavor {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"node" | "nodejs" => Ok(Self::Node),
			"edge" | "edge-lite" => Ok(Self::EdgeLite),
			other => Err(ConfigError::InvalidValue {
				key: "inspect_flavor".to_string(),
				message: format!("unknown inspect flavor '{other}'"),
			}),
		}
	}
}

impl fmt::Display for InspectFlavor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Node => write!(f, "node"),
			Self::EdgeLite => write!(f, "edge-lite"),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InspectConfigLayer {
	pub mode: Option<Mode>,
	pub show_ignore_listed: Option<bool>,
	pub lines_above: Option<usize>,
	pub lines_below: Option<usize>,
	pub flavor: Option<InspectFlavor>,
}

impl InspectConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.mode.is_some() {
			self.mode = other.mode;
		}
		if other.show_ignore_listed.is_some() {
			self.show_ignore_listed = other.show_ignore_listed;
		}
		if other.lines_above.is_some() {
			self.lines_above = other.lines_above;
		}
		if other.lines_below.is_some() {
			self.lines_below = other.lines_below;
		}
		if other.flavor.is_some() {
			self.flavor = other.flavor;
		}
	}

	pub fn finalize(self) -> InspectConfig {
		let defaults = InspectConfig::default();
		InspectConfig {
			mode: self.mode.unwrap_or(defaults.mode),
			show_ignore_listed: self.show_ignore_listed.unwrap_or(defaults.show_ignore_listed),
			lines_above: self.lines_above.unwrap_or(defaults.lines_above),
			lines_below: self.lines_below.unwrap_or(defaults.lines_below),
			flavor: self.flavor.unwrap_or(defaults.flavor),
		}
	}
}

/// Fully resolved inspection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectConfig {
	pub mode: Mode,
	/// Keep ignore-listed and framework-internal frames, rendered dimmed.
	pub show_ignore_listed: bool,
	/// Code excerpt context.
	pub lines_above: usize,
	pub lines_below: usize,
	pub flavor: InspectFlavor,
}

impl Default for InspectConfig {
	fn default() -> Self {
		Self {
			mode: Mode::Development,
			show_ignore_listed: false,
			lines_above: 2,
			lines_below: 3,
			flavor: InspectFlavor::Node,
		}
	}
}
