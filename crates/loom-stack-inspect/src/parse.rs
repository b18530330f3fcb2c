// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsing of raw `    at ...` stack traces into frames.

use std::sync::LazyLock;

use loom_stack_core::{Result, StackError, StackFrame};
use regex::Regex;
use tracing::trace;

/// `at <method> (<location>)` or `at <location>`.
static FRAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*at (?:(.+?) \((.+)\)|(.+?))\s*$").expect("valid frame regex")
});

/// `<file>[:<line>[:<column>]]`.
static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(.+?)(?::(\d+))?(?::(\d+))?$").expect("valid location regex")
});

/// Innermost `(file:line:column)` of an eval location.
static EVAL_ORIGIN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\(([^()\s]+):(\d+):(\d+)\)").expect("valid eval regex")
});

/// Absolute POSIX path, UNC path, Windows drive path or any URL scheme.
static KEPT_FILE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:/|\\\\|[A-Za-z]:[\\/]|[A-Za-z][A-Za-z0-9+.-]*:)").expect("valid file regex")
});

/// Parse every frame line of a raw stack trace, in order.
///
/// The header line and anything else that is not a frame is skipped.
pub fn parse_stack(raw: &str) -> Vec<StackFrame> {
	raw.lines()
		.filter_map(|line| match parse_frame_line(line) {
			Ok(frame) => Some(frame),
			Err(e) => {
				trace!(error = %e, "skipping stack line");
				None
			}
		})
		.collect()
}

/// Parse a single `    at ...` line.
pub fn parse_frame_line(line: &str) -> Result<StackFrame> {
	let caps = FRAME_LINE
		.captures(line)
		.ok_or_else(|| StackError::NotAFrame(line.to_string()))?;

	let (method_name, location) = match (caps.get(1), caps.get(2), caps.get(3)) {
		(Some(method), Some(location), _) => (Some(method.as_str()), location.as_str()),
		(_, _, Some(location)) => (None, location.as_str()),
		_ => return Err(StackError::NotAFrame(line.to_string())),
	};

	let (file, line_number, column) = if location.starts_with("eval at ") {
		parse_eval_location(location)?
	} else {
		parse_location(location)?
	};

	Ok(StackFrame {
		file: file.filter(|f| KEPT_FILE.is_match(f)),
		line_number,
		column,
		method_name: method_name.map(str::to_string),
	})
}

type Location = (Option<String>, Option<u32>, Option<u32>);

fn parse_location(location: &str) -> Result<Location> {
	let caps = LOCATION
		.captures(location)
		.ok_or_else(|| StackError::NotAFrame(location.to_string()))?;

	Ok((
		caps.get(1).map(|m| m.as_str().to_string()),
		parse_number(caps.get(2).map(|m| m.as_str()), "line")?,
		parse_number(caps.get(3).map(|m| m.as_str()), "column")?,
	))
}

fn parse_eval_location(location: &str) -> Result<Location> {
	let Some(caps) = EVAL_ORIGIN.captures(location) else {
		return Ok((None, None, None));
	};

	Ok((
		Some(caps[1].to_string()),
		parse_number(Some(&caps[2]), "line")?,
		parse_number(Some(&caps[3]), "column")?,
	))
}

fn parse_number(value: Option<&str>, field: &'static str) -> Result<Option<u32>> {
	value
		.map(|v| {
			v.parse().map_err(|_| StackError::InvalidPosition {
				field,
				value: v.to_string(),
			})
		})
		.transpose()
}
