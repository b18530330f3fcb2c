// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The runtime's generic text inspector.
//!
//! Errors print as their stack followed by a `{ ... }` block listing extra
//! properties and `[cause]`. Custom inspect hooks installed on the realm
//! take over unless suppressed on the error being printed.

use serde_json::Value;

use crate::host::{ErrorValue, HostError};
use crate::realm::{ErrorRealm, InspectSymbol};

/// Options for [`inspect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectOptions {
	/// Nesting levels to expand before printing `[Object]` / `[Array]`.
	pub depth: usize,
}

impl Default for InspectOptions {
	fn default() -> Self {
		Self { depth: 2 }
	}
}

/// Inspect an error the way `util.inspect` does, honouring Node-style hooks.
pub fn inspect(realm: &ErrorRealm, error: &HostError, options: &InspectOptions) -> String {
	inspect_error(realm, error, InspectSymbol::NodeJs, 0, options)
}

/// Format an error the way the edge runtime's `format` does.
pub fn format(realm: &ErrorRealm, error: &HostError) -> String {
	inspect_error(
		realm,
		error,
		InspectSymbol::EdgeRuntime,
		0,
		&InspectOptions::default(),
	)
}

fn inspect_error(
	realm: &ErrorRealm,
	error: &HostError,
	symbol: InspectSymbol,
	level: usize,
	options: &InspectOptions,
) -> String {
	if !error.is_inspect_suppressed() {
		if let Some(hook) = realm.inspect_hook(symbol) {
			return hook.inspect(realm, error, level, options);
		}
	}
	format_error(realm, error, symbol, level, options)
}

fn format_error(
	realm: &ErrorRealm,
	error: &HostError,
	symbol: InspectSymbol,
	level: usize,
	options: &InspectOptions,
) -> String {
	let stack = realm.stack(error);

	let mut entries: Vec<String> = error
		.properties
		.iter()
		.map(|(key, value)| {
			format!(
				"{}: {}",
				format_key(key),
				format_value(realm, value, symbol, level + 1, options)
			)
		})
		.collect();
	if let Some(cause) = &error.cause {
		entries.push(format!(
			"[cause]: {}",
			format_value(realm, cause, symbol, level + 1, options)
		));
	}

	if entries.is_empty() {
		return stack.to_string();
	}

	let body = entries
		.iter()
		.map(|entry| indent(entry))
		.collect::<Vec<_>>()
		.join(",\n");
	format!("{stack} {{\n{body}\n}}")
}

fn format_value(
	realm: &ErrorRealm,
	value: &ErrorValue,
	symbol: InspectSymbol,
	level: usize,
	options: &InspectOptions,
) -> String {
	match value {
		ErrorValue::Error(error) if level > options.depth => {
			let name = error.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Error");
			format!("[{name}: {}]", error.message)
		}
		ErrorValue::Error(error) => inspect_error(realm, error, symbol, level, options),
		ErrorValue::Json(json) => format_json(json, level, options.depth),
	}
}

fn format_json(value: &Value, level: usize, depth: usize) -> String {
	match value {
		Value::Null => "null".to_string(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => n.to_string(),
		Value::String(s) => quote(s),
		Value::Array(items) if items.is_empty() => "[]".to_string(),
		Value::Array(_) if level > depth => "[Array]".to_string(),
		Value::Array(items) => {
			let items: Vec<String> = items
				.iter()
				.map(|item| format_json(item, level + 1, depth))
				.collect();
			format!("[ {} ]", items.join(", "))
		}
		Value::Object(map) if map.is_empty() => "{}".to_string(),
		Value::Object(_) if level > depth => "[Object]".to_string(),
		Value::Object(map) => {
			let entries: Vec<String> = map
				.iter()
				.map(|(key, value)| {
					format!("{}: {}", format_key(key), format_json(value, level + 1, depth))
				})
				.collect();
			format!("{{ {} }}", entries.join(", "))
		}
	}
}

fn format_key(key: &str) -> String {
	let mut chars = key.chars();
	let is_identifier = chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
	if is_identifier {
		key.to_string()
	} else {
		quote(key)
	}
}

fn quote(s: &str) -> String {
	format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n"))
}

fn indent(text: &str) -> String {
	text.lines()
		.map(|line| format!("  {line}"))
		.collect::<Vec<_>>()
		.join("\n")
}
