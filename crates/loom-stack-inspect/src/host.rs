// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host runtime error values.
//!
//! A [`HostError`] is what the runtime hands to the inspection hook: a name,
//! a message, the captured call sites, an optional `cause` and any extra
//! enumerable properties. Its stack text is computed on first read by the
//! realm's stack preparation hook (see [`crate::realm`]).

use std::cell::{Cell, OnceCell};
use std::collections::BTreeMap;
use std::fmt;

/// One captured call site, as the runtime's stack capture reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
	pub function_name: Option<String>,
	pub file_name: Option<String>,
	pub line_number: Option<u32>,
	pub column_number: Option<u32>,
	pub is_native: bool,
	pub is_async: bool,
	pub is_constructor: bool,
}

impl CallSite {
	pub fn new(file_name: impl Into<String>, line_number: u32, column_number: u32) -> Self {
		Self {
			file_name: Some(file_name.into()),
			line_number: Some(line_number),
			column_number: Some(column_number),
			..Self::default()
		}
	}

	pub fn with_function(mut self, function_name: impl Into<String>) -> Self {
		self.function_name = Some(function_name.into());
		self
	}

	fn write_location(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_native {
			return f.write_str("native");
		}
		match &self.file_name {
			Some(file) => f.write_str(file)?,
			None => f.write_str("<anonymous>")?,
		}
		if let Some(line) = self.line_number {
			write!(f, ":{line}")?;
			if let Some(column) = self.column_number {
				write!(f, ":{column}")?;
			}
		}
		Ok(())
	}
}

impl fmt::Display for CallSite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_async {
			f.write_str("async ")?;
		}
		let name = match (&self.function_name, self.is_constructor) {
			(Some(name), true) => Some(format!("new {name}")),
			(None, true) => Some("new <anonymous>".to_string()),
			(Some(name), false) => Some(name.clone()),
			(None, false) => None,
		};
		match name {
			Some(name) => {
				write!(f, "{name} (")?;
				self.write_location(f)?;
				f.write_str(")")
			}
			None => self.write_location(f),
		}
	}
}

/// A value stored in an error's `cause` or extra properties.
#[derive(Debug, Clone)]
pub enum ErrorValue {
	Error(Box<HostError>),
	Json(serde_json::Value),
}

impl From<HostError> for ErrorValue {
	fn from(error: HostError) -> Self {
		Self::Error(Box::new(error))
	}
}

impl From<serde_json::Value> for ErrorValue {
	fn from(value: serde_json::Value) -> Self {
		Self::Json(value)
	}
}

impl PartialEq for ErrorValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Json(a), Self::Json(b)) => a == b,
			(Self::Error(a), Self::Error(b)) => {
				a.name == b.name && a.message == b.message && a.cause == b.cause
			}
			_ => false,
		}
	}
}

/// An error object of the host runtime.
#[derive(Debug, Clone, Default)]
pub struct HostError {
	/// Declared name, `None` when the constructor left it unset.
	pub name: Option<String>,
	pub message: String,
	pub call_sites: Vec<CallSite>,
	/// Only present when explicitly given; never an empty placeholder.
	pub cause: Option<ErrorValue>,
	/// Enumerable own properties other than `message`, `stack` and `cause`.
	pub properties: BTreeMap<String, ErrorValue>,
	stack: OnceCell<String>,
	inspect_suppressed: Cell<bool>,
}

/// Keys the host owns on every error.
pub const RESERVED_KEYS: [&str; 3] = ["message", "stack", "cause"];

impl HostError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			..Self::default()
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_call_sites(mut self, call_sites: Vec<CallSite>) -> Self {
		self.call_sites = call_sites;
		self
	}

	pub fn with_cause(mut self, cause: impl Into<ErrorValue>) -> Self {
		self.cause = Some(cause.into());
		self
	}

	/// Add an enumerable property. Reserved keys are left untouched.
	pub fn with_property(mut self, key: impl Into<String>, value: impl Into<ErrorValue>) -> Self {
		self.set_property(key, value);
		self
	}

	pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<ErrorValue>) {
		let key = key.into();
		if !RESERVED_KEYS.contains(&key.as_str()) {
			self.properties.insert(key, value.into());
		}
	}

	/// Whether `key` is an own property of this error.
	pub fn has_own_property(&self, key: &str) -> bool {
		match key {
			"message" => true,
			"stack" => self.stack.get().is_some(),
			"cause" => self.cause.is_some(),
			_ => self.properties.contains_key(key),
		}
	}

	/// Stack text if it has been computed or assigned.
	pub fn stack_if_set(&self) -> Option<&str> {
		self.stack.get().map(String::as_str)
	}

	/// Assign the stack text. Returns `false` if it was already set.
	pub fn set_stack(&self, stack: String) -> bool {
		self.stack.set(stack).is_ok()
	}

	pub(crate) fn stack_or_init(&self, init: impl FnOnce() -> String) -> &str {
		self.stack.get_or_init(init)
	}

	pub(crate) fn is_inspect_suppressed(&self) -> bool {
		self.inspect_suppressed.get()
	}

	/// Disable the custom inspect hook on this error until the guard drops.
	pub(crate) fn suppress_inspect(&self) -> SuppressGuard<'_> {
		let previous = self.inspect_suppressed.replace(true);
		SuppressGuard {
			error: self,
			previous,
		}
	}
}

/// Restores an error's inspect hook on drop, including during unwinding.
pub(crate) struct SuppressGuard<'a> {
	error: &'a HostError,
	previous: bool,
}

impl Drop for SuppressGuard<'_> {
	fn drop(&mut self) {
		self.error.inspect_suppressed.set(self.previous);
	}
}
