// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack frame types.

use serde::{Deserialize, Serialize};

/// A single call site from a stack trace.
///
/// Before source mapping the coordinates refer to the compiled file; after a
/// successful lookup they refer to the original source. Lines and columns are
/// kept exactly as the runtime reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
	/// Absolute path, URL, or `None` for native/anonymous frames.
	pub file: Option<String>,
	pub line_number: Option<u32>,
	pub column: Option<u32>,
	pub method_name: Option<String>,
}

impl StackFrame {
	/// Create a frame pointing at a file position.
	pub fn new(file: impl Into<String>, line_number: u32, column: u32) -> Self {
		Self {
			file: Some(file.into()),
			line_number: Some(line_number),
			column: Some(column),
			method_name: None,
		}
	}

	/// Set the method name.
	pub fn with_method(mut self, method_name: impl Into<String>) -> Self {
		self.method_name = Some(method_name.into());
		self
	}

	/// Whether this frame has a file to look up a source map for.
	pub fn has_file(&self) -> bool {
		self.file.is_some()
	}
}

/// A frame after source map resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFrame {
	#[serde(flatten)]
	pub frame: StackFrame,
	/// The original source is listed in the source map's `ignoreList`.
	pub ignored: bool,
}

impl ResolvedFrame {
	pub fn new(frame: StackFrame, ignored: bool) -> Self {
		Self { frame, ignored }
	}
}
