// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for stack frame handling.

use thiserror::Error;

/// Errors that can occur while reading a single stack frame.
///
/// None of these are fatal to formatting an error: callers skip the
/// offending line and carry on with the rest of the trace.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackError {
	#[error("not a stack frame line: {0}")]
	NotAFrame(String),

	#[error("invalid {field} in stack frame: {value}")]
	InvalidPosition { field: &'static str, value: String },
}

/// Result type for stack frame operations.
pub type Result<T> = std::result::Result<T, StackError>;
