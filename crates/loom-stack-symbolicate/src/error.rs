// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or querying source maps.
#[derive(Debug, Error)]
pub enum SymbolicateError {
	#[error("Invalid source map JSON: {0}")]
	InvalidSourceMapJson(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidSourceMapVersion(u32),

	#[error("Invalid VLQ character: {0}")]
	InvalidVlqChar(char),

	#[error("Truncated VLQ value in segment: {0}")]
	TruncatedVlq(String),

	#[error("VLQ value overflows in segment: {0}")]
	VlqOverflow(String),

	#[error("Negative {field} in mappings on generated line {line}")]
	NegativeMappingValue { field: &'static str, line: u32 },

	#[error("Invalid source index: {0}")]
	InvalidSourceIndex(u32),

	#[error("Index map sections are not sorted at section {0}")]
	UnsortedSections(usize),

	#[error("Unsupported source map URL: {0}")]
	UnsupportedUrl(String),

	#[error("Invalid base64 in inline source map: {0}")]
	InvalidInlineSourceMap(#[from] base64::DecodeError),

	#[error("Failed to read {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

pub type Result<T> = std::result::Result<T, SymbolicateError>;
