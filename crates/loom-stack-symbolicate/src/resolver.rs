// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-call frame resolution against source maps.

use std::collections::HashMap;
use std::sync::Arc;

use loom_stack_core::{ResolvedFrame, StackFrame};
use tracing::{debug, warn};

use crate::codeframe::CodeFrameRenderer;
use crate::consumer::SourceMapConsumer;
use crate::payload::SourceMapPayload;
use crate::store::SourceMapStore;

const WEBPACK_DEFAULT_EXPORT: &str = "__WEBPACK_DEFAULT_EXPORT__";
const WEBPACK_EXPORTS_PREFIX: &str = "__webpack_exports__.";

/// Lookup engine and payload for one compiled file.
#[derive(Debug, Clone)]
pub struct SourceMapCacheEntry {
	pub consumer: Arc<SourceMapConsumer>,
	pub payload: Arc<SourceMapPayload>,
}

/// A frame mapped to original source, with its optional code excerpt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcemappedFrame {
	pub frame: ResolvedFrame,
	pub code: Option<String>,
}

/// Resolution cache scoped to a single formatting call.
///
/// Misses are memoized too, so a file without a map is looked up once.
pub struct SourceMapCache<'a> {
	store: &'a dyn SourceMapStore,
	entries: HashMap<String, Option<SourceMapCacheEntry>>,
}

impl<'a> SourceMapCache<'a> {
	pub fn new(store: &'a dyn SourceMapStore) -> Self {
		Self {
			store,
			entries: HashMap::new(),
		}
	}

	/// Cached entry for a compiled file, loading it on first use.
	pub fn entry(&mut self, file: &str) -> Option<SourceMapCacheEntry> {
		if let Some(entry) = self.entries.get(file) {
			return entry.clone();
		}

		let entry = self.store.find_source_map(file).and_then(|payload| {
			match SourceMapConsumer::new(&payload) {
				Ok(consumer) => Some(SourceMapCacheEntry {
					consumer: Arc::new(consumer),
					payload,
				}),
				Err(e) => {
					warn!(file, error = %e, "Failed to decode source map");
					None
				}
			}
		});

		self.entries.insert(file.to_string(), entry.clone());
		entry
	}

	/// Number of compiled files looked up so far, hits and misses.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Map a raw frame to its original location.
	///
	/// Returns `None` when the frame has no file, the file has no usable
	/// source map, no section of the map covers the position, or the
	/// position has no original source. An excerpt is rendered only when
	/// `code_frames` is given.
	pub fn resolve(
		&mut self,
		frame: &StackFrame,
		code_frames: Option<&dyn CodeFrameRenderer>,
	) -> Option<SourcemappedFrame> {
		let file = frame.file.as_deref()?;
		let entry = self.entry(file)?;

		let line = frame.line_number.unwrap_or(1);
		let column = frame.column.unwrap_or(0);

		// Only index maps whose first section starts past the origin miss here.
		let Some(section) = entry.consumer.applicable_section(line, column) else {
			warn!(file, line, column, "No applicable source map section");
			return None;
		};

		let position = match entry.consumer.original_position_in(section, line, column) {
			Ok(Some(position)) => position,
			Ok(None) => return None,
			Err(e) => {
				debug!(file, line, column, error = %e, "Source map lookup failed");
				return None;
			}
		};
		let source_content = entry.consumer.source_content_for(&position);

		let ignored = entry.consumer.is_ignored(&position);

		let method_name = position
			.name
			.filter(|name| !name.is_empty())
			.or_else(|| frame.method_name.as_deref().map(restore_method_name));

		let resolved = ResolvedFrame::new(
			StackFrame {
				file: Some(position.source),
				line_number: Some(position.line),
				column: Some(position.column),
				method_name,
			},
			ignored,
		);

		let code = code_frames.and_then(|renderer| renderer.render(&resolved, source_content));

		Some(SourcemappedFrame {
			frame: resolved,
			code,
		})
	}
}

/// Undo bundler renaming of default and namespace exports.
///
/// Only the first occurrence of each token is rewritten.
pub fn restore_method_name(method_name: &str) -> String {
	method_name
		.replacen(WEBPACK_DEFAULT_EXPORT, "default", 1)
		.replacen(WEBPACK_EXPORTS_PREFIX, "", 1)
}
