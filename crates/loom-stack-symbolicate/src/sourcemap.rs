// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decoded flat source map and position lookup.

use std::collections::HashSet;

use crate::error::{Result, SymbolicateError};
use crate::payload::RawSourceMap;
use crate::vlq::{decode_vlq_mappings, DecodedMappings};

/// Flat source map ready for lookups.
#[derive(Debug, Clone)]
pub struct ParsedSourceMap {
	/// Generated file name.
	pub file: Option<String>,
	/// Root path prepended to source filenames.
	pub source_root: Option<String>,
	/// Original source paths, as listed in the map.
	pub sources: Vec<String>,
	/// Embedded source content for each source file.
	pub sources_content: Vec<Option<String>>,
	/// Original identifiers (function/variable names).
	pub names: Vec<String>,
	ignore_list: HashSet<u32>,
	mappings: DecodedMappings,
}

/// Original position information from a source map lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition {
	/// Original source path with `sourceRoot` applied.
	pub source: String,
	/// Index of the source within its map's `sources`.
	pub source_index: u32,
	/// Index of the section the position came from (0 for flat maps).
	pub section: usize,
	/// Line in the original source (1-indexed for display).
	pub line: u32,
	/// Column in the original source (0-indexed).
	pub column: u32,
	/// Original identifier name if available.
	pub name: Option<String>,
}

impl ParsedSourceMap {
	/// Decode the mappings of a raw map.
	pub fn from_raw(raw: &RawSourceMap) -> Result<Self> {
		let mappings = decode_vlq_mappings(&raw.mappings)?;

		Ok(Self {
			file: raw.file.clone(),
			source_root: raw.source_root.clone(),
			sources: raw.sources.clone(),
			sources_content: raw.sources_content.clone().unwrap_or_default(),
			names: raw.names.clone(),
			ignore_list: raw.ignore_list.iter().flatten().copied().collect(),
			mappings,
		})
	}

	/// Lookup the original position for a generated line and column.
	///
	/// Lines are 1-indexed (as displayed in stack traces), columns are 0-indexed.
	/// Returns None if no mapping covers this position or the covering segment
	/// has no original location.
	pub fn lookup(&self, line: u32, column: u32) -> Result<Option<OriginalPosition>> {
		let Some(original) = self
			.mappings
			.find(line.saturating_sub(1), column)
			.and_then(|m| m.original)
		else {
			return Ok(None);
		};

		let source = self
			.sources
			.get(original.source_index as usize)
			.ok_or(SymbolicateError::InvalidSourceIndex(original.source_index))?;

		let name = original
			.name_index
			.and_then(|idx| self.names.get(idx as usize).cloned());

		Ok(Some(OriginalPosition {
			source: self.resolve_source_path(source),
			source_index: original.source_index,
			section: 0,
			line: original.line + 1,
			column: original.column,
			name,
		}))
	}

	/// Embedded content of a source, if the map carries `sourcesContent`.
	pub fn source_content(&self, source_index: u32) -> Option<&str> {
		self.sources_content
			.get(source_index as usize)
			.and_then(|c| c.as_deref())
	}

	/// Whether the source at `source_index` is ignore-listed.
	pub fn is_ignored(&self, source_index: u32) -> bool {
		self.ignore_list.contains(&source_index)
	}

	fn resolve_source_path(&self, source: &str) -> String {
		match &self.source_root {
			Some(root) if !root.is_empty() => {
				format!("{}/{}", root.trim_end_matches('/'), source)
			}
			_ => source.to_string(),
		}
	}
}
