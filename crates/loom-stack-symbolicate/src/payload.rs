// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map payloads as stored on disk or returned by a runtime.
//!
//! A payload is either a flat map or an index map made of offset-anchored
//! sections (<https://tc39.es/source-map/#index-map>).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SymbolicateError};

/// Flat source map JSON structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
	pub version: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_root: Option<String>,
	pub sources: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sources_content: Option<Vec<Option<String>>>,
	#[serde(default)]
	pub names: Vec<String>,
	pub mappings: String,
	/// Indices into `sources` hidden from default stack traces.
	#[serde(default, alias = "x_google_ignoreList", skip_serializing_if = "Option::is_none")]
	pub ignore_list: Option<Vec<u32>>,
}

/// Zero-based generated position where a section starts.
///
/// Field order matters: the derived ordering compares by line, then column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectionOffset {
	pub line: u32,
	pub column: u32,
}

impl SectionOffset {
	pub fn new(line: u32, column: u32) -> Self {
		Self { line, column }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSourceMapSection {
	pub offset: SectionOffset,
	pub map: RawSourceMap,
}

/// Index source map JSON structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSourceMap {
	pub version: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	pub sections: Vec<IndexSourceMapSection>,
}

/// A source map payload of either shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceMapPayload {
	Flat(RawSourceMap),
	Index(IndexSourceMap),
}

impl SourceMapPayload {
	/// Parse a payload from JSON bytes.
	///
	/// Index maps must have sorted sections; lookups depend on it.
	pub fn from_slice(data: &[u8]) -> Result<Self> {
		let value: serde_json::Value = serde_json::from_slice(data)?;
		Self::from_value(value)
	}

	/// Parse a payload from an already decoded JSON value.
	pub fn from_value(value: serde_json::Value) -> Result<Self> {
		let payload = if value.get("sections").is_some() {
			Self::Index(serde_json::from_value(value)?)
		} else {
			Self::Flat(serde_json::from_value(value)?)
		};
		payload.validate()?;
		Ok(payload)
	}

	fn validate(&self) -> Result<()> {
		match self {
			Self::Flat(map) => check_version(map.version),
			Self::Index(index) => {
				check_version(index.version)?;
				for (i, pair) in index.sections.windows(2).enumerate() {
					if pair[1].offset < pair[0].offset {
						return Err(SymbolicateError::UnsortedSections(i + 1));
					}
				}
				index
					.sections
					.iter()
					.try_for_each(|section| check_version(section.map.version))
			}
		}
	}
}

fn check_version(version: u32) -> Result<()> {
	if version == 3 {
		Ok(())
	} else {
		Err(SymbolicateError::InvalidSourceMapVersion(version))
	}
}

/// Anything anchored at a section offset.
pub trait HasOffset {
	fn offset(&self) -> SectionOffset;
}

impl HasOffset for SectionOffset {
	fn offset(&self) -> SectionOffset {
		*self
	}
}

/// Index of the last section whose offset is `<=` `position`.
///
/// `sections` must be sorted. Returns `None` when every section starts after
/// the position; there is no fallback to the first section.
pub fn find_applicable_section<S: HasOffset>(sections: &[S], position: SectionOffset) -> Option<usize> {
	sections
		.partition_point(|section| section.offset() <= position)
		.checked_sub(1)
}
