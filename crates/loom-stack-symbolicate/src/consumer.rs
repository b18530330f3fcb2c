// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Position lookup over flat and index source maps.

use crate::error::Result;
use crate::payload::{find_applicable_section, HasOffset, SectionOffset, SourceMapPayload};
use crate::sourcemap::{OriginalPosition, ParsedSourceMap};

/// One decoded section of an index map.
#[derive(Debug, Clone)]
pub struct ConsumerSection {
	offset: SectionOffset,
	map: ParsedSourceMap,
}

impl HasOffset for ConsumerSection {
	fn offset(&self) -> SectionOffset {
		self.offset
	}
}

/// Lookup engine built once per payload.
#[derive(Debug, Clone)]
pub enum SourceMapConsumer {
	Flat(ParsedSourceMap),
	Index(Vec<ConsumerSection>),
}

impl SourceMapConsumer {
	/// Decode every map in the payload.
	pub fn new(payload: &SourceMapPayload) -> Result<Self> {
		match payload {
			SourceMapPayload::Flat(raw) => Ok(Self::Flat(ParsedSourceMap::from_raw(raw)?)),
			SourceMapPayload::Index(index) => index
				.sections
				.iter()
				.map(|section| {
					Ok(ConsumerSection {
						offset: section.offset,
						map: ParsedSourceMap::from_raw(&section.map)?,
					})
				})
				.collect::<Result<Vec<_>>>()
				.map(Self::Index),
		}
	}

	/// Section covering a generated position: the last one whose offset is
	/// `<=` the position. A flat map is a single section at the origin.
	///
	/// `line` is 1-indexed and `column` 0-indexed, as in
	/// [`ParsedSourceMap::lookup`]. `None` means the position precedes every
	/// section of an index map.
	pub fn applicable_section(&self, line: u32, column: u32) -> Option<usize> {
		match self {
			Self::Flat(_) => Some(0),
			Self::Index(sections) => find_applicable_section(
				sections,
				SectionOffset::new(line.saturating_sub(1), column),
			),
		}
	}

	/// Original position for a generated position within `section`.
	///
	/// For index maps the section offset is subtracted first; the column
	/// offset only applies on the section's first line.
	pub fn original_position_in(
		&self,
		section: usize,
		line: u32,
		column: u32,
	) -> Result<Option<OriginalPosition>> {
		match self {
			Self::Flat(map) => map.lookup(line, column),
			Self::Index(sections) => {
				let Some(current) = sections.get(section) else {
					return Ok(None);
				};

				let relative_line0 = line.saturating_sub(1).saturating_sub(current.offset.line);
				let relative_column = if relative_line0 == 0 {
					column.saturating_sub(current.offset.column)
				} else {
					column
				};

				Ok(current
					.map
					.lookup(relative_line0 + 1, relative_column)?
					.map(|position| OriginalPosition {
						section,
						..position
					}))
			}
		}
	}

	/// Whether a position returned by this consumer is ignore-listed by the
	/// map it came from.
	pub fn is_ignored(&self, position: &OriginalPosition) -> bool {
		self.map_at(position.section)
			.is_some_and(|map| map.is_ignored(position.source_index))
	}

	/// Embedded source content for a position returned by this consumer.
	pub fn source_content_for(&self, position: &OriginalPosition) -> Option<&str> {
		self.map_at(position.section)?
			.source_content(position.source_index)
	}

	fn map_at(&self, section: usize) -> Option<&ParsedSourceMap> {
		match self {
			Self::Flat(map) => Some(map),
			Self::Index(sections) => sections.get(section).map(|s| &s.map),
		}
	}
}
