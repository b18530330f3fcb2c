// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ decoding for the `mappings` field of a source map.
//!
//! Mappings are grouped per generated line so a lookup is one index into the
//! line table followed by a binary search over that line's segments.

use crate::error::{Result, SymbolicateError};

const BASE64_ALPHABET: &[u8; 64] =
	b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const fn build_decode_table() -> [i8; 128] {
	let mut table = [-1i8; 128];
	let mut i = 0;
	while i < BASE64_ALPHABET.len() {
		table[BASE64_ALPHABET[i] as usize] = i as i8;
		i += 1;
	}
	table
}

static DECODE_TABLE: [i8; 128] = build_decode_table();

const VLQ_CONTINUATION_BIT: i64 = 0b10_0000;
const VLQ_VALUE_MASK: i64 = 0b01_1111;
const VLQ_MAX_SHIFT: u32 = 30;

fn decode_char(ch: u8) -> Result<i64> {
	match DECODE_TABLE.get(ch as usize) {
		Some(&value) if value >= 0 => Ok(i64::from(value)),
		_ => Err(SymbolicateError::InvalidVlqChar(ch as char)),
	}
}

/// Decode one comma-separated segment into its signed values.
///
/// A segment holds 1, 4 or 5 values: generated column, then optionally
/// source index, original line, original column and name index. All values
/// are deltas against the previous segment.
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i64>> {
	let mut values = Vec::with_capacity(5);
	let mut accumulator = 0i64;
	let mut shift = 0u32;

	for ch in segment.bytes() {
		let digit = decode_char(ch)?;
		if shift > VLQ_MAX_SHIFT {
			return Err(SymbolicateError::VlqOverflow(segment.to_string()));
		}
		accumulator += (digit & VLQ_VALUE_MASK) << shift;

		if digit & VLQ_CONTINUATION_BIT != 0 {
			shift += 5;
			continue;
		}

		// Lowest bit carries the sign.
		let magnitude = accumulator >> 1;
		values.push(if accumulator & 1 == 1 { -magnitude } else { magnitude });
		accumulator = 0;
		shift = 0;
	}

	if shift != 0 {
		return Err(SymbolicateError::TruncatedVlq(segment.to_string()));
	}

	Ok(values)
}

/// Where a generated position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalLocation {
	pub source_index: u32,
	/// 0-indexed.
	pub line: u32,
	/// 0-indexed.
	pub column: u32,
	pub name_index: Option<u32>,
}

/// One segment of a generated line.
///
/// Segments with a single value mark generated code that has no original
/// location; they end the range of the segment before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
	pub generated_column: u32,
	pub original: Option<OriginalLocation>,
}

/// Decoded mappings indexed by 0-indexed generated line.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
	lines: Vec<Vec<Mapping>>,
}

impl DecodedMappings {
	/// Find the segment covering a generated position (both 0-indexed).
	///
	/// Returns the last segment on `line` starting at or before `column`.
	pub fn find(&self, line: u32, column: u32) -> Option<&Mapping> {
		let segments = self.lines.get(line as usize)?;
		let idx = segments.partition_point(|m| m.generated_column <= column);
		idx.checked_sub(1).map(|i| &segments[i])
	}
}

fn non_negative(value: i64, field: &'static str, line: u32) -> Result<u32> {
	u32::try_from(value).map_err(|_| SymbolicateError::NegativeMappingValue { field, line })
}

/// Decode a full `mappings` string.
///
/// Lines are separated by `;`, segments by `,`. The generated column resets
/// on every line; the other fields carry over across lines.
pub fn decode_vlq_mappings(mappings: &str) -> Result<DecodedMappings> {
	let mut lines = Vec::new();

	let mut source = 0i64;
	let mut original_line = 0i64;
	let mut original_column = 0i64;
	let mut name = 0i64;

	for (line_idx, line) in mappings.split(';').enumerate() {
		let line_no = line_idx as u32;
		let mut generated_column = 0i64;
		let mut segments = Vec::new();

		for segment in line.split(',').filter(|s| !s.is_empty()) {
			let values = decode_vlq_segment(segment)?;
			let Some(&column_delta) = values.first() else {
				continue;
			};

			generated_column += column_delta;
			let generated_column = non_negative(generated_column, "generated column", line_no)?;

			let original = if values.len() >= 4 {
				source += values[1];
				original_line += values[2];
				original_column += values[3];
				let name_index = match values.get(4) {
					Some(delta) => {
						name += delta;
						Some(non_negative(name, "name index", line_no)?)
					}
					None => None,
				};

				Some(OriginalLocation {
					source_index: non_negative(source, "source index", line_no)?,
					line: non_negative(original_line, "original line", line_no)?,
					column: non_negative(original_column, "original column", line_no)?,
					name_index,
				})
			} else {
				None
			};

			segments.push(Mapping {
				generated_column,
				original,
			});
		}

		// Bundlers emit segments in order; a stable sort keeps us correct if one doesn't.
		segments.sort_by_key(|m| m.generated_column);
		lines.push(segments);
	}

	Ok(DecodedMappings { lines })
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn encode_vlq(value: i64) -> String {
		let mut vlq = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
		let mut out = String::new();
		loop {
			let mut digit = vlq & VLQ_VALUE_MASK;
			vlq >>= 5;
			if vlq > 0 {
				digit |= VLQ_CONTINUATION_BIT;
			}
			out.push(BASE64_ALPHABET[digit as usize] as char);
			if vlq == 0 {
				return out;
			}
		}
	}

	#[test]
	fn test_decode_vlq_segment_simple() {
		assert_eq!(decode_vlq_segment("A").unwrap(), vec![0]);
		assert_eq!(decode_vlq_segment("C").unwrap(), vec![1]);
		assert_eq!(decode_vlq_segment("D").unwrap(), vec![-1]);
		assert_eq!(decode_vlq_segment("AACA").unwrap(), vec![0, 0, 1, 0]);
	}

	#[test]
	fn test_decode_vlq_segment_continuation() {
		// 'g' sets the continuation bit, 'B' carries 1 << 5.
		assert_eq!(decode_vlq_segment("gB").unwrap(), vec![16]);
	}

	#[test]
	fn test_invalid_vlq_char() {
		assert!(matches!(
			decode_vlq_segment("A!"),
			Err(SymbolicateError::InvalidVlqChar('!'))
		));
	}

	#[test]
	fn test_truncated_segment() {
		assert!(matches!(
			decode_vlq_segment("g"),
			Err(SymbolicateError::TruncatedVlq(_))
		));
	}

	#[test]
	fn test_decode_mappings_carries_original_line_across_lines() {
		let decoded = decode_vlq_mappings("AAAA;AACA").unwrap();
		assert!(decoded.find(2, 0).is_none());

		let second = decoded.find(1, 0).unwrap().original.unwrap();
		assert_eq!(second.line, 1);
	}

	#[test]
	fn test_find_closest_segment_on_line() {
		// Columns 0, 10 and 20 on the first line.
		let decoded = decode_vlq_mappings("AAAA,UACK,UACK").unwrap();

		assert_eq!(decoded.find(0, 5).unwrap().generated_column, 0);
		assert_eq!(decoded.find(0, 15).unwrap().generated_column, 10);
		assert_eq!(decoded.find(0, 25).unwrap().generated_column, 20);
		assert!(decoded.find(1, 0).is_none());
	}

	#[test]
	fn test_unmapped_segment_ends_previous_range() {
		// Column 0 is mapped, column 8 is generated-only code.
		let decoded = decode_vlq_mappings("AAAA,Q").unwrap();

		assert!(decoded.find(0, 4).unwrap().original.is_some());
		assert!(decoded.find(0, 9).unwrap().original.is_none());
	}

	#[test]
	fn test_column_before_first_segment() {
		let decoded = decode_vlq_mappings("KAAA").unwrap();
		assert!(decoded.find(0, 4).is_none());
		assert!(decoded.find(0, 5).is_some());
	}

	#[test]
	fn test_negative_source_index_is_rejected() {
		assert!(matches!(
			decode_vlq_mappings("ADAA"),
			Err(SymbolicateError::NegativeMappingValue {
				field: "source index",
				..
			})
		));
	}

	proptest! {
		#[test]
		fn segment_values_survive_encoding(values in proptest::collection::vec(-100_000i64..100_000, 1..6)) {
			let encoded: String = values.iter().map(|v| encode_vlq(*v)).collect();
			prop_assert_eq!(decode_vlq_segment(&encoded).unwrap(), values);
		}

		#[test]
		fn find_never_returns_segment_after_column(columns in proptest::collection::btree_set(0u32..500, 1..20), query in 0u32..600) {
			let mut previous = 0i64;
			let segments: Vec<String> = columns
				.iter()
				.map(|c| {
					let delta = i64::from(*c) - previous;
					previous = i64::from(*c);
					format!("{}AAA", encode_vlq(delta))
				})
				.collect();
			let decoded = decode_vlq_mappings(&segments.join(",")).unwrap();

			match decoded.find(0, query) {
				Some(m) => {
					prop_assert!(m.generated_column <= query);
					prop_assert!(!columns.iter().any(|c| *c > m.generated_column && *c <= query));
				}
				None => prop_assert!(columns.iter().all(|c| *c > query)),
			}
		}
	}
}
