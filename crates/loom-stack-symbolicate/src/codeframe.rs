// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Code excerpts for resolved frames.

use std::fmt::Write;

use loom_stack_core::ResolvedFrame;

/// Renders a short excerpt of original source around a resolved frame.
pub trait CodeFrameRenderer: Send + Sync {
	/// Returns `None` when no excerpt should be shown for this frame.
	fn render(&self, frame: &ResolvedFrame, source_content: Option<&str>) -> Option<String>;
}

/// Source lines around a target line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
	/// 1-indexed line number of the first entry in `pre_context`.
	pub first_line: usize,
	pub pre_context: Vec<String>,
	pub context_line: String,
	pub post_context: Vec<String>,
}

/// Extract `before` lines above and `after` lines below a 1-indexed line.
///
/// Returns `None` when the line is outside the source.
pub fn extract_context(
	source_content: &str,
	line: usize,
	before: usize,
	after: usize,
) -> Option<SourceContext> {
	let lines: Vec<&str> = source_content.lines().collect();
	let line_idx = line.checked_sub(1)?;
	let context_line = lines.get(line_idx)?.to_string();

	let pre_start = line_idx.saturating_sub(before);
	let post_end = (line_idx + 1 + after).min(lines.len());

	Some(SourceContext {
		first_line: pre_start + 1,
		pre_context: lines[pre_start..line_idx]
			.iter()
			.map(|s| s.to_string())
			.collect(),
		context_line,
		post_context: lines[(line_idx + 1)..post_end]
			.iter()
			.map(|s| s.to_string())
			.collect(),
	})
}

/// Plain-text code frame with a line-number gutter and a caret under the column.
///
/// ```text
///   5 |     <div>
///   6 |       {list.map((item, index) => (
/// > 7 |         <span>{item}</span>
///     |         ^
///   8 |       ))}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainCodeFrame {
	pub lines_above: usize,
	pub lines_below: usize,
}

impl Default for PlainCodeFrame {
	fn default() -> Self {
		Self {
			lines_above: 2,
			lines_below: 3,
		}
	}
}

impl PlainCodeFrame {
	pub fn new(lines_above: usize, lines_below: usize) -> Self {
		Self {
			lines_above,
			lines_below,
		}
	}
}

/// Third-party code is not worth an excerpt.
fn is_internal_source(file: &str) -> bool {
	file.contains("node_modules") || file.starts_with("node:")
}

impl CodeFrameRenderer for PlainCodeFrame {
	fn render(&self, frame: &ResolvedFrame, source_content: Option<&str>) -> Option<String> {
		let source_content = source_content?;
		if frame.frame.file.as_deref().is_some_and(is_internal_source) {
			return None;
		}
		let line = frame.frame.line_number? as usize;
		let context = extract_context(source_content, line, self.lines_above, self.lines_below)?;

		let last_line = line + context.post_context.len();
		let width = last_line.to_string().len();
		let mut out = String::new();

		let mut push_line = |marker: char, number: usize, text: &str| {
			let _ = writeln!(out, "{marker} {number:>width$} | {text}");
		};

		for (i, text) in context.pre_context.iter().enumerate() {
			push_line(' ', context.first_line + i, text);
		}
		push_line('>', line, &context.context_line);
		if let Some(column) = frame.frame.column {
			let width_of_line = context.context_line.chars().count();
			let padding = " ".repeat((column as usize).min(width_of_line));
			let _ = writeln!(out, "  {:>width$} | {padding}^", "");
		}
		for (i, text) in context.post_context.iter().enumerate() {
			let _ = writeln!(out, "  {:>width$} | {text}", line + 1 + i);
		}

		Some(
			out.lines()
				.map(str::trim_end)
				.collect::<Vec<_>>()
				.join("\n"),
		)
	}
}
