// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assembly of the source-mapped stack text for one error.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use loom_stack_core::{AssembledReport, StackFrame};
use loom_stack_symbolicate::{
	CodeFrameRenderer, PlainCodeFrame, SourceMapCache, SourceMapStore, SourcemappedFrame,
};
use tracing::{error, instrument, trace};

use crate::config::{InspectConfig, Mode};
use crate::host::{CallSite, HostError};
use crate::ignore::is_default_ignored;
use crate::parse::parse_stack;
use crate::realm::ErrorRealm;
use crate::render::FrameRenderer;

/// Frames from this one down are the UI library's internal call machinery.
pub const REACT_STACK_BOTTOM_FRAME: &str = "react-stack-bottom-frame";

/// The error's declared name, or `Error` if absent or empty.
pub fn compute_error_name(error: &HostError) -> &str {
	error
		.name
		.as_deref()
		.filter(|name| !name.is_empty())
		.unwrap_or("Error")
}

/// Stack preparation that skips all runtime formatting.
///
/// Always emits `Name: message` (even for an empty message) followed by one
/// `    at <call site>` line per call site, so the parser sees uniform input.
pub fn prepare_unsourcemapped_stack_trace(error: &HostError, call_sites: &[CallSite]) -> String {
	let mut stack = format!("{}: {}", compute_error_name(error), error.message);
	for site in call_sites {
		stack.push_str("\n    at ");
		stack.push_str(&site.to_string());
	}
	stack
}

/// Cut `raw` before the line mentioning the bottom-frame marker.
fn truncate_at_bottom_frame(raw: &str) -> &str {
	raw.find(REACT_STACK_BOTTOM_FRAME)
		.and_then(|idx| raw[..idx].rfind('\n'))
		.map_or(raw, |cut| &raw[..cut])
}

/// Builds source-mapped stack text from raw stacks.
pub struct StackAssembler {
	store: Arc<dyn SourceMapStore>,
	code_frames: Arc<dyn CodeFrameRenderer>,
	renderer: FrameRenderer,
	mode: Mode,
	show_ignore_listed: bool,
}

impl StackAssembler {
	pub fn new(store: Arc<dyn SourceMapStore>) -> Self {
		Self {
			store,
			code_frames: Arc::new(PlainCodeFrame::default()),
			renderer: FrameRenderer::default(),
			mode: Mode::Development,
			show_ignore_listed: false,
		}
	}

	pub fn from_config(config: &InspectConfig, store: Arc<dyn SourceMapStore>) -> Self {
		Self::new(store)
			.with_mode(config.mode)
			.with_show_ignore_listed(config.show_ignore_listed)
			.with_code_frames(Arc::new(PlainCodeFrame::new(
				config.lines_above,
				config.lines_below,
			)))
	}

	pub fn with_mode(mut self, mode: Mode) -> Self {
		self.mode = mode;
		self
	}

	pub fn with_show_ignore_listed(mut self, show: bool) -> Self {
		self.show_ignore_listed = show;
		self
	}

	pub fn with_code_frames(mut self, code_frames: Arc<dyn CodeFrameRenderer>) -> Self {
		self.code_frames = code_frames;
		self
	}

	pub fn with_renderer(mut self, renderer: FrameRenderer) -> Self {
		self.renderer = renderer;
		self
	}

	/// Source-mapped report for `error`, reading its raw stack through `realm`.
	pub fn assemble(&self, realm: &ErrorRealm, error: &HostError) -> AssembledReport {
		let raw = realm.stack(error);
		self.assemble_stack(compute_error_name(error), &error.message, raw)
	}

	/// Source-mapped report for a raw `    at ...` stack.
	#[instrument(skip(self, raw), fields(mode = %self.mode))]
	pub fn assemble_stack(&self, name: &str, message: &str, raw: &str) -> AssembledReport {
		let raw = if self.show_ignore_listed {
			raw
		} else {
			truncate_at_bottom_frame(raw)
		};

		let renderer = self.renderer.with_current_dir();
		let mut cache = SourceMapCache::new(self.store.as_ref());
		let code_frames = self
			.mode
			.is_development()
			.then(|| self.code_frames.as_ref());

		let mut text = format!("{name}: {message}");
		let mut best_code_excerpt = None;

		for frame in parse_stack(raw) {
			let line = match frame.file.as_deref() {
				None => Some(renderer.render(&frame)),
				Some(file) if is_default_ignored(file) => self.hidden(&renderer, &frame),
				Some(_) => match self.resolve(&mut cache, &frame, code_frames) {
					None => Some(renderer.render(&frame)),
					Some(resolved) if resolved.frame.ignored => {
						self.hidden(&renderer, &resolved.frame.frame)
					}
					Some(resolved) => {
						if best_code_excerpt.is_none() {
							best_code_excerpt = resolved.code;
						}
						Some(renderer.render(&resolved.frame.frame))
					}
				},
			};

			if let Some(line) = line {
				text.push('\n');
				text.push_str(&line);
			}
		}

		AssembledReport {
			text,
			best_code_excerpt,
		}
	}

	fn hidden(&self, renderer: &FrameRenderer, frame: &StackFrame) -> Option<String> {
		self.show_ignore_listed
			.then(|| renderer.render_dimmed(frame))
	}

	/// Resolve one frame; a panic is contained and treated as a miss.
	fn resolve(
		&self,
		cache: &mut SourceMapCache<'_>,
		frame: &StackFrame,
		code_frames: Option<&dyn CodeFrameRenderer>,
	) -> Option<SourcemappedFrame> {
		match catch_unwind(AssertUnwindSafe(|| cache.resolve(frame, code_frames))) {
			Ok(resolved) => {
				if resolved.is_none() {
					trace!(file = ?frame.file, "frame left unresolved");
				}
				resolved
			}
			Err(_) => {
				error!(file = ?frame.file, line = ?frame.line_number, "source mapping a frame panicked");
				None
			}
		}
	}
}
