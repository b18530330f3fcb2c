// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-line rendering of stack frames.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use colored::Colorize;
use loom_stack_core::StackFrame;

/// Renders frames as `    at <method> (<file>:<line>:<column>)`.
///
/// Local paths are shown relative to `cwd` when one is set. Without one,
/// [`FrameRenderer::with_current_dir`] fills it in at use time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameRenderer {
	cwd: Option<PathBuf>,
}

impl FrameRenderer {
	pub fn new(cwd: Option<PathBuf>) -> Self {
		Self { cwd }
	}

	/// This renderer, or a copy bound to the process's current directory
	/// if no `cwd` was set.
	pub fn with_current_dir(&self) -> Cow<'_, Self> {
		match self.cwd {
			Some(_) => Cow::Borrowed(self),
			None => Cow::Owned(Self::new(std::env::current_dir().ok())),
		}
	}

	pub fn render(&self, frame: &StackFrame) -> String {
		let mut location = frame
			.file
			.as_deref()
			.map(|file| self.file_location(file))
			.unwrap_or_default();

		if let Some(line) = frame.line_number {
			location.push_str(&format!(":{line}"));
			if let Some(column) = frame.column {
				location.push_str(&format!(":{column}"));
			}
		}

		match &frame.method_name {
			Some(method) => format!("    at {method} ({location})"),
			None => format!("    at {location}"),
		}
	}

	/// Rendering for ignore-listed frames shown on request.
	pub fn render_dimmed(&self, frame: &StackFrame) -> String {
		self.render(frame).dimmed().to_string()
	}

	fn file_location(&self, file: &str) -> String {
		let path = if file.starts_with("file://") {
			match url::Url::parse(file).ok().and_then(|u| u.to_file_path().ok()) {
				Some(path) => path,
				None => return file.to_string(),
			}
		} else if Path::new(file).is_absolute() {
			PathBuf::from(file)
		} else {
			return file.to_string();
		};

		match &self.cwd {
			Some(cwd) => relative_path(cwd, &path).display().to_string(),
			None => path.display().to_string(),
		}
	}
}

/// Path of `path` relative to `base`, both absolute.
fn relative_path(base: &Path, path: &Path) -> PathBuf {
	let base: Vec<Component> = base.components().collect();
	let target: Vec<Component> = path.components().collect();

	let common = base
		.iter()
		.zip(&target)
		.take_while(|(a, b)| a == b)
		.count();

	let mut relative = PathBuf::new();
	for _ in common..base.len() {
		relative.push("..");
	}
	for component in &target[common..] {
		relative.push(component.as_os_str());
	}
	relative
}

#[cfg(test)]
mod tests {
	use super::*;

	fn renderer() -> FrameRenderer {
		FrameRenderer::new(Some(PathBuf::from("/app")))
	}

	#[test]
	fn test_render_with_method() {
		let frame = StackFrame::new("src/a.ts", 10, 2).with_method("foo");
		assert_eq!(renderer().render(&frame), "    at foo (src/a.ts:10:2)");
	}

	#[test]
	fn test_render_without_method() {
		let frame = StackFrame::new("node:internal/x", 1, 1);
		assert_eq!(renderer().render(&frame), "    at node:internal/x:1:1");
	}

	#[test]
	fn test_absolute_and_file_url_paths_are_relative_to_cwd() {
		let r = renderer();
		assert_eq!(
			r.render(&StackFrame::new("/app/dist/a.js", 3, 7)),
			"    at dist/a.js:3:7"
		);
		assert_eq!(
			r.render(&StackFrame::new("file:///app/dist/a.js", 3, 7)),
			"    at dist/a.js:3:7"
		);
		assert_eq!(
			r.render(&StackFrame::new("/lib/x.js", 1, 0)),
			"    at ../lib/x.js:1:0"
		);
	}

	#[test]
	fn test_no_cwd_keeps_absolute_path() {
		let frame = StackFrame::new("file:///app/dist/a.js", 3, 7);
		assert_eq!(
			FrameRenderer::default().render(&frame),
			"    at /app/dist/a.js:3:7"
		);
	}

	#[test]
	fn test_explicit_cwd_is_kept() {
		assert_eq!(*renderer().with_current_dir(), renderer());
	}

	#[test]
	fn test_unset_cwd_follows_current_dir() {
		let cwd = std::env::current_dir().unwrap();
		let file = cwd.join("dist").join("a.js");
		let frame = StackFrame::new(file.to_str().unwrap(), 3, 7);

		let renderer = FrameRenderer::default();
		assert_eq!(
			renderer.with_current_dir().render(&frame),
			format!("    at {}:3:7", Path::new("dist").join("a.js").display())
		);
		assert_eq!(*renderer.with_current_dir(), FrameRenderer::new(Some(cwd)));
	}

	#[test]
	fn test_missing_line_drops_column() {
		let frame = StackFrame {
			file: Some("/app/a.js".to_string()),
			line_number: None,
			column: Some(4),
			method_name: Some("foo".to_string()),
		};
		assert_eq!(renderer().render(&frame), "    at foo (a.js)");

		let frame = StackFrame {
			column: None,
			line_number: Some(9),
			..frame
		};
		assert_eq!(renderer().render(&frame), "    at foo (a.js:9)");
	}

	#[test]
	fn test_missing_file_renders_empty_location() {
		let frame = StackFrame {
			method_name: Some("Array.map".to_string()),
			..StackFrame::default()
		};
		assert_eq!(renderer().render(&frame), "    at Array.map ()");
	}

	#[test]
	fn test_dimmed_contains_plain_text() {
		let frame = StackFrame::new("/app/a.js", 1, 1);
		assert!(renderer()
			.render_dimmed(&frame)
			.contains("    at a.js:1:1"));
	}

	#[test]
	fn test_relative_path() {
		assert_eq!(
			relative_path(Path::new("/a/b"), Path::new("/a/b/c/d.js")),
			PathBuf::from("c/d.js")
		);
		assert_eq!(
			relative_path(Path::new("/a/b"), Path::new("/a/x.js")),
			PathBuf::from("../x.js")
		);
		assert_eq!(relative_path(Path::new("/a"), Path::new("/a")), PathBuf::new());
	}
}
