// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assembled stack report.

use std::fmt;

/// The source-mapped stack for one error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledReport {
	/// `"<Name>: <message>"` followed by one line per kept frame.
	pub text: String,
	/// Code excerpt of the first non-ignored resolved frame (development only).
	pub best_code_excerpt: Option<String>,
}

impl AssembledReport {
	/// Number of lines after the header line.
	pub fn frame_count(&self) -> usize {
		self.text.lines().skip(1).count()
	}

	/// The full stack string, with the excerpt appended when present.
	pub fn into_stack(self) -> String {
		match self.best_code_excerpt {
			Some(excerpt) => format!("{}\n{}", self.text, excerpt),
			None => self.text,
		}
	}
}

impl fmt::Display for AssembledReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)?;
		if let Some(excerpt) = &self.best_code_excerpt {
			write!(f, "\n{}", excerpt)?;
		}
		Ok(())
	}
}
