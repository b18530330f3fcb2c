// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Frames hidden regardless of source map content.

const BUILTIN_SCHEME: &str = "node:";

/// Host runtime built-ins are never worth showing.
pub fn is_default_ignored(file: &str) -> bool {
	file.starts_with(BUILTIN_SCHEME)
}
