// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rebuilding an error around its source-mapped stack.

use crate::assemble::StackAssembler;
use crate::host::HostError;
use crate::realm::ErrorRealm;

/// A copy of `error` whose stack is the source-mapped report.
///
/// The message is kept verbatim. `cause` is only set when the original has
/// one, and every extra property the copy does not already own is carried
/// over.
pub fn source_map_error(assembler: &StackAssembler, realm: &ErrorRealm, error: &HostError) -> HostError {
	let mut rebuilt = HostError::new(error.message.clone());
	rebuilt.name = error.name.clone();
	if let Some(cause) = &error.cause {
		rebuilt.cause = Some(cause.clone());
	}

	rebuilt.set_stack(assembler.assemble(realm, error).into_stack());

	for (key, value) in &error.properties {
		if !rebuilt.has_own_property(key) {
			rebuilt.set_property(key.clone(), value.clone());
		}
	}

	rebuilt
}
