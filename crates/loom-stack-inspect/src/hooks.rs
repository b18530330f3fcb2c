// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source-mapped inspection hooks for the error constructor.

use std::sync::Arc;

use loom_stack_symbolicate::SourceMapStore;
use tracing::{debug, info};

use crate::assemble::{prepare_unsourcemapped_stack_trace, StackAssembler};
use crate::config::{InspectConfig, InspectFlavor};
use crate::host::HostError;
use crate::inspect::{self, InspectOptions};
use crate::realm::{self, CustomInspect, ErrorRealm, InspectSymbol};
use crate::rebuild::source_map_error;
use crate::work_unit;

/// Inspect hook that prints errors with source-mapped stacks.
pub struct SourceMappedInspect {
	assembler: Arc<StackAssembler>,
	flavor: InspectFlavor,
}

impl SourceMappedInspect {
	pub fn new(assembler: Arc<StackAssembler>, flavor: InspectFlavor) -> Self {
		Self { assembler, flavor }
	}
}

impl CustomInspect for SourceMappedInspect {
	fn inspect(
		&self,
		realm: &ErrorRealm,
		error: &HostError,
		depth: usize,
		options: &InspectOptions,
	) -> String {
		work_unit::exit(|| {
			let rebuilt = source_map_error(&self.assembler, realm, error);

			// The generic inspector must not come back to this hook for the
			// rebuilt error itself; its cause still goes through it.
			let _suppressed = rebuilt.suppress_inspect();
			match self.flavor {
				InspectFlavor::Node => inspect::inspect(
					realm,
					&rebuilt,
					&InspectOptions {
						depth: options.depth.saturating_sub(depth),
					},
				),
				InspectFlavor::EdgeLite => inspect::format(realm, &rebuilt),
			}
		})
	}
}

/// Route Node-style inspection of every error in `realm` through source maps.
pub fn patch_error_inspect_node(realm: &mut ErrorRealm, assembler: Arc<StackAssembler>) {
	realm.set_prepare_stack_trace(prepare_unsourcemapped_stack_trace);
	realm.set_inspect_hook(
		InspectSymbol::NodeJs,
		Arc::new(SourceMappedInspect::new(assembler, InspectFlavor::Node)),
	);
	debug!(symbol = %InspectSymbol::NodeJs, "patched error inspection");
}

/// Same as [`patch_error_inspect_node`] for the edge runtime's `format`.
pub fn patch_error_inspect_edge_lite(realm: &mut ErrorRealm, assembler: Arc<StackAssembler>) {
	realm.set_prepare_stack_trace(prepare_unsourcemapped_stack_trace);
	realm.set_inspect_hook(
		InspectSymbol::EdgeRuntime,
		Arc::new(SourceMappedInspect::new(assembler, InspectFlavor::EdgeLite)),
	);
	debug!(symbol = %InspectSymbol::EdgeRuntime, "patched error inspection");
}

/// Build a patched realm for `config`.
pub fn patched_realm(config: &InspectConfig, store: Arc<dyn SourceMapStore>) -> ErrorRealm {
	let assembler = Arc::new(StackAssembler::from_config(config, store));
	let mut realm = ErrorRealm::new();
	match config.flavor {
		InspectFlavor::Node => patch_error_inspect_node(&mut realm, assembler),
		InspectFlavor::EdgeLite => patch_error_inspect_edge_lite(&mut realm, assembler),
	}
	realm
}

/// Patch and install the process-wide realm. Returns `false` if one was
/// already installed.
pub fn install(config: &InspectConfig, store: Arc<dyn SourceMapStore>) -> bool {
	let installed = realm::install_global(patched_realm(config, store));
	if installed {
		info!(mode = %config.mode, flavor = %config.flavor, "source-mapped error inspection installed");
	}
	installed
}
