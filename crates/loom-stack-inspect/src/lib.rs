// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source-mapped error inspection for Loom.
//!
//! Errors printed through the runtime's inspector get their stacks rewritten
//! to original source positions. Frames from ignore-listed sources and
//! `node:` internals are hidden (or dimmed when configured), and in
//! development mode a code excerpt of the first application frame follows
//! the stack.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use loom_stack_inspect::{inspect, patched_realm, CallSite, HostError, InspectConfig, InspectOptions, Mode};
//! use loom_stack_symbolicate::InMemorySourceMaps;
//!
//! let mut store = InMemorySourceMaps::new();
//! store
//!     .add_json(
//!         "/app/dist/a.js",
//!         r#"{"version": 3, "sources": ["src/a.ts"], "names": ["foo"], "mappings": ";;OASEA"}"#,
//!     )
//!     .unwrap();
//!
//! let config = InspectConfig {
//!     mode: Mode::Production,
//!     ..InspectConfig::default()
//! };
//! let realm = patched_realm(&config, Arc::new(store));
//!
//! let error = HostError::new("boom")
//!     .with_call_sites(vec![CallSite::new("/app/dist/a.js", 3, 7).with_function("foo")]);
//!
//! assert_eq!(
//!     inspect(&realm, &error, &InspectOptions::default()),
//!     "Error: boom\n    at foo (src/a.ts:10:2)"
//! );
//! ```

pub mod assemble;
pub mod config;
pub mod error;
pub mod hooks;
pub mod host;
pub mod ignore;
pub mod inspect;
pub mod parse;
pub mod realm;
pub mod rebuild;
pub mod render;
pub mod sources;
pub mod work_unit;

pub use assemble::{
	compute_error_name, prepare_unsourcemapped_stack_trace, StackAssembler, REACT_STACK_BOTTOM_FRAME,
};
pub use config::{InspectConfig, InspectConfigLayer, InspectFlavor, Mode};
pub use error::{ConfigError, Result};
pub use hooks::{
	install, patch_error_inspect_edge_lite, patch_error_inspect_node, patched_realm,
	SourceMappedInspect,
};
pub use host::{CallSite, ErrorValue, HostError};
pub use inspect::{format, inspect, InspectOptions};
pub use parse::{parse_frame_line, parse_stack};
pub use realm::{CustomInspect, ErrorRealm, InspectSymbol, PrepareStackTrace};
pub use rebuild::source_map_error;
pub use render::FrameRenderer;
pub use sources::{load_config, load_config_from, load_config_with_file, ConfigSource, Precedence};
pub use work_unit::WorkUnit;
