// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map resolution for Loom error inspection.
//!
//! This crate provides functionality for:
//! - Parsing flat and index (sectioned) v3 source maps
//! - Mapping compiled stack frame positions back to original sources
//! - Honouring per-map `ignoreList`s
//! - Finding source maps for compiled files on disk
//! - Rendering code excerpts around resolved positions
//!
//! # Example
//!
//! ```
//! use loom_stack_core::StackFrame;
//! use loom_stack_symbolicate::{InMemorySourceMaps, SourceMapCache};
//!
//! let mut store = InMemorySourceMaps::new();
//! store
//!     .add_json(
//!         "/app/dist/a.js",
//!         r#"{
//!             "version": 3,
//!             "sources": ["src/a.ts"],
//!             "names": ["foo"],
//!             "mappings": ";;OASEA"
//!         }"#,
//!     )
//!     .unwrap();
//!
//! // One cache per formatted error.
//! let mut cache = SourceMapCache::new(&store);
//! let frame = StackFrame::new("/app/dist/a.js", 3, 7);
//! let resolved = cache.resolve(&frame, None).unwrap();
//!
//! assert_eq!(resolved.frame.frame.file.as_deref(), Some("src/a.ts"));
//! assert_eq!(resolved.frame.frame.line_number, Some(10));
//! assert_eq!(resolved.frame.frame.method_name.as_deref(), Some("foo"));
//! ```

pub mod codeframe;
pub mod consumer;
pub mod error;
pub mod payload;
pub mod resolver;
pub mod sourcemap;
pub mod store;
pub mod vlq;

// Re-export main types
pub use codeframe::{extract_context, CodeFrameRenderer, PlainCodeFrame, SourceContext};
pub use consumer::SourceMapConsumer;
pub use error::{Result, SymbolicateError};
pub use payload::{
	find_applicable_section, IndexSourceMap, IndexSourceMapSection, RawSourceMap, SectionOffset,
	SourceMapPayload,
};
pub use resolver::{restore_method_name, SourceMapCache, SourceMapCacheEntry, SourcemappedFrame};
pub use sourcemap::{OriginalPosition, ParsedSourceMap};
pub use store::{FsSourceMaps, InMemorySourceMaps, SourceMapStore};
pub use vlq::{decode_vlq_mappings, decode_vlq_segment, DecodedMappings, Mapping};
