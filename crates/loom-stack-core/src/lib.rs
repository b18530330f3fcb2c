// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Loom source-mapped error inspection.
//!
//! This crate provides the frame model shared by the source map resolver
//! (`loom-stack-symbolicate`) and the error inspection pipeline
//! (`loom-stack-inspect`).
//!
//! # Overview
//!
//! - [`StackFrame`]: one call site parsed from a raw stack trace
//! - [`ResolvedFrame`]: a frame after source map lookup, tagged with whether
//!   the original source is ignore-listed
//! - [`AssembledReport`]: the final multi-line stack text plus the optional
//!   code excerpt chosen for it

pub mod error;
pub mod frame;
pub mod report;

pub use error::{Result, StackError};
pub use frame::{ResolvedFrame, StackFrame};
pub use report::AssembledReport;
