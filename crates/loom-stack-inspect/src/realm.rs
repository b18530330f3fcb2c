// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The error constructor's extension points.
//!
//! An [`ErrorRealm`] holds what a runtime lets embedders override on its
//! error constructor: the stack preparation hook and custom inspect hooks
//! keyed by an inspection symbol. One realm is installed process-wide with
//! [`install_global`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::host::{CallSite, HostError};
use crate::inspect::InspectOptions;

/// Computes an error's stack text from its call sites on first read.
pub type PrepareStackTrace = fn(&HostError, &[CallSite]) -> String;

/// Well-known symbols the runtime looks up custom inspection under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InspectSymbol {
	NodeJs,
	EdgeRuntime,
}

impl InspectSymbol {
	pub fn key(self) -> &'static str {
		match self {
			Self::NodeJs => "nodejs.util.inspect.custom",
			Self::EdgeRuntime => "edge-runtime.inspect.custom",
		}
	}
}

impl fmt::Display for InspectSymbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Symbol({})", self.key())
	}
}

/// Custom text inspection of an error.
pub trait CustomInspect: Send + Sync {
	/// `depth` is the nesting level the error is being inspected at; 0 at
	/// the top.
	fn inspect(
		&self,
		realm: &ErrorRealm,
		error: &HostError,
		depth: usize,
		options: &InspectOptions,
	) -> String;
}

#[derive(Default)]
pub struct ErrorRealm {
	prepare_stack_trace: Option<PrepareStackTrace>,
	inspect_hooks: HashMap<InspectSymbol, Arc<dyn CustomInspect>>,
}

impl fmt::Debug for ErrorRealm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ErrorRealm")
			.field("prepare_stack_trace", &self.prepare_stack_trace.is_some())
			.field("inspect_hooks", &self.inspect_hooks.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl ErrorRealm {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_prepare_stack_trace(&mut self, prepare: PrepareStackTrace) {
		self.prepare_stack_trace = Some(prepare);
	}

	pub fn prepare_stack_trace(&self) -> Option<PrepareStackTrace> {
		self.prepare_stack_trace
	}

	/// Override the inspect hook for `symbol`. Replaces any previous hook.
	pub fn set_inspect_hook(&mut self, symbol: InspectSymbol, hook: Arc<dyn CustomInspect>) {
		if self.inspect_hooks.insert(symbol, hook).is_some() {
			debug!(symbol = %symbol, "replaced existing inspect hook");
		}
	}

	pub fn inspect_hook(&self, symbol: InspectSymbol) -> Option<&Arc<dyn CustomInspect>> {
		self.inspect_hooks.get(&symbol)
	}

	/// The error's stack text, prepared on first read.
	pub fn stack<'e>(&self, error: &'e HostError) -> &'e str {
		let prepare = self.prepare_stack_trace.unwrap_or(default_stack_trace);
		error.stack_or_init(|| prepare(error, &error.call_sites))
	}
}

/// Runtime default: `Name: message`, or just `Name` for an empty message.
pub fn default_stack_trace(error: &HostError, call_sites: &[CallSite]) -> String {
	let name = error.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Error");
	let mut stack = if error.message.is_empty() {
		name.to_string()
	} else {
		format!("{name}: {}", error.message)
	};
	for site in call_sites {
		stack.push_str(&format!("\n    at {site}"));
	}
	stack
}

static GLOBAL_REALM: OnceLock<ErrorRealm> = OnceLock::new();

/// Install the process-wide realm. Only the first call has an effect.
pub fn install_global(realm: ErrorRealm) -> bool {
	let installed = GLOBAL_REALM.set(realm).is_ok();
	if !installed {
		warn!("error realm already installed; ignoring");
	}
	installed
}

/// The process-wide realm, if installed.
pub fn global() -> Option<&'static ErrorRealm> {
	GLOBAL_REALM.get()
}
