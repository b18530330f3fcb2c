// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ambient per-thread work unit (the request or render being processed).
//!
//! Diagnostics tied to the current unit must not fire for work the
//! inspection hook does on its behalf, so formatting runs inside [`exit`].

use std::cell::RefCell;

thread_local! {
	static CURRENT: RefCell<Option<WorkUnit>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
	pub label: String,
}

impl WorkUnit {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
		}
	}
}

/// Puts the previous unit back on drop, including during unwinding.
struct Restore(Option<WorkUnit>);

impl Drop for Restore {
	fn drop(&mut self) {
		let previous = self.0.take();
		CURRENT.with(|cell| *cell.borrow_mut() = previous);
	}
}

fn replace(unit: Option<WorkUnit>) -> Restore {
	Restore(CURRENT.with(|cell| cell.replace(unit)))
}

/// Run `f` with `unit` as the current work unit.
pub fn run<R>(unit: WorkUnit, f: impl FnOnce() -> R) -> R {
	let _restore = replace(Some(unit));
	f()
}

/// Run `f` outside of any work unit.
pub fn exit<R>(f: impl FnOnce() -> R) -> R {
	let _restore = replace(None);
	f()
}

pub fn current() -> Option<WorkUnit> {
	CURRENT.with(|cell| cell.borrow().clone())
}
