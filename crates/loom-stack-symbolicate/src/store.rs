// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map lookup by generated file.
//!
//! The host runtime knows which map belongs to a loaded file. In Loom that
//! knowledge lives behind [`SourceMapStore`]; [`FsSourceMaps`] reproduces it
//! from `sourceMappingURL` comments on disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use base64::Engine;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, SymbolicateError};
use crate::payload::SourceMapPayload;

/// Trait for finding the source map payload of a generated file.
pub trait SourceMapStore: Send + Sync {
	/// Payload for `file`, or `None` if the file has no map.
	///
	/// Implementations never fail; load problems are logged and treated as
	/// a missing map.
	fn find_source_map(&self, file: &str) -> Option<Arc<SourceMapPayload>>;
}

impl<T: SourceMapStore + ?Sized> SourceMapStore for Arc<T> {
	fn find_source_map(&self, file: &str) -> Option<Arc<SourceMapPayload>> {
		(**self).find_source_map(file)
	}
}

/// Simple in-memory store, keyed by the file path as it appears in frames.
#[derive(Debug, Default)]
pub struct InMemorySourceMaps {
	maps: HashMap<String, Arc<SourceMapPayload>>,
}

impl InMemorySourceMaps {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, file: impl Into<String>, payload: SourceMapPayload) {
		self.maps.insert(file.into(), Arc::new(payload));
	}

	/// Parse and add a payload from JSON.
	pub fn add_json(&mut self, file: impl Into<String>, json: &str) -> Result<()> {
		let payload = SourceMapPayload::from_slice(json.as_bytes())?;
		self.add(file, payload);
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.maps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.maps.is_empty()
	}
}

impl SourceMapStore for InMemorySourceMaps {
	fn find_source_map(&self, file: &str) -> Option<Arc<SourceMapPayload>> {
		self.maps.get(file).cloned()
	}
}

#[derive(Debug)]
struct CachedMap {
	modified: Option<SystemTime>,
	len: u64,
	payload: Option<Arc<SourceMapPayload>>,
}

/// Store that follows `sourceMappingURL` comments of files on disk.
///
/// Supports inline `data:` URLs, relative map paths and a sibling
/// `<file>.map` fallback. Results are cached per generated file and
/// invalidated when its size or modification time changes.
#[derive(Debug, Default)]
pub struct FsSourceMaps {
	cache: Mutex<HashMap<PathBuf, CachedMap>>,
}

impl FsSourceMaps {
	pub fn new() -> Self {
		Self::default()
	}

	fn load(&self, path: &Path) -> Result<Option<SourceMapPayload>> {
		let generated = fs::read_to_string(path).map_err(|source| SymbolicateError::FileRead {
			path: path.to_path_buf(),
			source,
		})?;

		if let Some(url) = find_source_mapping_url(&generated) {
			if let Some(data) = url.strip_prefix("data:") {
				return decode_data_url(data).map(Some);
			}
			let map_path = resolve_relative(path, url)?;
			return read_payload(&map_path).map(Some);
		}

		let sibling = sibling_map_path(path);
		if sibling.is_file() {
			debug!(path = %sibling.display(), "Using sibling source map");
			return read_payload(&sibling).map(Some);
		}

		Ok(None)
	}
}

impl SourceMapStore for FsSourceMaps {
	fn find_source_map(&self, file: &str) -> Option<Arc<SourceMapPayload>> {
		let path = file_to_path(file)?;
		let metadata = fs::metadata(&path).ok()?;
		let modified = metadata.modified().ok();
		let len = metadata.len();

		let mut cache = self.cache.lock();
		if let Some(cached) = cache.get(&path) {
			if cached.modified == modified && cached.len == len {
				return cached.payload.clone();
			}
		}

		let payload = match self.load(&path) {
			Ok(payload) => payload.map(Arc::new),
			Err(e) => {
				warn!(file = %path.display(), error = %e, "Failed to load source map");
				None
			}
		};

		cache.insert(
			path,
			CachedMap {
				modified,
				len,
				payload: payload.clone(),
			},
		);
		payload
	}
}

/// Local path for a frame file, or `None` for non-file URLs.
fn file_to_path(file: &str) -> Option<PathBuf> {
	if file.starts_with("file://") {
		return url::Url::parse(file).ok()?.to_file_path().ok();
	}
	let path = Path::new(file);
	path.is_absolute().then(|| path.to_path_buf())
}

/// Value of the last `sourceMappingURL` comment in a generated file.
pub fn find_source_mapping_url(generated: &str) -> Option<&str> {
	generated.lines().rev().find_map(|line| {
		let line = line.trim();
		line.strip_prefix("//# sourceMappingURL=")
			.or_else(|| line.strip_prefix("//@ sourceMappingURL="))
			.map(str::trim)
			.filter(|url| !url.is_empty())
	})
}

fn decode_data_url(data: &str) -> Result<SourceMapPayload> {
	let Some((_, encoded)) = data.split_once(";base64,") else {
		return Err(SymbolicateError::UnsupportedUrl(format!("data:{data}")));
	};
	let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
	SourceMapPayload::from_slice(&bytes)
}

fn resolve_relative(generated: &Path, url: &str) -> Result<PathBuf> {
	if url.starts_with("file://") {
		return url::Url::parse(url)
			.ok()
			.and_then(|u| u.to_file_path().ok())
			.ok_or_else(|| SymbolicateError::UnsupportedUrl(url.to_string()));
	}
	if url.contains("://") {
		return Err(SymbolicateError::UnsupportedUrl(url.to_string()));
	}
	let base = generated.parent().unwrap_or_else(|| Path::new(""));
	Ok(base.join(url))
}

fn sibling_map_path(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_os_string();
	name.push(".map");
	PathBuf::from(name)
}

fn read_payload(path: &Path) -> Result<SourceMapPayload> {
	let bytes = fs::read(path).map_err(|source| SymbolicateError::FileRead {
		path: path.to_path_buf(),
		source,
	})?;
	SourceMapPayload::from_slice(&bytes)
}
