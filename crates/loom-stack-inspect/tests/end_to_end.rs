// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end tests from raw host errors to inspected output.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use loom_stack_core::StackFrame;
use loom_stack_inspect::sources::{DefaultsSource, TomlSource};
use loom_stack_inspect::{
	format, inspect, install, load_config_from, parse_stack, patch_error_inspect_node,
	patched_realm, realm, source_map_error, CallSite, ConfigSource, ErrorRealm, FrameRenderer,
	HostError, InspectConfig, InspectFlavor, InspectOptions, Mode, StackAssembler,
};
use loom_stack_symbolicate::{FsSourceMaps, InMemorySourceMaps, SourceMapCache, SourceMapStore};
use serde_json::json;
use tempfile::TempDir;

const A_JS_MAP: &str = r#"{
	"version": 3,
	"sources": ["src/a.ts"],
	"sourcesContent": ["import x from 'x'\n\nexport function foo() {\n\n\n\n\n\n  x()\n  boom()\n}\n"],
	"names": ["foo"],
	"mappings": ";;OASEA"
}"#;

/// Sectioned bundle: the first section is app code, the second a vendored
/// library that lists itself as ignored.
const BUNDLE_MAP: &str = r#"{
	"version": 3,
	"sections": [
		{
			"offset": {"line": 0, "column": 0},
			"map": {"version": 3, "sources": ["src/page.tsx"], "names": ["Page"], "mappings": "AAAAA"}
		},
		{
			"offset": {"line": 5, "column": 0},
			"map": {
				"version": 3,
				"sources": ["node_modules/react-dom/index.js"],
				"names": [],
				"mappings": "AAAA",
				"ignoreList": [0]
			}
		}
	]
}"#;

fn store() -> Arc<InMemorySourceMaps> {
	let mut store = InMemorySourceMaps::new();
	store.add_json("/app/dist/a.js", A_JS_MAP).unwrap();
	store.add_json("/app/dist/bundle.js", BUNDLE_MAP).unwrap();
	Arc::new(store)
}

fn assembler(mode: Mode) -> StackAssembler {
	StackAssembler::new(store())
		.with_mode(mode)
		.with_renderer(FrameRenderer::new(Some(PathBuf::from("/app"))))
}

#[test]
fn test_boom_scenario() {
	let report = assembler(Mode::Production).assemble_stack(
		"Error",
		"boom",
		"Error: boom\n    at foo (/app/dist/a.js:3:7)\n    at node:internal/x:1:1",
	);

	assert_eq!(report.text, "Error: boom\n    at foo (src/a.ts:10:2)");
	assert_eq!(report.into_stack(), "Error: boom\n    at foo (src/a.ts:10:2)");
}

#[test]
fn test_development_mode_appends_one_excerpt() {
	let report = assembler(Mode::Development).assemble_stack(
		"Error",
		"boom",
		"Error: boom\n    at foo (/app/dist/a.js:3:7)\n    at foo (/app/dist/a.js:3:7)",
	);

	assert_eq!(report.frame_count(), 2);
	let stack = report.into_stack();
	assert!(stack.starts_with("Error: boom\n    at foo (src/a.ts:10:2)\n    at foo (src/a.ts:10:2)\n"));
	assert_eq!(stack.matches("> 10 |   boom()").count(), 1);
}

#[test]
fn test_frames_without_file_render_the_same_resolved_or_not() {
	let raw = "Error: x\n    at Array.map (<anonymous>)\n    at native\n    at async Promise.all (index 0)";
	let renderer = FrameRenderer::new(Some(PathBuf::from("/app")));
	let store = store();
	let mut cache = SourceMapCache::new(store.as_ref());

	let frames = parse_stack(raw);
	assert_eq!(frames.len(), 3);
	for frame in &frames {
		assert!(frame.file.is_none());
		let resolved = cache
			.resolve(frame, None)
			.map(|r| r.frame.frame)
			.unwrap_or_else(|| frame.clone());
		assert_eq!(renderer.render(frame), renderer.render(&resolved));
	}
}

#[test]
fn test_without_source_maps_frames_keep_their_order() {
	let raw = "RangeError: too far\n    at one (/app/lib/one.js:1:1)\n    at node:fs:10:3\n    at two (file:///app/lib/two.js:2:2)\n    at /srv/three.js:3:3";
	let report = StackAssembler::new(Arc::new(InMemorySourceMaps::new()))
		.with_mode(Mode::Production)
		.with_renderer(FrameRenderer::new(Some(PathBuf::from("/app"))))
		.assemble_stack("RangeError", "too far", raw);

	assert_eq!(
		report.text,
		"RangeError: too far\n    at one (lib/one.js:1:1)\n    at two (lib/two.js:2:2)\n    at ../srv/three.js:3:3"
	);
}

#[test]
fn test_section_attribution_and_ignore_list() {
	let raw = "Error: render failed\n    at Page (/app/dist/bundle.js:1:1)\n    at renderWithHooks (/app/dist/bundle.js:6:1)";

	let report = assembler(Mode::Production).assemble_stack("Error", "render failed", raw);
	assert_eq!(report.text, "Error: render failed\n    at Page (src/page.tsx:1:0)");

	let report = assembler(Mode::Production)
		.with_show_ignore_listed(true)
		.assemble_stack("Error", "render failed", raw);
	assert_eq!(report.frame_count(), 2);
	assert!(report.text.contains("node_modules/react-dom/index.js:1:0"));
}

#[test]
fn test_bottom_frame_truncation() {
	let raw = "Error: boom\n    at foo (/app/dist/a.js:3:7)\n    at react-stack-bottom-frame (/app/dist/react.js:1:1)\n    at workLoop (/app/dist/react.js:2:1)";

	let report = assembler(Mode::Production).assemble_stack("Error", "boom", raw);
	assert_eq!(report.text, "Error: boom\n    at foo (src/a.ts:10:2)");
}

#[test]
fn test_method_name_falls_back_to_frame() {
	let mut store = InMemorySourceMaps::new();
	store
		.add_json(
			"/app/dist/c.js",
			r#"{"version": 3, "sources": ["src/c.ts"], "names": [], "mappings": "AAAA"}"#,
		)
		.unwrap();
	let store: Arc<dyn SourceMapStore> = Arc::new(store);
	let mut cache = SourceMapCache::new(store.as_ref());

	let frame = StackFrame::new("/app/dist/c.js", 1, 0).with_method("__WEBPACK_DEFAULT_EXPORT__");
	let resolved = cache.resolve(&frame, None).unwrap();
	assert_eq!(resolved.frame.frame.method_name.as_deref(), Some("default"));
}

#[test]
fn test_source_maps_found_on_disk() {
	let dir = TempDir::new().unwrap();
	let dist = dir.path().join("dist");
	std::fs::create_dir_all(&dist).unwrap();
	std::fs::write(dist.join("a.js"), "// compiled\n//# sourceMappingURL=a.js.map\n").unwrap();
	std::fs::write(dist.join("a.js.map"), A_JS_MAP).unwrap();

	let compiled = dist.join("a.js");
	let raw = format!("Error: boom\n    at foo ({}:3:7)", compiled.display());

	let report = StackAssembler::new(Arc::new(FsSourceMaps::new()))
		.with_mode(Mode::Production)
		.with_renderer(FrameRenderer::new(Some(dir.path().to_path_buf())))
		.assemble_stack("Error", "boom", &raw);

	assert_eq!(report.text, "Error: boom\n    at foo (src/a.ts:10:2)");
}

#[test]
fn test_cause_chain_through_node_hook() {
	let mut realm = ErrorRealm::new();
	patch_error_inspect_node(&mut realm, Arc::new(assembler(Mode::Production)));

	let inner = HostError::new("db down")
		.with_call_sites(vec![CallSite::new("/app/dist/a.js", 3, 7).with_function("foo")]);
	let outer = HostError::new("request failed")
		.with_name("FetchError")
		.with_call_sites(vec![
			CallSite::new("/app/dist/a.js", 3, 7).with_function("foo"),
			CallSite::new("node:internal/process/task_queues", 95, 5),
		])
		.with_cause(inner)
		.with_property("digest", json!("1893"));

	assert_eq!(
		inspect(&realm, &outer, &InspectOptions::default()),
		"FetchError: request failed\n    at foo (src/a.ts:10:2) {\n  digest: '1893',\n  [cause]: Error: db down\n      at foo (src/a.ts:10:2)\n}"
	);
}

#[test]
fn test_rebuilt_error_keeps_message_and_properties() {
	let realm = patched_realm(
		&InspectConfig {
			mode: Mode::Production,
			..InspectConfig::default()
		},
		store(),
	);
	let error = HostError::new("boom")
		.with_call_sites(vec![CallSite::new("/app/dist/a.js", 3, 7).with_function("foo")])
		.with_property("code", json!("E_BOOM"));

	let rebuilt = source_map_error(&assembler(Mode::Production), &realm, &error);
	assert_eq!(rebuilt.message, "boom");
	assert!(rebuilt.cause.is_none());
	assert_eq!(rebuilt.properties, error.properties);
	assert_eq!(rebuilt.stack_if_set(), Some("Error: boom\n    at foo (src/a.ts:10:2)"));
}

#[test]
fn test_config_file_drives_assembler() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("stack-inspect.toml");
	std::fs::write(
		&path,
		"mode = \"production\"\nshow_ignore_listed = true\nflavor = \"edge-lite\"\n",
	)
	.unwrap();

	let sources: Vec<Box<dyn ConfigSource>> =
		vec![Box::new(TomlSource::new(&path)), Box::new(DefaultsSource)];
	let config = load_config_from(sources).unwrap();
	assert_eq!(config.mode, Mode::Production);
	assert!(config.show_ignore_listed);
	assert_eq!(config.flavor, InspectFlavor::EdgeLite);

	let realm = patched_realm(&config, store());
	let error = HostError::new("boom").with_call_sites(vec![
		CallSite::new("/app/dist/a.js", 3, 7).with_function("foo"),
		CallSite::new("node:internal/x", 1, 1),
	]);

	let printed = format(&realm, &error);
	assert!(printed.starts_with("Error: boom\n    at foo (src/a.ts:10:2)\n"));
	assert!(printed.contains("node:internal/x:1:1"));
}

#[test]
fn test_install_is_once_per_process() {
	let config = InspectConfig {
		mode: Mode::Production,
		..InspectConfig::default()
	};
	assert!(install(&config, store()));
	assert!(!install(&config, Arc::new(InMemorySourceMaps::new())));

	let global = realm::global().unwrap();
	let error = HostError::new("boom")
		.with_call_sites(vec![CallSite::new("/app/dist/a.js", 3, 7).with_function("foo")]);
	let printed = inspect(global, &error, &InspectOptions::default());
	assert!(printed.starts_with("Error: boom\n    at foo (src/a.ts:10:2)"));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
	type Writer = CapturedLogs;

	fn make_writer(&'a self) -> Self::Writer {
		self.clone()
	}
}

#[test]
fn test_panicking_excerpt_renderer_is_logged_and_contained() {
	struct Panicking;

	impl loom_stack_symbolicate::CodeFrameRenderer for Panicking {
		fn render(&self, _: &loom_stack_core::ResolvedFrame, _: Option<&str>) -> Option<String> {
			panic!("excerpt renderer bug");
		}
	}

	let logs = CapturedLogs::default();
	let subscriber = tracing_subscriber::fmt()
		.with_writer(logs.clone())
		.with_ansi(false)
		.with_max_level(tracing::Level::WARN)
		.finish();

	let report = tracing::subscriber::with_default(subscriber, || {
		assembler(Mode::Development)
			.with_code_frames(Arc::new(Panicking))
			.assemble_stack("Error", "boom", "Error: boom\n    at foo (/app/dist/a.js:3:7)")
	});

	assert_eq!(report.text, "Error: boom\n    at foo (dist/a.js:3:7)");
	let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
	assert!(logs.contains("source mapping a frame panicked"));
}

#[test]
fn test_frame_before_first_section_is_raw_and_warned() {
	let mut store = InMemorySourceMaps::new();
	store
		.add_json(
			"/app/dist/late.js",
			r#"{"version": 3, "sections": [{"offset": {"line": 4, "column": 0}, "map": {"version": 3, "sources": ["src/late.ts"], "names": [], "mappings": "AAAA"}}]}"#,
		)
		.unwrap();

	let logs = CapturedLogs::default();
	let subscriber = tracing_subscriber::fmt()
		.with_writer(logs.clone())
		.with_ansi(false)
		.with_max_level(tracing::Level::WARN)
		.finish();

	let report = tracing::subscriber::with_default(subscriber, || {
		StackAssembler::new(Arc::new(store))
			.with_mode(Mode::Development)
			.with_renderer(FrameRenderer::new(Some(PathBuf::from("/app"))))
			.assemble_stack("Error", "boom", "Error: boom\n    at foo (/app/dist/late.js:1:0)")
	});

	assert_eq!(report.text, "Error: boom\n    at foo (dist/late.js:1:0)");
	assert!(report.best_code_excerpt.is_none());
	let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
	assert!(logs.contains("WARN"));
	assert!(logs.contains("No applicable source map section"));
}
