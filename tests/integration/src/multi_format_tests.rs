//! Synchronization across document formats
//!
//! The filesystem store picks each document's encoding by extension, with
//! content sniffing on the read side. These tests drive one engine over
//! mixed JSON, YAML, and TOML documents and pin down per-format failure
//! isolation.

use std::path::Path;

use lockstep_core::{SyncEngine, WatchStatus};
use lockstep_doc::Format;
use lockstep_fs::{FsDocumentStore, Handle};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn write_text(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn read_as(dir: &Path, name: &str, format: Format) -> Value {
    format
        .parse(&std::fs::read_to_string(dir.join(name)).unwrap())
        .unwrap()
}

fn engine_rooted(dir: &Path, base: &str) -> SyncEngine {
    SyncEngine::new(Box::new(FsDocumentStore::rooted(dir)), base).unwrap()
}

#[test]
fn yaml_base_drives_json_and_toml_dependents() {
    init_logging();
    let temp = TempDir::new().unwrap();
    write_text(
        temp.path(),
        "catalog.yml",
        "service:\n  name: api\n  port: 8080\nlimits:\n  rate: 100\n",
    );
    write_text(
        temp.path(),
        "mirror.json",
        &serde_json::to_string_pretty(&json!({
            "service": {"name": "api-mirror", "port": 9090},
            "limits": {"rate": 250}
        }))
        .unwrap(),
    );
    write_text(
        temp.path(),
        "mirror.toml",
        "[service]\nname = \"api-eu\"\nport = 8081\n\n[limits]\nrate = 50\n",
    );

    let mut engine = engine_rooted(temp.path(), "catalog.yml");
    assert_eq!(engine.add_watch("mirror.json"), WatchStatus::Watched);
    assert_eq!(engine.add_watch("mirror.toml"), WatchStatus::Watched);

    // Rename one leaf, add another.
    engine.delete("limits/rate").unwrap();
    engine.set("limits/per_minute", json!(100)).unwrap();
    engine.set("service/timeout", json!(30)).unwrap();

    let diff = engine.monitor();
    assert_eq!(
        diff.moved.get("limits/rate").map(String::as_str),
        Some("limits/per_minute")
    );
    assert_eq!(diff.added.len(), 1);

    let report = engine.apply_changes();
    assert!(report.is_clean());
    assert_eq!(report.synced.len(), 2);

    // The rename carried each mirror's own rate along; the new leaf was
    // seeded from the base.
    assert_eq!(
        read_as(temp.path(), "mirror.json", Format::Json),
        json!({
            "service": {"name": "api-mirror", "port": 9090, "timeout": 30},
            "limits": {"per_minute": 250}
        })
    );
    assert_eq!(
        read_as(temp.path(), "mirror.toml", Format::Toml),
        json!({
            "service": {"name": "api-eu", "port": 8081, "timeout": 30},
            "limits": {"per_minute": 50}
        })
    );

    engine.save().unwrap();
    assert_eq!(
        read_as(temp.path(), "catalog.yml", Format::Yaml),
        json!({
            "service": {"name": "api", "port": 8080, "timeout": 30},
            "limits": {"per_minute": 100}
        })
    );
}

#[test]
fn null_addition_desyncs_only_the_toml_dependent() {
    init_logging();
    let temp = TempDir::new().unwrap();
    write_text(temp.path(), "base.json", "{\"feature\": {\"enabled\": true}}\n");
    write_text(temp.path(), "copy.json", "{\"feature\": {\"enabled\": false}}\n");
    write_text(temp.path(), "copy.toml", "[feature]\nenabled = true\n");

    let mut engine = engine_rooted(temp.path(), "base.json");
    assert_eq!(engine.add_watch("copy.json"), WatchStatus::Watched);
    assert_eq!(engine.add_watch("copy.toml"), WatchStatus::Watched);

    // JSON carries null; TOML cannot render it.
    engine.set("feature/flag", json!(null)).unwrap();
    engine.monitor();
    let report = engine.apply_changes();

    assert_eq!(report.synced, vec![Handle::new("copy.json")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].handle, Handle::new("copy.toml"));
    assert!(report.failed[0].reason.contains("null"));
    assert!(engine.desynced().contains(&Handle::new("copy.toml")));

    assert_eq!(
        read_as(temp.path(), "copy.json", Format::Json),
        json!({"feature": {"enabled": false, "flag": null}})
    );
    // The failed render never touched the file.
    assert_eq!(
        read_as(temp.path(), "copy.toml", Format::Toml),
        json!({"feature": {"enabled": true}})
    );

    // Later passes skip the desynced document.
    engine.set("feature/level", json!(3)).unwrap();
    engine.monitor();
    let report = engine.apply_changes();
    assert_eq!(report.synced, vec![Handle::new("copy.json")]);
    assert!(report.is_clean());
}

#[test]
fn extensionless_dependent_reads_by_sniffing_but_cannot_persist() {
    init_logging();
    let temp = TempDir::new().unwrap();
    write_text(temp.path(), "base.json", "{\"k\": 1}\n");
    write_text(temp.path(), "scratch", "{\"k\": 2}\n");

    let mut engine = engine_rooted(temp.path(), "base.json");
    // Reading sniffs JSON from the content, so admission succeeds.
    assert_eq!(engine.add_watch("scratch"), WatchStatus::Watched);

    engine.set("k2", json!(5)).unwrap();
    engine.monitor();
    let report = engine.apply_changes();

    // Writing has no content to sniff; the handle needs a real extension.
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].handle, Handle::new("scratch"));
    assert!(report.failed[0].reason.contains("format"));
    assert!(engine.desynced().contains(&Handle::new("scratch")));

    // The original file is untouched.
    assert_eq!(read_as(temp.path(), "scratch", Format::Json), json!({"k": 2}));
}
