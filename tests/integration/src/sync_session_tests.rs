//! End-to-end synchronization sessions over real files
//!
//! Drives the full vertical slice: filesystem storage, base editing through
//! the engine, drift classification, replay onto dependents, and the base
//! ledger's account of the session.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use lockstep_core::{ChangeKind, EngineConfig, SyncEngine, WatchStatus};
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

fn write_json(dir: &Path, name: &str, value: &Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(dir: &Path, name: &str) -> Value {
    serde_json::from_str(&std::fs::read_to_string(dir.join(name)).unwrap()).unwrap()
}

fn engine_rooted(dir: &Path, base: &str) -> SyncEngine {
    SyncEngine::new(Box::new(FsDocumentStore::rooted(dir)), base).unwrap()
}

#[test]
fn catalog_session_flows_from_edits_to_files_and_ledger() {
    init_logging();
    let temp = TempDir::new().unwrap();
    write_json(
        temp.path(),
        "en.json",
        &json!({"forms": {"login": {"title": "Sign in", "hint": "Email"}}}),
    );
    write_json(
        temp.path(),
        "es.json",
        &json!({"forms": {"login": {"title": "Iniciar sesión", "hint": "Correo"}}}),
    );
    write_json(
        temp.path(),
        "alien.json",
        &json!({"forms": {"login": {"title": "x"}}, "extra": 1}),
    );
    let alien_before = read_json(temp.path(), "alien.json");

    let mut engine = engine_rooted(temp.path(), "en.json");

    // Record every base change the session makes.
    let log: Rc<RefCell<Vec<(ChangeKind, String)>>> = Rc::default();
    let sink = Rc::clone(&log);
    engine
        .base_mut()
        .observe(move |entry| sink.borrow_mut().push((entry.kind(), entry.path.clone())));

    assert_eq!(engine.add_watch("es.json"), WatchStatus::Watched);
    assert_eq!(engine.add_watch("alien.json"), WatchStatus::Desynced);

    // Wave one: a new key appears and propagates as a placeholder.
    engine.set("forms/login/submit", json!("Continue")).unwrap();
    let diff = engine.monitor();
    assert_eq!(diff.added.len(), 1);
    let report = engine.apply_changes();
    assert_eq!(report.synced, vec![Handle::new("es.json")]);

    let es = read_json(temp.path(), "es.json");
    assert_eq!(es["forms"]["login"]["submit"], json!("Continue"));
    assert_eq!(es["forms"]["login"]["title"], json!("Iniciar sesión"));

    // Wave two: rewording a value is not structural drift; dependents keep
    // their own text and nothing is written.
    engine
        .set("forms/login/title", json!("Sign in, please"))
        .unwrap();
    assert!(engine.monitor().is_empty());
    let report = engine.apply_changes();
    assert!(report.synced.is_empty() && report.is_clean());

    // Wave three: the title moves to a new section and the hint is retired.
    engine.delete("forms/login/title").unwrap();
    engine.set("auth/title", json!("Sign in, please")).unwrap();
    engine.delete("forms/login/hint").unwrap();

    let diff = engine.monitor();
    assert_eq!(
        diff.moved.get("forms/login/title").map(String::as_str),
        Some("auth/title")
    );
    assert_eq!(diff.removed.len(), 1);
    assert!(engine.apply_changes().is_clean());

    // The translation followed the structure but kept its own strings.
    assert_eq!(
        read_json(temp.path(), "es.json"),
        json!({"forms": {"login": {"submit": "Continue"}}, "auth": {"title": "Iniciar sesión"}})
    );

    // The desynced document was never touched.
    assert_eq!(read_json(temp.path(), "alien.json"), alien_before);
    assert_eq!(engine.watched().len(), 1);
    assert_eq!(engine.desynced().len(), 1);

    // The base persists only on save.
    engine.save().unwrap();
    assert_eq!(
        read_json(temp.path(), "en.json"),
        json!({"forms": {"login": {"submit": "Continue"}}, "auth": {"title": "Sign in, please"}})
    );

    // Observers and the ledger agree on the session's history.
    let expected = [
        (ChangeKind::Created, "forms/login/submit"),
        (ChangeKind::Updated, "forms/login/title"),
        (ChangeKind::Removed, "forms/login/title"),
        (ChangeKind::Created, "auth/title"),
        (ChangeKind::Removed, "forms/login/hint"),
    ];
    let seen = log.borrow().clone();
    assert_eq!(seen.len(), expected.len());
    for ((kind, path), (expected_kind, expected_path)) in seen.iter().zip(expected) {
        assert_eq!((*kind, path.as_str()), (expected_kind, expected_path));
    }
    assert_eq!(engine.ledger().len(), expected.len());

    // Per-path history chains fingerprints across the update and removal.
    let title = engine.ledger().entries_for("forms/login/title");
    assert_eq!(title.len(), 2);
    assert_eq!(title[0].kind(), ChangeKind::Updated);
    assert_eq!(title[1].kind(), ChangeKind::Removed);
    assert_eq!(title[0].new, title[1].previous);

    // The session is drained: one more pass observes and applies nothing.
    assert!(engine.monitor().is_empty());
    assert!(engine.apply_changes().synced.is_empty());
}

#[test]
fn external_dependent_edits_survive_the_document_cache() {
    init_logging();
    let temp = TempDir::new().unwrap();
    write_json(temp.path(), "base.json", &json!({"strings": {"hello": "Hello"}}));
    write_json(temp.path(), "de.json", &json!({"strings": {"hello": "Hallo"}}));

    let mut engine = engine_rooted(temp.path(), "base.json");
    assert_eq!(engine.add_watch("de.json"), WatchStatus::Watched);

    // The admission read is cached. A translator edits the file afterwards;
    // the staleness check must pick the edit up instead of replaying the
    // cached copy over it.
    std::thread::sleep(std::time::Duration::from_millis(50));
    write_json(temp.path(), "de.json", &json!({"strings": {"hello": "Hallo!"}}));

    engine.set("strings/bye", json!("Bye")).unwrap();
    engine.monitor();
    assert!(engine.apply_changes().is_clean());

    assert_eq!(
        read_json(temp.path(), "de.json"),
        json!({"strings": {"hello": "Hallo!", "bye": "Bye"}})
    );
}

#[test]
fn masked_metadata_is_invisible_to_the_whole_session() {
    init_logging();
    let temp = TempDir::new().unwrap();
    write_json(
        temp.path(),
        "base.json",
        &json!({"app": {"name": "demo"}, "meta": {"exported": "2024-01-01"}}),
    );
    write_json(temp.path(), "fr.json", &json!({"app": {"name": "démo"}}));

    let config = EngineConfig {
        ignore_masks: vec!["meta/*".to_string()],
        ..EngineConfig::default()
    };
    let mut engine = SyncEngine::with_config(
        Box::new(FsDocumentStore::rooted(temp.path())),
        "base.json",
        config,
    )
    .unwrap();

    // fr.json has no meta block at all, yet admission sees equal shapes.
    assert_eq!(engine.add_watch("fr.json"), WatchStatus::Watched);

    // Metadata churn never classifies.
    engine.set("meta/exported", json!("2024-02-02")).unwrap();
    engine.set("meta/run", json!(7)).unwrap();
    assert!(engine.monitor().is_empty());

    // Real drift still flows.
    engine.set("app/version", json!("1.1.0")).unwrap();
    engine.monitor();
    assert!(engine.apply_changes().is_clean());

    assert_eq!(
        read_json(temp.path(), "fr.json"),
        json!({"app": {"name": "démo", "version": "1.1.0"}})
    );

    // Masks hide paths from synchronization, not from the base document.
    engine.save().unwrap();
    let base = read_json(temp.path(), "base.json");
    assert_eq!(base["meta"]["run"], json!(7));
}
