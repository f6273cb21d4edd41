//! Basic usage example for lockstep-core

use lockstep_core::SyncEngine;
use lockstep_fs::FsDocumentStore;
use serde_json::json;

fn main() -> lockstep_core::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("en.json"),
        r#"{"menu": {"open": "Open", "close": "Close"}}"#,
    )?;
    std::fs::write(
        dir.path().join("de.json"),
        r#"{"menu": {"open": "Öffnen", "close": "Schließen"}}"#,
    )?;

    // The base document is the structural authority.
    let store = FsDocumentStore::rooted(dir.path());
    let mut engine = SyncEngine::new(Box::new(store), "en.json")?;
    println!("Watching de.json: {:?}", engine.add_watch("de.json"));

    // Edit the base: add one key, rename another.
    engine.set("menu/save", json!("Save"))?;
    engine.delete("menu/close")?;
    engine.set("menu/dismiss", json!("Close"))?;

    // Classify the drift since the last pass.
    let diff = engine.monitor();
    println!("Added: {:?}", diff.added);
    println!("Moved: {:?}", diff.moved);

    // Replay it onto every watched dependent.
    let report = engine.apply_changes();
    println!("Synced: {:?}", report.synced);

    // The translation followed the rename but kept its own text.
    let german = std::fs::read_to_string(dir.path().join("de.json"))?;
    println!("\nde.json:\n{german}");

    // The ledger remembers every base change.
    println!("Ledger:");
    for entry in engine.ledger().entries() {
        println!("  {:?} {}", entry.kind(), entry.path);
    }

    Ok(())
}
