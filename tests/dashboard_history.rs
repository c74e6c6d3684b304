//! Dashboard history walkthroughs
//!
//! Drives the public `verso` API the way a dashboard service would: create,
//! edit, inspect history, diff, roll back, restart.

use serde_json::json;
use tempfile::TempDir;
use verso::{
    ChangeKind, DiffMode, DocumentId, ErrorKind, OrgId, SaveCommand, Value, VersionNumber,
    VersionStore,
};

fn v(n: u64) -> VersionNumber {
    VersionNumber::new(n)
}

fn dashboard(title: &str, tags: &[&str], panels: serde_json::Value) -> Value {
    Value::from(json!({
        "title": title,
        "tags": tags,
        "schemaVersion": 39,
        "panels": panels,
    }))
}

#[test]
fn edit_history_of_one_dashboard() {
    let store = VersionStore::ephemeral();
    let org = OrgId::new(1);
    let doc = DocumentId::new();

    let v1 = store
        .save(
            SaveCommand::new(doc, org, dashboard("A", &["x"], json!([])))
                .by("alice")
                .with_message("initial"),
        )
        .unwrap();
    let v2 = store
        .save(
            SaveCommand::new(doc, org, dashboard("A", &["y"], json!([])))
                .overwrite()
                .by("alice"),
        )
        .unwrap();
    assert_eq!((v1, v2), (v(1), v(2)));

    let history = store.list_versions(doc, org).unwrap();
    assert_eq!(history.version_numbers(), vec![v(2), v(1)]);
    assert_eq!(history.oldest().message(), Some("initial"));
    assert_eq!(history.latest().title(), "A");

    let delta = store
        .compare(doc, org, v(1), v(2), DiffMode::Structural)
        .unwrap();
    assert_eq!(delta.len(), 1);
    assert_eq!(delta.changes()[0].path.to_string(), "tags[0]");
    assert_eq!(delta.changes()[0].kind, ChangeKind::Modified);

    let lines = store.compare(doc, org, v(1), v(2), DiffMode::Lines).unwrap();
    assert_eq!(
        lines.render(),
        "-     \"x\"\n+     \"y\"\n"
    );
}

#[test]
fn stale_editor_is_told_to_reload() {
    let store = VersionStore::ephemeral();
    let org = OrgId::new(1);
    let doc = DocumentId::new();
    store
        .save(SaveCommand::new(doc, org, dashboard("Ops", &[], json!([]))))
        .unwrap();

    // Two editors open version 1; the first one saves.
    store
        .save(SaveCommand::new(doc, org, dashboard("Ops", &["a"], json!([]))).expecting(v(1)))
        .unwrap();
    let err = store
        .save(SaveCommand::new(doc, org, dashboard("Ops", &["b"], json!([]))).expecting(v(1)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.is_retryable());

    // Saving over the newer version is allowed explicitly.
    let forced = store
        .save(SaveCommand::new(doc, org, dashboard("Ops", &["b"], json!([]))).overwrite())
        .unwrap();
    assert_eq!(forced, v(3));
}

#[test]
fn roll_back_and_restart() {
    let dir = TempDir::new().unwrap();
    let org = OrgId::new(7);
    let doc = DocumentId::new();

    {
        let store = VersionStore::open(dir.path()).unwrap();
        store
            .save(SaveCommand::new(
                doc,
                org,
                dashboard("Latency", &["prod"], json!([{"id": 1, "type": "graph"}])),
            ))
            .unwrap();
        store
            .save(
                SaveCommand::new(
                    doc,
                    org,
                    dashboard("Latency v2", &["prod"], json!([{"id": 1, "type": "table"}, {"id": 2}])),
                )
                .overwrite(),
            )
            .unwrap();

        let delta = store
            .compare(doc, org, v(1), v(2), DiffMode::Structural)
            .unwrap();
        let paths: Vec<_> = delta.changes().iter().map(|c| c.path.to_string()).collect();
        assert_eq!(paths, vec!["panels[0].type", "panels[1]", "title"]);

        let restored = store.restore(doc, org, v(1), "alice").unwrap();
        assert_eq!(restored, v(3));
    }

    let store = VersionStore::open(dir.path()).unwrap();
    let latest = store.latest(doc, org).unwrap();
    assert_eq!(latest.version(), v(3));
    assert_eq!(latest.restored_from(), Some(v(1)));
    assert_eq!(latest.message(), Some("Restored from version 1"));
    assert_eq!(store.document(doc, org).unwrap().title, "Latency");
    assert!(store
        .compare(doc, org, v(1), v(3), DiffMode::Structural)
        .unwrap()
        .is_empty());

    let next = store
        .save(SaveCommand::new(doc, org, dashboard("Latency", &[], json!([]))).expecting(v(3)))
        .unwrap();
    assert_eq!(next, v(4));
}

#[test]
fn tenants_do_not_see_each_other() {
    let store = VersionStore::ephemeral();
    let (acme, globex) = (OrgId::new(1), OrgId::new(2));
    let doc = DocumentId::new();
    store
        .save(SaveCommand::new(doc, acme, dashboard("Acme", &[], json!([]))))
        .unwrap();

    assert!(store.document(doc, globex).is_none());
    assert!(store.get_version(doc, globex, v(1)).unwrap_err().is_not_found());
    assert!(store.list_versions(doc, globex).unwrap_err().is_not_found());
    assert!(store.latest(doc, globex).unwrap_err().is_not_found());
}
