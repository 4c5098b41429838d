//! CLI tests: run the `kgraph` binary against a throwaway store

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kgraph(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kgraph").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("KGRAPH_CONFIG")
        .env_remove("RUST_LOG")
        .env("KGRAPH_DATABASE", dir.path().join("graph.db"));
    cmd
}

const ENTITIES: &str = r#"{"entities": [
    {"name": "Alice", "entityType": "person", "observations": ["likes coffee"]},
    {"name": "Acme", "entityType": "company"}
]}"#;

#[test]
fn test_init_creates_store() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("kgraph").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("KGRAPH_DATABASE")
        .env_remove("KGRAPH_CONFIG")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized kgraph store"));

    assert!(dir.path().join(".kgraph/config.toml").exists());
    assert!(dir.path().join(".kgraph/graph.db").exists());

    // Second init without --force is refused
    let mut again = Command::cargo_bin("kgraph").unwrap();
    again
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a kgraph store"));
}

#[test]
fn test_call_create_then_read() {
    let dir = TempDir::new().unwrap();

    kgraph(&dir)
        .args(["call", "create_entities", ENTITIES])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"created\""))
        .stdout(predicate::str::contains("Alice"));

    let output = kgraph(&dir)
        .args(["call", "read_graph", "--compact"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["entities"].as_array().unwrap().len(), 2);
    assert_eq!(graph["entities"][0]["entityType"], "person");
    assert_eq!(graph["entities"][0]["observations"][0], "likes coffee");
}

#[test]
fn test_call_reads_payload_from_stdin() {
    let dir = TempDir::new().unwrap();

    kgraph(&dir)
        .args(["call", "create_entities", "-"])
        .write_stdin(ENTITIES)
        .assert()
        .success();

    kgraph(&dir)
        .args(["call", "delete_entities", "-"])
        .write_stdin(r#"{"entityNames": ["Acme", "Ghost"]}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ghost"));
}

#[test]
fn test_search_json() {
    let dir = TempDir::new().unwrap();
    kgraph(&dir)
        .args(["call", "create_entities", ENTITIES])
        .assert()
        .success();

    let output = kgraph(&dir)
        .args(["search", "COFFEE", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entities = graph["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["name"], "Alice");
}

#[test]
fn test_graph_table_output() {
    let dir = TempDir::new().unwrap();

    kgraph(&dir)
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("No entities found."));

    kgraph(&dir)
        .args(["call", "create_entities", ENTITIES])
        .assert()
        .success();

    kgraph(&dir)
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("company"));
}

#[test]
fn test_stats_json() {
    let dir = TempDir::new().unwrap();
    kgraph(&dir)
        .args(["call", "create_entities", ENTITIES])
        .assert()
        .success();

    let output = kgraph(&dir).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["entities"], 2);
    assert_eq!(stats["relations"], 0);
    assert_eq!(stats["observations"], 1);
}

#[test]
fn test_invalid_payload_exits_2() {
    let dir = TempDir::new().unwrap();

    kgraph(&dir)
        .args(["call", "create_entities", "{not json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid argument"));

    kgraph(&dir)
        .args(["call", "create_entities", r#"{"entities": [{"name": "", "entityType": "t"}]}"#])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("entities[0].name"));
}

#[test]
fn test_unknown_operation_exits_2() {
    let dir = TempDir::new().unwrap();

    kgraph(&dir)
        .args(["call", "drop_everything"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown operation: drop_everything"));
}

#[test]
fn test_config_shows_database_override() {
    let dir = TempDir::new().unwrap();

    kgraph(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("graph.db"))
        .stdout(predicate::str::contains("busy_timeout_ms"));
}
