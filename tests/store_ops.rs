use std::fs;

use tempfile::TempDir;
use toolsmith::{FunctionStore, StoreConfig, ToolFunction, ToolsmithError};

fn config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        tools_file: dir.path().join("tool_functions.rs"),
        ..StoreConfig::default()
    }
}

#[tokio::test]
async fn full_lifecycle_over_the_store() {
    let dir = TempDir::new().unwrap();
    let store = FunctionStore::spawn(config(&dir)).unwrap();

    assert!(store.list().await.unwrap().is_empty());

    let created = store
        .create("add", "fn add(a: i64, b: i64) -> i64 { a + b }")
        .await
        .unwrap();
    assert_eq!(created.name, "add");
    assert_eq!(store.list().await.unwrap(), vec!["add"]);

    store
        .update("add", "fn add(a: i64, b: i64) -> i64 { a - b }")
        .await
        .unwrap();
    let read = store.read("add").await.unwrap();
    assert!(read.code.contains("a - b"));
    assert!(!read.code.contains("a + b"));

    store.delete("add").await.unwrap();
    assert!(store.list().await.unwrap().is_empty());
    assert!(matches!(
        store.read("add").await,
        Err(ToolsmithError::NotFound { .. })
    ));
}

#[tokio::test]
async fn backing_file_stays_valid_and_keeps_its_preamble() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir);
    let path = cfg.tools_file.clone();
    let store = FunctionStore::spawn(cfg).unwrap();

    let initial = fs::read_to_string(&path).unwrap();
    assert!(initial.starts_with("// Tool functions managed by toolsmith."));

    store
        .create("greet", "fn greet(name: &str) -> String { format!(\"hi {name}\") }")
        .await
        .unwrap();
    store
        .create("shout", "fn shout(name: &str) -> String { name.to_uppercase() }")
        .await
        .unwrap();
    store.delete("greet").await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("// Tool functions managed by toolsmith."));
    assert!(content.contains("fn shout"));
    assert!(!content.contains("fn greet"));

    // A fresh store over the same file must still parse it.
    let reopened = FunctionStore::spawn(config_at(&path)).unwrap();
    assert_eq!(reopened.list().await.unwrap(), vec!["shout"]);
}

fn config_at(path: &std::path::Path) -> StoreConfig {
    StoreConfig {
        tools_file: path.to_path_buf(),
        ..StoreConfig::default()
    }
}

#[tokio::test]
async fn rejected_requests_do_not_mutate() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir);
    let path = cfg.tools_file.clone();
    let store = FunctionStore::spawn(cfg).unwrap();

    store
        .create("add", "fn add(a: i64, b: i64) -> i64 { a + b }")
        .await
        .unwrap();
    let before = fs::read(&path).unwrap();

    assert!(matches!(
        store.create("add", "fn add() {}").await,
        Err(ToolsmithError::AlreadyExists { .. })
    ));
    assert!(matches!(
        store.create("two", "fn a() {}\n\nfn b() {}").await,
        Err(ToolsmithError::InvalidDefinition { .. })
    ));
    assert!(matches!(
        store.create("minus", "fn add() {}").await,
        Err(ToolsmithError::NameMismatch { .. })
    ));
    assert!(matches!(
        store.update("missing", "fn missing() {}").await,
        Err(ToolsmithError::NotFound { .. })
    ));

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn tool_function_moves_over_json() {
    let original = ToolFunction {
        name: "add".to_string(),
        code: "fn add(a: i64, b: i64) -> i64 { a + b }".to_string(),
    };

    let json = serde_json::to_string(&original).unwrap();
    let back: ToolFunction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}
