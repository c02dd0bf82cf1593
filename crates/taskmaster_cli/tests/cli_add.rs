use std::path::Path;
use std::process::{Command, Output};

fn run(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskmaster"))
        .args(args)
        .env("TASKMASTER_DATA_DIR", data_dir)
        .env("TASKMASTER_CONFIG_PATH", data_dir.join("config.json"))
        .env_remove("TASKMASTER_LOG")
        .output()
        .expect("failed to run taskmaster")
}

fn stored(data_dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(data_dir.join("todos.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn add_command_appends_task() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "Buy milk"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task 1: Buy milk"));
    assert_eq!(
        stored(dir.path()),
        serde_json::json!([{ "text": "Buy milk", "completed": false, "dueDate": "" }])
    );
}

#[test]
fn add_command_records_due_date() {
    let dir = tempfile::tempdir().unwrap();
    run(dir.path(), &["add", "Buy milk"]);

    let output = run(dir.path(), &["add", "Pay bills", "--due", "2025-01-01"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task 2: Pay bills (due 2025-01-01)"));
    assert_eq!(stored(dir.path())[1]["dueDate"], "2025-01-01");
}

#[test]
fn add_command_ignores_blank_text() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "   "]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nothing added"));
    assert!(!dir.path().join("todos.json").exists());
}

#[test]
fn add_command_rejects_malformed_due_date() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "Pay bills", "--due", "tomorrow"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(!dir.path().join("todos.json").exists());
}

#[test]
fn add_command_json_output() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "Pay bills", "--due", "2025-01-01", "--json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "position": 1,
            "text": "Pay bills",
            "completed": false,
            "dueDate": "2025-01-01"
        })
    );
}

#[test]
fn malformed_store_is_replaced_on_next_add() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todos.json"), "not json at all").unwrap();

    let output = run(dir.path(), &["add", "Fresh start"]);

    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stored(dir.path()),
        serde_json::json!([{ "text": "Fresh start", "completed": false, "dueDate": "" }])
    );
}
