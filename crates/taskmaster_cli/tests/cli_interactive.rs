use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn run_interactive(data_dir: &Path, input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_taskmaster"))
        .env("TASKMASTER_DATA_DIR", data_dir)
        .env("TASKMASTER_CONFIG_PATH", data_dir.join("config.json"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    child
        .wait_with_output()
        .expect("failed to read interactive output")
}

fn stored(data_dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(data_dir.join("todos.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn interactive_help_shows_usage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(dir.path(), "help\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
}

#[test]
fn interactive_invalid_command_prints_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(dir.path(), "nope\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn interactive_scenario_add_toggle_filter() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(
        dir.path(),
        "add \"Buy milk\"\nadd \"Pay bills\" --due 2025-01-01\ntoggle 1\nfilter active\nlist --json\nexit\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let listing = stdout.lines().last().unwrap();
    let value: serde_json::Value = serde_json::from_str(listing).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            { "position": 2, "text": "Pay bills", "completed": false, "dueDate": "2025-01-01" }
        ])
    );
}

#[test]
fn interactive_edit_flow_commits_draft() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(
        dir.path(),
        "add \"Buy milk\"\nedit 1\ndraft \"Buy oat milk\"\nupdate\nexit\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Editing task 1: Buy milk"));
    assert!(stdout.contains("Updated task 1: Buy oat milk"));
    assert_eq!(stored(dir.path())[0]["text"], "Buy oat milk");
}

#[test]
fn interactive_add_is_suppressed_while_editing() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(dir.path(), "add one\nedit 1\nadd two\nexit\n");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task 1 is being edited"));
    assert_eq!(stored(dir.path()).as_array().map(Vec::len), Some(1));
}

#[test]
fn interactive_edit_switch_abandons_previous_draft() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(
        dir.path(),
        "add one\nadd two\nedit 1\ndraft lost\nedit 2\nupdate\nexit\n",
    );

    assert!(output.status.success());
    assert_eq!(
        stored(dir.path()),
        serde_json::json!([
            { "text": "one", "completed": false, "dueDate": "" },
            { "text": "two", "completed": false, "dueDate": "" }
        ])
    );
}

#[test]
fn interactive_theme_toggles_without_persisting() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(dir.path(), "add one\ntheme\ntheme\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Display mode: \x1b[38;5;208mdark\x1b[0m"));
    assert!(stdout.contains("Display mode: light"));
    assert!(!std::fs::read_to_string(dir.path().join("todos.json")).unwrap().contains("dark"));
}
