use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskchat-{nanos}-{file_name}"))
}

fn run(args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_taskchat");
    let config_path = temp_path("cli-run-missing-config.json");
    Command::new(exe)
        .args(args)
        .env("TASKCHAT_CONFIG_PATH", &config_path)
        .output()
        .expect("failed to run taskchat")
}

#[test]
fn run_prints_transcript_with_replies() {
    let output = run(&["run", "add buy milk", "add walk dog", "complete 1", "list"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("assistant: Hello! I'm your Task Master."));
    assert!(stdout.contains("you: add buy milk"));
    assert!(stdout.contains("assistant: Added \"buy milk\" to your tasks!"));
    assert!(stdout.contains("assistant: Marked \"buy milk\" as completed!"));
    assert!(stdout.contains("You have 2 tasks:\n1. buy milk - ✓ Completed\n2. walk dog - ○ Pending"));
}

#[test]
fn run_json_reports_messages_tasks_and_summary() {
    let output = run(&["--json", "run", "add buy milk", "add walk dog", "delete 2", "hello"]);
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tasks = payload["tasks"].as_array().expect("tasks array");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "buy milk");
    assert_eq!(tasks[0]["completed"], false);

    let messages = payload["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 9);
    assert_eq!(messages[0]["role"], "assistant");
    assert_eq!(messages[7]["role"], "user");
    assert_eq!(
        messages[8]["content"],
        "I understood: \"hello\". You can ask me to add, complete, delete, or list your tasks!"
    );

    assert_eq!(payload["summary"]["total"], 1);
    assert_eq!(payload["summary"]["completed"], 0);
}

#[test]
fn run_skips_blank_messages() {
    let output = run(&["--json", "run", "   ", "list"]);
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let messages = payload["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2]["content"], "You have no tasks yet. Add some tasks!");
}

#[test]
fn run_expands_aliases_from_overrides() {
    let output = run(&[
        "--json",
        "--config-override",
        "aliases.ls=list",
        "run",
        "add buy milk",
        "ls",
    ]);
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let messages = payload["messages"].as_array().expect("messages array");
    assert_eq!(messages[3]["content"], "list");
    assert_eq!(
        messages[4]["content"],
        "You have 1 tasks:\n1. buy milk - ○ Pending"
    );
}

#[test]
fn run_rejects_invalid_override() {
    let output = run(&["--config-override", "reply_delay_ms=later", "run", "list"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn run_requires_a_message() {
    let output = run(&["run"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn classify_prints_intent_name() {
    let output = run(&["classify", "add this to my list"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "add");

    let output = run(&["--json", "classify", "what now"]);
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["intent"], "unknown");
    assert_eq!(payload["input"], "what now");
}

#[test]
fn invalid_config_file_falls_back_to_defaults() {
    let exe = env!("CARGO_BIN_EXE_taskchat");
    let config_path = temp_path("cli-run-invalid-config.json");
    std::fs::write(&config_path, "{ not json").unwrap();

    let output = Command::new(exe)
        .args(["run", "list"])
        .env("TASKCHAT_CONFIG_PATH", &config_path)
        .output()
        .expect("failed to run taskchat");
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("You have no tasks yet. Add some tasks!"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"));
}
