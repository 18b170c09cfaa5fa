use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskchat-{nanos}-{file_name}"))
}

fn run_interactive(input: &str) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_taskchat");
    let config_path = temp_path("cli-interactive-config.json");

    let mut child = Command::new(exe)
        .env("TASKCHAT_CONFIG_PATH", &config_path)
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

#[test]
fn interactive_greets_and_exits() {
    let output = run_interactive("exit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("How can I help you manage your tasks today?"));
}

#[test]
fn interactive_help_shows_usage() {
    for input in ["help\nexit\n", "?\nquit\n"] {
        let output = run_interactive(input);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Usage"));
    }
}

#[test]
fn interactive_commands_share_one_task_collection() {
    let output = run_interactive("add buy milk\nadd walk dog\ndelete 1\nlist\nexit\n");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added \"walk dog\" to your tasks!"));
    assert!(stdout.contains("Deleted \"buy milk\" from your tasks."));
    assert!(stdout.contains("You have 1 tasks:\n1. walk dog - ○ Pending"));
}

#[test]
fn interactive_blank_lines_are_ignored() {
    let output = run_interactive("\n   \nlist\n");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("assistant:").count(), 2);
}

#[test]
fn interactive_unknown_input_is_echoed() {
    let output = run_interactive("what's the weather\nexit\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("I understood: \"what's the weather\"."));
}

#[test]
fn interactive_task_table_and_toggle() {
    let output = run_interactive("add buy milk\n/tasks\n/toggle missing\n/history\nexit\n");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("buy milk"));
    assert!(stdout.contains("pending"));
    assert!(stdout.contains("Tasks: 1 | Completed: 0"));
    assert!(stdout.contains("you: add buy milk"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task not found"));
}

#[test]
fn interactive_unknown_slash_command_prints_error() {
    let output = run_interactive("/nope\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unknown command '/nope'"));
}
