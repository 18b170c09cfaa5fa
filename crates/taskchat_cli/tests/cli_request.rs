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

fn request(args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_taskchat");
    let config_path = temp_path("cli-request-config.json");
    Command::new(exe)
        .arg("request")
        .args(args)
        .env("TASKCHAT_CONFIG_PATH", &config_path)
        .output()
        .expect("failed to run request command")
}

#[test]
fn request_list_prints_get_with_filters() {
    let output = request(&["list", "--status", "pending", "--search", ""]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "GET http://localhost:8000/api/demo_user_id/tasks?status=pending"
    );
}

#[test]
fn request_create_prints_json_body() {
    let output = request(&[
        "--json",
        "create",
        "Buy groceries",
        "--priority",
        "high",
        "--recurring",
        "none",
    ]);
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["method"], "POST");
    assert_eq!(payload["url"], "http://localhost:8000/api/demo_user_id/tasks");
    assert_eq!(payload["body"]["title"], "Buy groceries");
    assert_eq!(payload["body"]["priority"], "high");
    assert!(payload["body"].get("recurring_interval").is_none());
}

#[test]
fn request_uses_configured_user_and_base_url() {
    let output = request(&[
        "--config-override",
        "user_id=user123",
        "--config-override",
        "api_base_url=http://127.0.0.1:9000/",
        "reopen",
        "42",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("PUT http://127.0.0.1:9000/api/user123/tasks/42\n"));
    assert!(stdout.contains("\"status\": \"pending\""));
}

#[test]
fn request_complete_and_delete() {
    let output = request(&["complete", "7"]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "PATCH http://localhost:8000/api/demo_user_id/tasks/7/complete"
    );

    let output = request(&["delete", "7"]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "DELETE http://localhost:8000/api/demo_user_id/tasks/7"
    );
}

#[test]
fn request_list_encodes_search_terms() {
    let output = request(&["list", "--search", "a b&c"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "GET http://localhost:8000/api/demo_user_id/tasks?search=a+b%26c"
    );
}

#[test]
fn request_rejects_invalid_base_url() {
    let output = request(&[
        "--config-override",
        "api_base_url=not a url",
        "list",
    ]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - invalid api base url 'not a url'"));
}

#[test]
fn request_create_normalizes_due_date() {
    let output = request(&[
        "--json",
        "create",
        "Buy",
        "--due-date",
        "2026-01-27T10:00:00+01:00",
    ]);
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["body"]["due_date"], "2026-01-27T09:00:00Z");
}

#[test]
fn request_create_rejects_non_rfc3339_due_date() {
    let output = request(&["create", "Buy", "--due-date", "tomorrow"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - due_date must be RFC3339"));
}

#[test]
fn request_create_rejects_unknown_priority() {
    let output = request(&["create", "Buy groceries", "--priority", "urgent"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unknown priority 'urgent'"));
}
