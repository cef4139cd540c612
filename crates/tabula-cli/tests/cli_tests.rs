// Rust guideline compliant 2026-02-09

//! End-to-end tests for the tabula binary.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const LISTING: &str = r#"
name = "samples"
page_size = 10

[[columns]]
id = "Title"
title = "Title"
index_name = "title"

[[columns]]
id = "Client"
title = "Client"

[[review_states]]
id = "default"
title = "All"

[[review_states]]
id = "received"
title = "Received"

[review_states.extra_filter]
review_state = "received"
"#;

const CONFIG: &str = r#"
portal_url = "http://lims.example"
"#;

fn uid(n: u32) -> String {
    format!("{n:032x}")
}

fn entity_line(n: u32, state: &str, transitions: &[&str]) -> String {
    let transitions: Vec<serde_json::Value> = transitions
        .iter()
        .map(|id| serde_json::json!({"id": id, "title": id, "target": "done"}))
        .collect();
    serde_json::json!({
        "uid": uid(n),
        "id": format!("s{n}"),
        "title": format!("Sample {n}"),
        "entity_type": "Sample",
        "path": format!("/clients/c1/s{n}"),
        "review_state": state,
        "metadata": {"Client": "ACME"},
        "transitions": transitions,
    })
    .to_string()
}

fn workspace() -> TempDir {
    let temp_dir = TempDir::new().expect("temp dir");
    fs::write(temp_dir.path().join("listing.toml"), LISTING).expect("write listing");
    fs::write(temp_dir.path().join("tabula.toml"), CONFIG).expect("write config");
    let entities = [
        entity_line(1, "received", &["submit", "receive"]),
        entity_line(2, "received", &["submit"]),
        entity_line(3, "published", &[]),
    ]
    .join("\n");
    fs::write(temp_dir.path().join("entities.jsonl"), entities).expect("write entities");
    temp_dir
}

fn tabula(dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tabula"))
        .current_dir(dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("run tabula");
    if let Some(input) = stdin {
        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(input.as_bytes())
            .expect("write stdin");
    }
    child.wait_with_output().expect("wait for tabula")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "expected JSON output ({err}), got:\n{}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

#[test]
fn test_rows_prints_success_envelope() {
    let dir = workspace();
    let output = tabula(
        dir.path(),
        &["rows", "--payload", r#"{"review_state": "received", "page_size": 1}"#],
        None,
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let response = json_stdout(&output);
    assert_eq!(response["status"], "ok");
    assert_eq!(response["result"]["count"], 1);
    assert_eq!(response["result"]["total"], 2);
    assert_eq!(response["result"]["show_more"], true);
    assert_eq!(
        response["result"]["rows"][0]["url"],
        "http://lims.example/clients/c1/s1"
    );
}

#[test]
fn test_transitions_payload_from_stdin() {
    let dir = workspace();
    let payload = serde_json::json!({"selected_uids": [uid(1), uid(2), uid(3)]}).to_string();
    let output = tabula(dir.path(), &["transitions", "--payload", "-"], Some(&payload));
    assert!(output.status.success());

    let response = json_stdout(&output);
    let transitions = response["result"]["transitions"]
        .as_array()
        .expect("transitions array");
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0]["id"], "submit");
}

#[test]
fn test_set_fields_persists_entities() {
    let dir = workspace();
    let payload = serde_json::json!({"save_queue": {uid(2): {"Client": "Globex"}}}).to_string();
    let output = tabula(dir.path(), &["set-fields", "--payload", &payload], None);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let response = json_stdout(&output);
    assert_eq!(response["result"]["uids"][0], uid(2));

    let saved = fs::read_to_string(dir.path().join("entities.jsonl")).expect("read entities");
    assert!(saved.contains("Globex"));
}

#[test]
fn test_invalid_query_exits_with_error_envelope() {
    let dir = workspace();
    let output = tabula(
        dir.path(),
        &["query", "--payload", r#"{"query": {"Color": "red"}}"#],
        None,
    );
    assert_eq!(output.status.code(), Some(1));

    let response = json_stdout(&output);
    assert_eq!(response["status"], 400);
    assert_eq!(response["level"], "warning");
    assert_eq!(response["message"], "Color is not a valid catalog index");
}

#[test]
fn test_invalid_log_level_fails() {
    let dir = workspace();
    let output = tabula(dir.path(), &["rows", "--log-level", "loud"], None);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
