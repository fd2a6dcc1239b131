use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;

use assert_cmd::Command;
use tempfile::TempDir;

fn write_seq(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// Answers `bodies.len()` connections in turn, one canned 200 response each.
fn serve(bodies: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for body in bodies {
            let Ok((mut socket, _)) = listener.accept() else {
                return;
            };
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&raw) {
                match socket.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => raw.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..head_end]
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= head_end + 4 + content_length
}

const VALID: &str = r#"
order: [login, profile]
steps:
  - id: login
    method: POST
    url: https://api.example.com/login
  - id: profile
    url: https://api.example.com/me
    headers:
      - name: Authorization
        value: "Bearer {{login.token}}"
"#;

#[test]
fn validate_accepts_a_valid_sequence() {
    let dir = TempDir::new().unwrap();
    let path = write_seq(&dir, "seq.yaml", VALID);

    let out = Command::cargo_bin("dron")
        .unwrap()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(String::from_utf8(out).unwrap().starts_with("ok: valid sequence"));
}

#[test]
fn validate_rejects_unknown_step_in_order() {
    let dir = TempDir::new().unwrap();
    let path = write_seq(
        &dir,
        "seq.yaml",
        "order: [a, ghost]\nsteps:\n  - id: a\n    url: https://example.com\n",
    );

    Command::cargo_bin("dron")
        .unwrap()
        .args(["validate", path.to_str().unwrap(), "--format", "json"])
        .assert()
        .code(2);
}

#[test]
fn validate_rejects_unparsable_input() {
    let dir = TempDir::new().unwrap();
    let path = write_seq(&dir, "bad.yaml", "order: [a\nsteps: {{");

    Command::cargo_bin("dron")
        .unwrap()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn missing_file_is_a_runtime_error() {
    Command::cargo_bin("dron")
        .unwrap()
        .args(["validate", "/nonexistent/dron/seq.yaml"])
        .assert()
        .code(4);
}

#[test]
fn inspect_prints_dependency_graph_as_dot() {
    let dir = TempDir::new().unwrap();
    let path = write_seq(&dir, "seq.yaml", VALID);

    let out = Command::cargo_bin("dron")
        .unwrap()
        .args(["inspect", path.to_str().unwrap(), "--format", "dot"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let dot = String::from_utf8(out).unwrap();
    assert!(dot.starts_with("digraph dron {"));
    assert!(dot.contains(r#""login" -> "profile";"#));
}

#[test]
fn run_sends_steps_in_order_and_writes_history() {
    let base = serve(vec![r#"{"token":"xyz"}"#, r#"{"name":"ann"}"#]);
    let dir = TempDir::new().unwrap();
    let seq = format!(
        r#"{{
  "order": ["login", "profile"],
  "steps": [
    {{ "id": "login", "method": "POST", "url": "{base}/login", "body": "{{\"u\":1}}" }},
    {{ "id": "profile", "url": "{base}/me?t={{{{login.token}}}}" }}
  ]
}}"#
    );
    let path = write_seq(&dir, "seq.json", &seq);
    let history = dir.path().join("history.json");

    let out = Command::cargo_bin("dron")
        .unwrap()
        .args([
            "run",
            path.to_str().unwrap(),
            "--format",
            "json",
            "--history-out",
            history.to_str().unwrap(),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["status"], "succeeded");
    assert_eq!(report["executed"], 2);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&history).unwrap()).unwrap();
    assert_eq!(written[0]["step_id"], "login");
    assert_eq!(written[1]["url"], format!("{base}/me?t=xyz"));
    assert_eq!(written[1]["response"], r#"{"name":"ann"}"#);
}

#[test]
fn run_refuses_a_sequence_with_a_forward_reference() {
    let dir = TempDir::new().unwrap();
    let path = write_seq(
        &dir,
        "seq.yaml",
        "order: [a, b]\nsteps:\n  - id: a\n    url: \"http://127.0.0.1:9/{{b.id}}\"\n  - id: b\n    url: http://127.0.0.1:9/b\n",
    );

    let out = Command::cargo_bin("dron")
        .unwrap()
        .args(["run", path.to_str().unwrap()])
        .assert()
        .code(2)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(out).unwrap();
    assert!(stderr.contains("sequence failed validation (1 violations)"), "{stderr}");
    assert!(
        stderr.contains("- steps.a.url: {{b.id}} references step `b` which runs later"),
        "{stderr}"
    );
}

#[test]
fn run_reports_parse_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_seq(&dir, "seq.json", "{\"order\": [");

    let out = Command::cargo_bin("dron")
        .unwrap()
        .args(["run", path.to_str().unwrap()])
        .assert()
        .code(2)
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8(out).unwrap().contains("failed to parse as JSON"));
}

#[test]
fn run_against_unreachable_host_fails_with_run_failed() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = TempDir::new().unwrap();
    let path = write_seq(
        &dir,
        "seq.yaml",
        &format!("order: [a]\nsteps:\n  - id: a\n    url: http://127.0.0.1:{port}/\n"),
    );

    Command::cargo_bin("dron")
        .unwrap()
        .args(["run", path.to_str().unwrap(), "--timeout", "2000"])
        .assert()
        .code(3);
}
