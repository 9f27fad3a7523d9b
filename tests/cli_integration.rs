//! Binary integration tests
//!
//! Run the built `herald` executable over piped stdin and check the session
//! survives bad input and saves its state on the way out.

use std::io::Write;
use std::process::{Command, Stdio};

fn run_herald(dir: &std::path::Path, input: &[u8]) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_herald"))
        .arg("--data-dir")
        .arg(dir)
        .arg("--no-llm")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "herald exited with {}", output.status);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_invalid_utf8_line_does_not_end_session() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_herald(dir.path(), b"hello\n\xff\xfe bad\nwhat time is it\n");

    assert!(stdout.contains("The current time is"), "{}", stdout);
    assert!(dir.path().join("config.toml").exists());
    assert!(dir.path().join("memory.json").exists());
}

#[test]
fn test_end_of_input_saves_state() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_herald(dir.path(), b"my name is Grace\n");
    assert!(stdout.contains("Grace"), "{}", stdout);
    assert!(dir.path().join("config.toml").exists());

    let stdout = run_herald(dir.path(), b"goodbye\n");
    assert!(stdout.contains("Welcome back, Grace."), "{}", stdout);
    assert!(stdout.contains("Powering down. Until next time."));
}
