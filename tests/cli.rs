//! Process-level behavior of the `httpdump` binary.

use assert_cmd::Command;

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn no_addresses_exits_with_usage() {
    let output = Command::cargo_bin("httpdump").unwrap().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(stderr.starts_with("require at least one address to listen to\n\n"));
    assert!(stderr.contains("Usage: httpdump [flags] ADDRESS [ADDRESS...]"));
    assert!(output.stdout.is_empty());
}

#[test]
fn help_goes_to_stderr() {
    let output = Command::cargo_bin("httpdump")
        .unwrap()
        .arg("-h")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("-rto") || stderr(&output).contains("--rto"));
    assert!(output.stdout.is_empty());
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let output = Command::cargo_bin("httpdump")
        .unwrap()
        .args(["-x", "127.0.0.1:0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr(&output);
    assert!(stderr.starts_with("error: "));
    assert!(stderr.contains("Usage: httpdump [flags] ADDRESS [ADDRESS...]"));
    assert!(stderr.contains("[default: 10s]"));
    assert!(output.stdout.is_empty());
}

#[test]
fn occupied_address_is_fatal() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let taken_addr = taken.local_addr().unwrap().to_string();

    let output = Command::cargo_bin("httpdump")
        .unwrap()
        .args(["127.0.0.1:0", &taken_addr])
        .env_remove("RUST_LOG")
        .timeout(std::time::Duration::from_secs(10))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    // only the fatal line at the default log level
    let stderr = stderr(&output);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 1, "unexpected stderr: {stderr}");
    assert!(lines[0].starts_with(&format!("fatal error: listen tcp {taken_addr}: ")));
    drop(taken);
}
