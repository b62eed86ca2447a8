use std::process::Command;

fn run_ping_watch(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_ping-watch")).args(args).output().unwrap();
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    (output.status.success(), text)
}

#[test]
fn fatal_error_is_reported_once_and_exit_code_is_failure() {
    // Fails before any packet is sent: either the port does not parse or the socket cannot be opened.
    let (success, output) = run_ping_watch(&["no such host:port"]);

    assert!(!success);
    assert_eq!(1, output.matches("PingError").count(), "output was: {output}");
}
