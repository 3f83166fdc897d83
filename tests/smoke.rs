use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("berita-ner").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn normalize_prints_text_and_tokens() {
    let output = Command::cargo_bin("berita-ner")
        .expect("binary exists")
        .env("RUST_LOG", "off")
        .args(["normalize", "--text", "Banjir di Jakarta (21/12/2022)!"])
        .output()
        .expect("command runs");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("banjir di jakarta 21/12/2022"));
    assert_eq!(lines.next(), Some("banjir | di | jakarta | 21/12/2022"));
}

#[test]
fn detect_requires_input() {
    Command::cargo_bin("berita-ner")
        .expect("binary exists")
        .env("RUST_LOG", "off")
        .arg("detect")
        .assert()
        .failure();
}
