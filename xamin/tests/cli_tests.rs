use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("settings.yaml");
    fs::write(&config, "activities:\n  disabled:\n    - hex-view\n").unwrap();
    (dir, config)
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn xamin(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xamin"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn error_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|l| l.starts_with("xamin: "))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_open_succeeds_when_every_file_opens() {
    let (dir, config) = setup();
    let csv = write(&dir, "data.csv", "a,b\n1,2\n");
    let text = write(&dir, "notes.txt", "hello\n");

    let output = xamin(&config, &["open", &csv, &text]);

    assert_eq!(output.status.code(), Some(0));
    assert!(error_lines(&output).is_empty());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("activities: table-view"));
    assert!(stdout.contains("activities: code-editor"));
}

#[test]
fn test_open_exits_1_and_reports_each_failed_file() {
    let (dir, config) = setup();
    let csv = write(&dir, "data.csv", "a,b\n1,2\n");
    let unsupported = write(&dir, "data.xyz", "a,b\n1,2\n");
    let malformed = write(&dir, "bad.yaml", "key: [unclosed\n");
    let missing = dir.path().join("missing.txt").display().to_string();

    let output = xamin(&config, &["open", &csv, &unsupported, &missing, &malformed]);

    assert_eq!(output.status.code(), Some(1));
    let errors = error_lines(&output);
    assert_eq!(errors.len(), 3, "stderr: {:?}", errors);
    assert!(errors[0].starts_with(&format!("xamin: {}: Unsupported format", unsupported)));
    assert!(errors[1].starts_with(&format!("xamin: {}: IO error", missing)));
    assert!(errors[2].starts_with(&format!("xamin: {}: Failed to parse", malformed)));

    // The good file is still reported
    assert!(String::from_utf8_lossy(&output.stdout).contains("activities: table-view"));
}

#[test]
fn test_config_file_is_honoured() {
    let (_dir, config) = setup();
    let output = xamin(&config, &["activities"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("table-view"));
    assert!(!stdout.contains("hex-view"));
    assert!(stdout.contains("raw-view"));
}

#[test]
fn test_json_report_lists_offered_activities() {
    let (dir, config) = setup();
    let csv = write(&dir, "data.csv", "a,b\n1,2\n");

    let output = xamin(&config, &["--json", "open", &csv]);

    assert_eq!(output.status.code(), Some(0));
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["kind"], "csv");
    assert_eq!(reports[0]["activities"], serde_json::json!(["table-view"]));
}
