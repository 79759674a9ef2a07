use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn xlifflint_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("xlifflint"))
}

const BROKEN_ID: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
  <file source-language="en" datatype="plaintext" original="file.ext">
    <body>
      <trans-unit id="greeting">
        <source>Hello World</source>
        <target>Hallo Welt</target>
      </trans-unit>
    </body>
  </file>
</xliff>
"#;

const CLEAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
  <file source-language="en" datatype="plaintext" original="file.ext">
    <body>
      <trans-unit id="hello">
        <source>Hello</source>
        <target>Hallo</target>
      </trans-unit>
    </body>
  </file>
</xliff>
"#;

#[test]
fn test_clean_file_exits_zero() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("messages.de.xlf");
    fs::write(&input, CLEAN).unwrap();

    let output = xlifflint_cmd()
        .arg(input.to_str().unwrap())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[OK]"));
    assert!(stdout.contains("xlifflint: [OK] checked 1 files"));
}

#[test]
fn test_check_only_reports_and_leaves_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("messages.de.xlf");
    fs::write(&input, BROKEN_ID).unwrap();

    let output = xlifflint_cmd()
        .arg(input.to_str().unwrap())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 ERRORS"));
    assert!(stdout.contains(r#" * id of "Hello World""#));
    assert!(stdout.contains("xlifflint: 1 Errors in 1 files (checked 1 of 1)"));
    assert_eq!(fs::read_to_string(&input).unwrap(), BROKEN_ID);
}

#[test]
fn test_fix_rewrites_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("messages.de.xlf");
    fs::write(&input, BROKEN_ID).unwrap();

    let output = xlifflint_cmd()
        .args(["--fix", input.to_str().unwrap()])
        .output()
        .unwrap();

    // the fix is still reported, so the run counts as failed
    assert_eq!(output.status.code(), Some(1));
    let fixed = fs::read_to_string(&input).unwrap();
    assert!(fixed.contains(r#"<trans-unit id="Hello World">"#));
    assert!(temp_dir.path().join("messages.de.xlf~").exists());

    let rerun = xlifflint_cmd()
        .args(["--fix", input.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(rerun.status.success());
}

#[test]
fn test_missing_file_reported() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("missing.xlf");

    let output = xlifflint_cmd()
        .args(["--fix", input.to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(" * file not found"));
}

#[test]
fn test_max_error_files_stops_batch() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("a.xlf");
    let second = temp_dir.path().join("b.xlf");
    fs::write(&first, BROKEN_ID).unwrap();
    fs::write(&second, BROKEN_ID).unwrap();

    let output = xlifflint_cmd()
        .args([
            "--max-error-files",
            "1",
            first.to_str().unwrap(),
            second.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(checked 1 of 2)"));
    assert!(!stdout.contains("b.xlf"));
}

#[test]
fn test_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let broken = temp_dir.path().join("broken.xlf");
    let clean = temp_dir.path().join("clean.xlf");
    fs::write(&broken, BROKEN_ID).unwrap();
    fs::write(&clean, CLEAN).unwrap();

    let output = xlifflint_cmd()
        .args(["--json", broken.to_str().unwrap(), clean.to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let files = v["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["outcome"], "fixed");
    assert_eq!(files[0]["written"], false);
    assert_eq!(files[0]["diagnostics"][0], r#"id of "Hello World""#);
    assert_eq!(files[1]["outcome"], "clean");
    assert_eq!(v["summary"]["errors"], 1);
    assert_eq!(v["summary"]["checked"], 2);
}

#[test]
fn test_glob_input() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("messages.de.xlf"), CLEAN).unwrap();
    fs::write(temp_dir.path().join("messages.fr.xlf"), CLEAN).unwrap();

    let pattern = format!("{}/*.xlf", temp_dir.path().display());
    let output = xlifflint_cmd().arg(&pattern).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("xlifflint: [OK] checked 2 files"));
}
