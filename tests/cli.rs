use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const KEYNOTE: &str = r#"{
  "title": "Keynote: Rust in 2024?",
  "tracks": [
    {
      "language_code": "de",
      "language_name": "German",
      "entries": [{"text": "Hallo", "start": 0, "duration": 1}]
    },
    {
      "language_code": "en",
      "language_name": "English",
      "generated": true,
      "entries": [
        {"text": "Hello everyone", "start": 0.5, "duration": 2.5},
        {"text": "Welcome back", "start": "3", "duration": 3661}
      ]
    }
  ]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(
            dir.path().join("config.yaml"),
            "fetch:\n  retry_delay_secs: 0.0\napp:\n  show_progress: false\n",
        )
        .unwrap();
        fs_err::create_dir(dir.path().join("out")).unwrap();
        Self { dir }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs_err::write(&path, content).unwrap();
        path
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tubescript").unwrap();
        cmd.env_remove("RUST_LOG")
            .env_remove("TUBESCRIPT_CONFIG")
            .arg("--config")
            .arg(self.dir.path().join("config.yaml"));
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("tubescript")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("tracks"));
}

#[test]
fn test_transcribe_local_file() {
    let ws = Workspace::new();
    let input = ws.write("keynote.json", KEYNOTE);

    ws.command()
        .args(["transcribe", arg(&input), "-o", arg(&ws.out())])
        .assert()
        .success()
        .stderr(predicate::str::contains("✓"));

    let saved = fs_err::read_to_string(ws.out().join("Keynote Rust in 2024.txt")).unwrap();
    assert_eq!(
        saved,
        "[00:00:00 → 00:00:03] Hello everyone\n[00:00:03 → 01:01:04] Welcome back\n"
    );
}

#[test]
fn test_source_language_fallback_to_stdout() {
    let ws = Workspace::new();
    let input = ws.write("keynote.json", KEYNOTE);

    ws.command()
        .args(["transcribe", arg(&input), "-s", "de", "--format", "compact", "--stdout"])
        .assert()
        .success()
        .stdout("[0.00 → 1.00] Hallo\n");
}

#[test]
fn test_multiple_inputs_produce_archive() {
    let ws = Workspace::new();
    let first = ws.write("keynote.json", KEYNOTE);
    let second = ws.write("lecture.json", r#"[{"text": "Lecture one", "start": 1, "duration": 1}]"#);

    ws.command()
        .args(["transcribe", arg(&first), arg(&second), "-o", arg(&ws.out())])
        .assert()
        .success();

    let bytes = fs_err::read(ws.out().join("transcripts.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    assert_eq!(archive.by_index(0).unwrap().name(), "Keynote Rust in 2024.txt");

    let mut content = String::new();
    archive
        .by_name("lecture.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "[00:00:01 → 00:00:02] Lecture one\n");
}

#[test]
fn test_partial_failure_still_succeeds() {
    let ws = Workspace::new();
    let good = ws.write("lecture.json", r#"[{"text": "Lecture one", "start": 1, "duration": 1}]"#);
    let missing = ws.dir.path().join("missing.json");

    ws.command()
        .args(["transcribe", arg(&good), arg(&missing), "-o", arg(&ws.out())])
        .assert()
        .success()
        .stderr(predicate::str::contains("✗"));

    assert!(ws.out().join("transcripts.zip").is_file());
}

#[test]
fn test_all_failures_exit_non_zero() {
    let ws = Workspace::new();
    let missing = ws.dir.path().join("missing.json");
    let empty = ws.write("empty.json", r#"{"tracks": []}"#);

    ws.command()
        .args(["transcribe", arg(&missing), arg(&empty), "-o", arg(&ws.out())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No transcript available"));

    assert!(!ws.out().join("transcripts.zip").exists());
}

#[test]
fn test_tracks_listing() {
    let ws = Workspace::new();
    let input = ws.write("keynote.json", KEYNOTE);

    ws.command()
        .args(["tracks", arg(&input)])
        .assert()
        .success()
        .stdout(predicate::str::contains("de (German) [manual]"))
        .stdout(predicate::str::contains("en (English) [auto-generated]"));
}

#[test]
fn test_config_show() {
    let ws = Workspace::new();

    ws.command()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Retry Delay: 0s"));
}

#[test]
fn test_report_follows_input_order() {
    let ws = Workspace::new();
    let good = ws.write("lecture.json", r#"[{"text": "Lecture one", "start": 1, "duration": 1}]"#);

    let output = ws
        .command()
        .args(["transcribe", arg(&good), "not a video", "-o", arg(&ws.out())])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let ok = stderr.find("✓ lecture").unwrap();
    let failed = stderr.find("✗ not a video").unwrap();
    assert!(ok < failed, "{}", stderr);
}
