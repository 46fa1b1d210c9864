use std::collections::BTreeSet;
use std::fs;
use std::process::Command;

fn anagrams() -> Command {
    Command::new(env!("CARGO_BIN_EXE_anagrams"))
}

#[test]
fn writes_every_anagram_and_a_summary() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let status = anagrams()
        .current_dir(dir.path())
        .args(["aabc", "--summary", "summary.json"])
        .status()
        .expect("run anagrams");
    assert!(status.success());

    let output = fs::read_to_string(dir.path().join("output.txt")).expect("read output");
    let lines: BTreeSet<&str> = output.lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(output.lines().count(), 12);

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("summary.json")).expect("read summary"),
    )
    .expect("parse summary");
    assert_eq!(summary["status"], "completed");
    assert_eq!(summary["found"], 12);
    assert!(!dir.path().join("worker-state-0.txt").exists());
}

#[test]
fn missing_word_fails_before_enumerating() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let status = anagrams()
        .current_dir(dir.path())
        .status()
        .expect("run anagrams");
    assert!(!status.success());
    assert!(!dir.path().join("output.txt").exists());
}

#[test]
fn resume_without_checkpoints_fails() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let status = anagrams()
        .current_dir(dir.path())
        .args(["abc", "--resume"])
        .status()
        .expect("run anagrams");
    assert!(!status.success());
}

#[test]
fn resume_finishes_a_cancelled_run() {
    let dir = tempfile::tempdir().expect("tmp dir");
    fs::write(dir.path().join("output.txt"), "abc\nacb\nbac\n").expect("seed output");
    fs::write(dir.path().join("worker-state-0.txt"), "9\n0\n2\n2\nexhausted\n")
        .expect("seed state 0");
    fs::write(dir.path().join("worker-state-1.txt"), "3\n1\n1\n0\n").expect("seed state 1");
    fs::write(dir.path().join("worker-state-2.txt"), "0\n2\n0\n0\n").expect("seed state 2");

    let status = anagrams()
        .current_dir(dir.path())
        .args(["abc", "-r", "--summary", "summary.json"])
        .status()
        .expect("run anagrams");
    assert!(status.success());

    let output = fs::read_to_string(dir.path().join("output.txt")).expect("read output");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(&lines[..3], &["abc", "acb", "bac"]);
    let distinct: BTreeSet<&str> = lines.iter().copied().collect();
    assert_eq!(
        distinct,
        BTreeSet::from(["abc", "acb", "bac", "bca", "cab", "cba"])
    );
    for partition in 0..3 {
        assert!(!dir
            .path()
            .join(format!("worker-state-{partition}.txt"))
            .exists());
    }

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("summary.json")).expect("read summary"),
    )
    .expect("parse summary");
    assert_eq!(summary["found"], 6);
}

#[test]
fn resume_with_missing_output_fails() {
    let dir = tempfile::tempdir().expect("tmp dir");
    for partition in 0..3u8 {
        fs::write(
            dir.path().join(format!("worker-state-{partition}.txt")),
            format!("0\n{partition}\n0\n0\n"),
        )
        .expect("seed state");
    }

    let status = anagrams()
        .current_dir(dir.path())
        .args(["abc", "--resume"])
        .status()
        .expect("run anagrams");
    assert!(!status.success());
    assert!(!dir.path().join("output.txt").exists());
    assert!(dir.path().join("worker-state-0.txt").exists());
}
