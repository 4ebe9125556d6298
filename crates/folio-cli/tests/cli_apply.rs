use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn demo_path(file: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join(file)
}

#[test]
fn apply_replays_script_and_prints_text() {
    let content = demo_path("content.json");
    let script = demo_path("script.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["apply", content.to_str().unwrap(), script.to_str().unwrap(), "--text"]);

    // Backspace inside the immutable mention removes all of it.
    cmd.assert().success().stdout(
        "Release notes 😀\n\
Thanks to  for the fix, see the tracker.\n\
Faster undo and redo\n",
    );
}

#[test]
fn apply_prints_raw_json_with_undone_style() {
    let content = demo_path("content.json");
    let script = demo_path("script.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["apply", content.to_str().unwrap(), script.to_str().unwrap(), "--min"]);
    let out = cmd.assert().success().get_output().stdout.clone();

    let raw: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let intro = &raw["blocks"][0];
    assert_eq!(intro["key"], "intro");
    assert_eq!(
        intro["inlineStyleRanges"],
        serde_json::json!([{ "offset": 0, "length": 7, "style": "BOLD" }])
    );
    // Only the link survives, renumbered from zero.
    assert_eq!(raw["entityMap"].as_object().unwrap().len(), 1);
    assert_eq!(raw["entityMap"]["0"]["type"], "LINK");
}

#[test]
fn apply_tree_forward_delete() {
    let content = demo_path("tree.json");
    let script = demo_path("tree-delete.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["apply", content.to_str().unwrap(), script.to_str().unwrap(), "--text"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\nDeltaElephant\nFire\n"))
        .stdout(predicate::str::starts_with("Alpha\n"));
}

#[test]
fn apply_failing_step_exits_2_and_names_the_step() {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    let pid = std::process::id();
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let path = std::env::temp_dir().join(format!("folio_apply_bad_{pid}_{nanos}.json"));
    fs::write(
        &path,
        r#"{"v":1,"ops":[{"op":"select","anchorKey":"nope","anchorOffset":0}]}"#,
    )
    .unwrap();

    let content = demo_path("content.json");
    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["apply", content.to_str().unwrap(), path.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("step 0"));

    let _ = fs::remove_file(&path);
}

#[test]
fn apply_rejects_wide_segment_separator() {
    let content = demo_path("content.json");
    let script = demo_path("script.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args([
        "apply",
        content.to_str().unwrap(),
        script.to_str().unwrap(),
        "--segment-separator",
        "😀",
    ]);
    cmd.assert().failure();
}
