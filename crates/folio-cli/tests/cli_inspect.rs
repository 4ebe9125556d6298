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
fn cli_inspect_lists_blocks_in_document_order() {
    let input = demo_path("content.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["inspect", input.to_str().unwrap()]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(out).unwrap();
    let keys: Vec<&str> = stdout
        .lines()
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(keys, ["key", "intro", "body", "item"]);
}

#[test]
fn cli_inspect_counts_utf16_units() {
    let input = demo_path("content.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["inspect", input.to_str().unwrap(), "--key", "intro"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("intro\theader-one\t0\t-\t16\t"))
        .stdout(predicate::str::contains("\tRelease notes 😀\n"));
}

#[test]
fn cli_inspect_filters_work() {
    let input = demo_path("content.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["inspect", input.to_str().unwrap(), "--type", "unordered-list-item"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(out).unwrap();
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("item\tunordered-list-item"));

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["inspect", input.to_str().unwrap(), "--grep", "@ana"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("body\tunstyled"))
        .stdout(predicate::str::contains("intro").not());
}

#[test]
fn cli_inspect_shows_tree_parents() {
    let input = demo_path("tree.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["inspect", input.to_str().unwrap(), "--key", "D"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("D\theader-two\t0\tC\t5\t"));
}

#[test]
fn cli_inspect_pretty_aligns_columns() {
    let input = demo_path("content.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["inspect", input.to_str().unwrap(), "--pretty"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\t").not())
        .stdout(predicate::str::contains("Faster undo"));
}

#[test]
fn cli_inspect_preview_is_bounded() {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    let pid = std::process::id();
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let path = std::env::temp_dir().join(format!("folio_inspect_long_{pid}_{nanos}.json"));

    let long_text = "a".repeat(200);
    let doc_json = format!(r#"{{"blocks":[{{"key":"x1","text":{long_text:?}}}]}}"#);
    fs::write(&path, doc_json).unwrap();

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["inspect", path.to_str().unwrap()]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(out).unwrap();
    let preview = stdout.lines().nth(1).unwrap().rsplit('\t').next().unwrap();
    assert_eq!(preview, format!("{}…", "a".repeat(60)));

    let _ = fs::remove_file(&path);
}
