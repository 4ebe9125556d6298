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
fn validate_ok_exits_0_and_prints_ok() {
    for file in ["content.json", "tree.json"] {
        let input = demo_path(file);
        let mut cmd = cargo_bin_cmd!("folio");
        cmd.args(["validate", input.to_str().unwrap(), "--schema"]);
        cmd.assert().success().code(0).stdout("OK\n");
    }
}

#[test]
fn validate_out_of_range_style_exits_2() {
    let input = demo_path("invalid-range.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["validate", input.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("exceeds text length"));
}

#[test]
fn validate_missing_blocks_exits_1_and_names_the_field() {
    let input = demo_path("missing-blocks.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["validate", input.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing required top-level field(s): blocks"));
}

#[test]
fn validate_schema_rejects_missing_blocks_with_exit_2() {
    let input = demo_path("missing-blocks.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["validate", input.to_str().unwrap(), "--schema"]);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("schema validation failed"));
}

#[test]
fn validate_unreadable_file_exits_1() {
    let input = demo_path("does-not-exist.json");

    let mut cmd = cargo_bin_cmd!("folio");
    cmd.args(["validate", input.to_str().unwrap()]);
    cmd.assert().failure().code(1);
}
