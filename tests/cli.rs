//! End-to-end tests of the `skelly` binary.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::process::Command;

/// Binary under test, run from `dir` so no stray config is picked up.
fn skelly(dir: &assert_fs::TempDir) -> Command
{
    let mut cmd = Command::cargo_bin("skelly").expect("skelly binary");
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("SKELLY_ROOT_DIR")
        .env_remove("SKELLY_FORMAT");
    cmd
}

fn fixture(structure: &str) -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("structure.txt")
        .write_str(structure)
        .expect("write structure");
    tmp
}

#[test]
fn plan_json_lists_operations()
{
    let tmp = fixture("src\n\tmain.rs\nREADME.md\n");

    let assert = skelly(&tmp)
        .args(["plan", "structure.txt", "--root", "out", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let v: Value = serde_json::from_str(&stdout).expect("valid json");
    let ops = v["operations"]
        .as_array()
        .expect("operations array");

    assert_eq!(ops.len(), 3);
    assert_eq!(ops[0]["type"], "create");
    assert_eq!(ops[0]["isDirectory"], true);
    assert_eq!(ops[1]["depth"], 1);
    assert!(
        ops[1]["targetPath"]
            .as_str()
            .expect("path")
            .ends_with("out/src/main.rs")
    );

    // Planning writes nothing
    tmp.child("out")
        .assert(predicate::path::missing());
}

#[test]
fn plan_tree_shows_names()
{
    let tmp = fixture("src\n\tmain.rs\n");
    skelly(&tmp)
        .args(["--no-color", "plan", "structure.txt", "--root", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("src/"))
        .stdout(predicate::str::contains("main.rs"));
}

#[test]
fn apply_creates_structure()
{
    let tmp = fixture("app\n\tsrc\n\t\tlib.rs\n\tCargo.toml\nnotes_$*2.md\n");

    skelly(&tmp)
        .args(["--quiet", "apply", "structure.txt", "--root", "out"])
        .assert()
        .success();

    tmp.child("out/app/src/lib.rs")
        .assert(predicate::path::is_file());
    tmp.child("out/app/Cargo.toml")
        .assert(predicate::path::is_file());
    tmp.child("out/notes_1.md")
        .assert(predicate::path::is_file());
    tmp.child("out/notes_2.md")
        .assert(predicate::path::is_file());
}

#[test]
fn apply_reads_stdin_and_applies_rename_flags()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    let mut cmd = skelly(&tmp);
    cmd.args([
            "--quiet",
            "apply",
            "-",
            "--root",
            "out",
            "--replace",
            "__name__=demo",
            "--replace-file",
            ".txt=.md",
        ]);
    assert_cmd::Command::from_std(cmd)
        .write_stdin("__name__\n\t__name__.txt\n")
        .assert()
        .success();

    tmp.child("out/demo/demo.md")
        .assert(predicate::path::is_file());
}

#[test]
fn dry_run_touches_nothing()
{
    let tmp = fixture("app\n\tmain.rs\n");

    skelly(&tmp)
        .args(["--dry-run", "--no-color", "apply", "structure.txt", "--root", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"));

    tmp.child("out")
        .assert(predicate::path::missing());
}

#[test]
fn warnings_keep_exit_zero_unless_strict()
{
    let tmp = fixture("[/definitely/not/here.ts] > copied.ts\n");

    skelly(&tmp)
        .args(["--no-color", "apply", "structure.txt", "--root", "out"])
        .assert()
        .success()
        .stderr(predicate::str::contains("/definitely/not/here.ts"));

    tmp.child("out/copied.ts")
        .assert(predicate::path::is_file());
    tmp.child("out/copied.ts")
        .assert("");

    skelly(&tmp)
        .args(["--quiet", "apply", "structure.txt", "--root", "out2", "--strict"])
        .assert()
        .code(2);
}

#[test]
fn apply_json_reports_log_and_flag()
{
    let tmp = fixture("a.txt\n");

    let assert = skelly(&tmp)
        .args(["apply", "structure.txt", "--root", "out", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let v: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(v["hadWarnings"], false);
    assert_eq!(v["operationLog"][0]["outcome"], "succeeded");
}

#[test]
fn mixed_indentation_fails_before_writing()
{
    let tmp = fixture("a\n\tb\n    c\n");

    skelly(&tmp)
        .args(["apply", "structure.txt", "--root", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));

    tmp.child("out")
        .assert(predicate::path::missing());
}

#[test]
fn malformed_replace_flag_is_rejected()
{
    let tmp = fixture("a\n");
    skelly(&tmp)
        .args(["plan", "structure.txt", "--replace", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SEARCH=REPLACE"));
}

#[test]
fn config_file_supplies_defaults()
{
    let tmp = fixture("__name__.txt\n");
    tmp.child("skelly.toml")
        .write_str("root_dir = \"from-config\"\n\n[[replacements.all]]\nsearch = \"__name__\"\nreplace = \"cfg\"\n")
        .expect("write config");

    skelly(&tmp)
        .args(["--quiet", "apply", "structure.txt"])
        .assert()
        .success();

    tmp.child("from-config/cfg.txt")
        .assert(predicate::path::is_file());
}

#[test]
fn init_writes_config_once()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    skelly(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("skelly.toml"));
    tmp.child("skelly.toml")
        .assert(predicate::str::contains("__name__"));

    skelly(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn completions_to_stdout()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    skelly(&tmp)
        .args(["completions", "bash", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skelly"));
}
