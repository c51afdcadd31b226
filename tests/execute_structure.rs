//! Executor behaviour on both backends.

use std::path::Path;

use skelly::core::execute::{Outcome, execute};
use skelly::core::names::{FileNameReplacement, Replacements};
use skelly::core::plan::StructureOptions;
use skelly::fs::{EntryKind, FileSystem, LocalFs, MemoryFs};
use tempfile::TempDir;

#[test]
fn missing_source_copy_leaves_empty_file_and_warning()
{
    let fs = MemoryFs::new();
    let report = execute("[/nonexistent] > copied.ts", &StructureOptions::new("/r"), &fs)
        .expect("execute");

    assert!(report.had_warnings);
    assert_eq!(fs.read_to_string("/r/copied.ts").as_deref(), Some(""));
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.message.contains("/nonexistent"))
    );
    assert_eq!(report.operation_log.entries()[0].outcome, Outcome::FellBack);
}

#[test]
fn move_transfers_bytes_and_removes_source()
{
    let fs = MemoryFs::new().with_file("/r/src.txt", "payload");
    let report = execute("(src.txt) > dst.txt", &StructureOptions::new("/r"), &fs).expect("execute");

    assert!(!report.had_warnings, "{:?}", report.warnings);
    assert!(!fs.exists(Path::new("/r/src.txt")));
    assert_eq!(fs.read_to_string("/r/dst.txt").as_deref(), Some("payload"));
}

#[test]
fn copied_directory_is_renamed_entry_by_entry()
{
    let fs = MemoryFs::new()
        .with_file("/tpl/__name__.rs", "fn main() {}")
        .with_file("/tpl/docs/__name__.md", "# doc");
    let options = StructureOptions::new("/r").with_replacements(Replacements {
        all: vec![FileNameReplacement::new("__name__", "app")],
        ..Replacements::default()
    });

    let report = execute("project\n\t[/tpl] > src", &options, &fs).expect("execute");

    assert!(!report.had_warnings, "{:?}", report.warnings);
    assert_eq!(fs.read_to_string("/r/project/src/app.rs").as_deref(), Some("fn main() {}"));
    assert_eq!(fs.read_to_string("/r/project/src/docs/app.md").as_deref(), Some("# doc"));
    assert!(!fs.exists(Path::new("/r/project/src/__name__.rs")));
    // Copies leave the template alone
    assert!(fs.exists(Path::new("/tpl/docs/__name__.md")));
}

#[test]
fn moved_directory_source_is_removed_after_its_entries()
{
    let fs = MemoryFs::new()
        .with_file("/old/a.txt", "a")
        .with_file("/old/nested/b.txt", "b");

    let report = execute("(/old) > new", &StructureOptions::new("/r"), &fs).expect("execute");

    assert!(!report.had_warnings, "{:?}", report.warnings);
    assert!(!fs.exists(Path::new("/old")));
    assert_eq!(fs.read_to_string("/r/new/nested/b.txt").as_deref(), Some("b"));
    assert_eq!(report.operation_log.len(), 4);
}

#[test]
fn moved_directory_without_recursion_still_moves_contents()
{
    let fs = MemoryFs::new().with_file("/old/a.txt", "a");
    let options = StructureOptions::new("/r").with_recursive(false);

    execute("(/old) > new", &options, &fs).expect("execute");
    assert!(!fs.exists(Path::new("/old")));
    assert_eq!(fs.read_to_string("/r/new/a.txt").as_deref(), Some("a"));
}

#[test]
fn move_into_own_subtree_falls_back()
{
    let fs = MemoryFs::new().with_file("/r/pkg/a.txt", "a");

    let report = execute("pkg\n\t(pkg) > inner", &StructureOptions::new("/r"), &fs)
        .expect("execute");
    assert!(report.had_warnings);
    assert!(fs.exists_as(Path::new("/r/pkg/inner"), EntryKind::Directory));
    // The fallback directory is left empty
    assert!(fs.read_dir(Path::new("/r/pkg/inner")).expect("list").is_empty());
    assert!(!fs.exists(Path::new("/r/pkg/inner/a.txt")));
    assert_eq!(report.operation_log.entries()[2].outcome, Outcome::Skipped);
    // Source untouched
    assert_eq!(fs.read_to_string("/r/pkg/a.txt").as_deref(), Some("a"));
}

#[test]
fn copy_whose_source_vanished_skips_its_entries()
{
    let fs = MemoryFs::new().with_file("/tpl/a.txt", "a");
    let plan = skelly::core::plan::plan("[/tpl] > copy", &StructureOptions::new("/r"), &fs)
        .expect("plan");
    assert_eq!(plan.len(), 2);

    // Source removed between planning and execution
    fs.rm(Path::new("/tpl"), true).expect("rm");
    let report = skelly::core::execute::execute_plan(&plan, &fs);

    assert!(fs.read_dir(Path::new("/r/copy")).expect("list").is_empty());
    assert_eq!(report.operation_log.entries()[1].outcome, Outcome::Skipped);
}

#[test]
fn run_always_completes_and_reports_every_operation()
{
    let fs = MemoryFs::new().with_file("/r/blocker", "");

    // `blocker` is a file, so nothing can be created beneath it
    let report = execute("blocker\\.d\nblocker\n\tchild.txt\nok.txt", &StructureOptions::new("/r"), &fs)
        .expect("execute");

    assert!(report.had_warnings);
    assert_eq!(report.operation_log.len(), 4);
    assert_eq!(fs.read_to_string("/r/ok.txt").as_deref(), Some(""));
}

#[test]
fn local_disk_end_to_end()
{
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path().join("out");
    let tpl = tmp.path().join("tpl");
    std::fs::create_dir_all(tpl.join("inner")).expect("mkdir");
    std::fs::write(tpl.join("inner/keep.txt"), "kept").expect("write");
    std::fs::write(tmp.path().join("loose.txt"), "loose").expect("write");

    let input = format!(
        "---\nfolderReplacements:\n  - {{ search: \"inner\", replace: \"core\" }}\n---\n\
         app\n\tsrc\n\t\tmain.rs\n\t[{}] > template\n\t({}) > moved.txt\nconfig\\.d\n",
        tpl.display(),
        tmp.path()
            .join("loose.txt")
            .display()
    );

    let report = execute(&input, &StructureOptions::new(&root), &LocalFs).expect("execute");
    assert!(!report.had_warnings, "{:?}", report.warnings);

    assert!(root.join("app/src/main.rs").is_file());
    assert_eq!(
        std::fs::read_to_string(root.join("app/template/core/keep.txt")).expect("read"),
        "kept"
    );
    assert_eq!(std::fs::read_to_string(root.join("app/moved.txt")).expect("read"), "loose");
    assert!(!tmp.path().join("loose.txt").exists());
    assert!(root.join("config.d").is_dir());
}
