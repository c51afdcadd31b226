//! Planner behaviour through the public API, against an in-memory backend.

use std::path::{Path, PathBuf};

use skelly::core::names::{FileNameReplacement, Replacements};
use skelly::core::plan::{OperationType, PlanError, StructureOptions, plan};
use skelly::fs::{FileSystem, MemoryFs};

fn opts() -> StructureOptions
{
    StructureOptions::new("/r")
}

/// `type depth target [<- source] [dir]`, one operation per line.
fn describe(p: &skelly::Plan) -> String
{
    p.operations
        .iter()
        .map(|op| {
            let mut line = format!("{} {} {}", op.kind, op.depth, op.target_path.display());
            if let Some(src) = &op.source_path
            {
                line.push_str(&format!(" <- {}", src.display()));
            }
            if op.is_directory
            {
                line.push_str(" [dir]");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn escaped_dot_names_a_directory()
{
    let p = plan("folder\\.name", &opts(), &MemoryFs::new()).expect("plan");
    assert_eq!(p.len(), 1);

    let op = &p.operations[0];
    assert_eq!(op.kind, OperationType::Create);
    assert_eq!(op.target_path, PathBuf::from("/r/folder.name"));
    assert!(op.is_directory);
}

#[test]
fn replacement_tiers_apply_in_priority_order()
{
    let replacements = Replacements {
        all: vec![FileNameReplacement::new("client-name", "foo")],
        files: vec![FileNameReplacement::new("_file", "-file")],
        folders: vec![FileNameReplacement::new("folder", "bar")],
    };
    let options = opts().with_replacements(replacements);

    let p = plan("client-name-folder\n\tclient-name_file.ts", &options, &MemoryFs::new())
        .expect("plan");
    assert_eq!(p.operations[0].target_path, PathBuf::from("/r/foo-bar"));
    assert_eq!(p.operations[1].target_path, PathBuf::from("/r/foo-bar/foo-file.ts"));
}

#[test]
fn caller_rules_run_before_front_matter_rules()
{
    let input = "---\nfileReplacements:\n  - { search: \"b\", replace: \"c\" }\n---\na.txt\n";
    let options = opts().with_replacements(Replacements {
        files: vec![FileNameReplacement::new("a", "b")],
        ..Replacements::default()
    });

    // a -> b by the caller, then b -> c from the front matter
    let p = plan(input, &options, &MemoryFs::new()).expect("plan");
    assert_eq!(p.operations[0].target_path, PathBuf::from("/r/c.txt"));
    assert!(p.frontmatter.is_some());
    assert_eq!(p.options.replacements.files.len(), 2);
}

#[test]
fn malformed_front_matter_is_treated_as_body()
{
    let input = "---\nfileReplacements: [unclosed\n---\nsrc";
    let p = plan(input, &opts(), &MemoryFs::new()).expect("plan");
    assert!(p.frontmatter.is_none());
    assert!(p.operations.iter().any(|op| op.target_path == Path::new("/r/src")));
}

#[test]
fn repeaters_are_bounded()
{
    let p = plan("name_$*5001.txt", &opts(), &MemoryFs::new()).expect("plan");
    assert_eq!(p.len(), 1000);
    assert_eq!(p.operations[999].name, "name_1000.txt");
}

#[test]
fn directory_count_per_depth_follows_indentation()
{
    let input = "a\n\tb\n\t\tc\n\t\td.txt\n\te\nf\n\tg\n";
    let p = plan(input, &opts(), &MemoryFs::new()).expect("plan");

    let dirs_at = |d: usize| {
        p.operations
            .iter()
            .filter(|op| op.kind == OperationType::Create && op.is_directory && op.depth == d)
            .count()
    };
    // Transitions: depth 0 twice (a, f), depth 1 three times (b, e, g), depth 2 once (c)
    assert_eq!(dirs_at(0), 2);
    assert_eq!(dirs_at(1), 3);
    assert_eq!(dirs_at(2), 1);
}

#[test]
fn planning_twice_gives_identical_plans()
{
    let fs = MemoryFs::new()
        .with_file("/tpl/a.txt", "a")
        .with_file("/tpl/sub/b.txt", "b");
    let input = "app\n\t[/tpl] > copy\n\t(/missing.txt) > m.txt\n";

    let first = plan(input, &opts(), &fs).expect("first");
    let second = plan(input, &opts(), &fs).expect("second");
    assert_eq!(first, second);

    // Planning never writes
    assert!(!fs.exists(Path::new("/r")));
}

#[test]
fn copied_directory_is_enumerated_one_level_deeper()
{
    let fs = MemoryFs::new()
        .with_file("/tpl/a.txt", "a")
        .with_file("/tpl/sub/b.txt", "b")
        .with_dir("/tpl/sub/empty");
    let p = plan("out\n\t[/tpl] > copy", &opts(), &fs).expect("plan");

    insta::assert_snapshot!(describe(&p), @r"
    create 0 /r/out [dir]
    copy 1 /r/out/copy <- /tpl [dir]
    included 2 /r/out/copy/a.txt <- /tpl/a.txt
    included 2 /r/out/copy/sub <- /tpl/sub [dir]
    included 3 /r/out/copy/sub/b.txt <- /tpl/sub/b.txt
    included 3 /r/out/copy/sub/empty <- /tpl/sub/empty [dir]
    ");

    let included = p
        .operations
        .iter()
        .filter(|op| op.kind == OperationType::Included)
        .count();
    assert_eq!(included, 4);
    assert_eq!(p.operations[2].parent, Some(1));
    assert_eq!(p.operations[4].parent, Some(3));
    assert_eq!(p.parent(5).map(|op| op.name.as_str()), Some("sub"));
}

#[test]
fn included_entries_are_renamed()
{
    let fs = MemoryFs::new().with_file("/tpl/__name__/__name__.rs", "");
    let options = opts().with_replacements(Replacements {
        all: vec![FileNameReplacement::new("__name__", "widget")],
        ..Replacements::default()
    });

    let p = plan("[/tpl] > __name__-pkg", &options, &fs).expect("plan");
    let targets: Vec<_> = p
        .operations
        .iter()
        .map(|op| op.target_path.clone())
        .collect();
    assert_eq!(
        targets,
        vec![
            PathBuf::from("/r/widget-pkg"),
            PathBuf::from("/r/widget-pkg/widget"),
            PathBuf::from("/r/widget-pkg/widget/widget.rs"),
        ]
    );
    // Sources keep their on-disk names
    assert_eq!(p.operations[2].source_path.as_deref(), Some(Path::new("/tpl/__name__/__name__.rs")));
}

#[test]
fn non_recursive_skips_enumeration()
{
    let fs = MemoryFs::new().with_file("/tpl/a.txt", "a");
    let p = plan("[/tpl] > copy", &opts().with_recursive(false), &fs).expect("plan");
    assert_eq!(p.len(), 1);
}

#[test]
fn missing_source_is_a_planning_warning()
{
    let p = plan("[/nonexistent] > copied.ts", &opts(), &MemoryFs::new()).expect("plan");
    let warnings: Vec<_> = p.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].1.contains("/nonexistent"));
}

#[test]
fn mixed_indentation_is_rejected()
{
    let err = plan("a\n\tb\n    c", &opts(), &MemoryFs::new()).unwrap_err();
    assert_eq!(err, PlanError::MixedIndentation { line: 3, expected: "tabs" });
}

#[cfg(unix)]
#[test]
fn self_linked_template_is_enumerated_once()
{
    use skelly::fs::LocalFs;

    let tmp = tempfile::TempDir::new().expect("tempdir");
    let tpl = tmp.path().join("tpl");
    std::fs::create_dir(&tpl).expect("mkdir");
    std::fs::write(tpl.join("f.txt"), "f").expect("write");
    std::os::unix::fs::symlink(&tpl, tpl.join("loop")).expect("symlink");

    let input = format!("[{}] > copy", tpl.display());
    let p = plan(&input, &StructureOptions::new(tmp.path().join("out")), &LocalFs).expect("plan");

    let included: Vec<_> = p
        .operations
        .iter()
        .filter(|op| op.kind == OperationType::Included)
        .map(|op| (op.name.as_str(), op.is_directory, op.depth))
        .collect();
    assert_eq!(included, [("f.txt", false, 1), ("loop", false, 1)]);
}
