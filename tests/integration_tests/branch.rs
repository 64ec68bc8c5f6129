//! S4–S6: projecting the local delta since the last squash onto a branch,
//! driven through the built CLI binary.

use crate::common::TestArea;

fn add_foo(area: &TestArea) {
    let integration_url = area.integration_url();
    area.cli_ok(&["add", &integration_url, "-m", "add subdir", "./foo"]);
}

/// S4 — branch unmodified.
#[test]
fn branch_unmodified_matches_integration_tip() {
    let area = TestArea::new();
    add_foo(&area);

    area.cli_ok(&["branch", "-b", "test-branch", "foo"]);

    let integration_ref = area.container.resolve("subdir-integration/foo/master").unwrap();
    assert_eq!(area.container.resolve("test-branch").unwrap(), integration_ref);
}

/// S5 — branch with one local change.
#[test]
fn branch_with_one_local_change() {
    let area = TestArea::new();
    add_foo(&area);

    area.commit_append_in_container("foo/sub-file.txt", "local sub line 3");

    let output = area.cli_ok(&["branch", "-b", "test-branch", "foo"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("test-branch"));

    let tip = area.container.resolve("test-branch").unwrap();
    let base = area.container.resolve("subdir-integration/foo/master").unwrap();

    let revs = area
        .container
        .run_command(&["rev-list", "--ancestry-path", &format!("{base}..{tip}")])
        .unwrap();
    let revs: Vec<&str> = revs.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(revs.len(), 1);
    assert_eq!(area.container.commit_subject(revs[0]).unwrap(), "local sub line 3");

    // No `.git-subdir` entry anywhere in the projected branch's trees.
    let tree_entries = area.container.run_command(&["ls-tree", "-r", "--name-only", tip.as_str()]).unwrap();
    assert!(!tree_entries.lines().any(|line| line.starts_with(".git-subdir")));
}

/// S6 — branch with interleaved changes.
#[test]
fn branch_with_interleaved_changes() {
    let area = TestArea::new();
    add_foo(&area);

    area.commit_append_in_container("foo/sub-file.txt", "local sub line 3");
    area.commit_append_in_container("other.txt", "other line 1");
    area.commit_append_in_container("foo/sub-file.txt", "local sub line 4");
    area.commit_append_in_container("other.txt", "other line 2");
    area.commit_append_in_container("foo/sub-file.txt", "local sub line 5");

    area.cli_ok(&["branch", "-b", "test-branch", "foo"]);

    let tip = area.container.resolve("test-branch").unwrap();
    let base = area.container.resolve("subdir-integration/foo/master").unwrap();

    let revs = area
        .container
        .run_command(&["rev-list", "--reverse", "--ancestry-path", &format!("{base}..{tip}")])
        .unwrap();
    let revs: Vec<&str> = revs.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(revs.len(), 3);
    assert_eq!(area.container.commit_subject(revs[0]).unwrap(), "local sub line 3");
    assert_eq!(area.container.commit_subject(revs[1]).unwrap(), "local sub line 4");
    assert_eq!(area.container.commit_subject(revs[2]).unwrap(), "local sub line 5");
}

/// Branching an unadded path reports `NotInitialized` (exit code 1).
#[test]
fn branch_of_non_subdir_is_rejected() {
    let area = TestArea::new();
    let output = area.run_cli(&["branch", "-b", "test-branch", "nope"]);
    assert_eq!(output.status.code(), Some(1), "stderr:\n{}", String::from_utf8_lossy(&output.stderr));
}
