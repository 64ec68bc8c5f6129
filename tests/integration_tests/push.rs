//! S9: publishing a rebase's result to the integration remote, driven
//! through the built CLI binary.

use crate::common::TestArea;

fn add_foo_with_upstream(area: &TestArea) {
    let integration_url = area.integration_url();
    let upstream_url = area.upstream_url();
    area.cli_ok(&["add", &integration_url, "--upstream", &upstream_url, "-m", "add subdir", "./foo"]);
}

/// S9 — push after rebase reaches the integration remote.
#[test]
fn push_after_rebase_reaches_integration_remote() {
    let area = TestArea::new();
    add_foo_with_upstream(&area);

    area.commit_append_in_container("foo/sub-file.txt", "local sub line 3");
    area.commit_append_in_container("other.txt", "other line 1");
    area.commit_append_in_container("foo/sub-file.txt", "local sub line 4");
    area.commit_append_in_container("other.txt", "other line 2");
    area.commit_append_in_container("foo/sub-file.txt", "local sub line 5");

    area.commit_prepend_in_upstream("upstream update 1");
    area.commit_prepend_in_upstream("upstream update 2");

    area.cli_ok(&["rebase", "-m", "rebase foo", "foo"]);

    let output = area.cli_ok(&["push", "foo"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let remote_tip = area.integration.resolve("master").unwrap();
    assert!(stdout.contains(&remote_tip), "stdout {stdout:?} doesn't mention pushed tip {remote_tip}");
}

/// Pushing with `--upstream` reaches the upstream remote, not integration.
#[test]
fn push_upstream_reaches_upstream_remote() {
    let area = TestArea::new();
    add_foo_with_upstream(&area);

    area.commit_append_in_container("foo/sub-file.txt", "local sub line 3");
    area.commit_prepend_in_upstream("upstream update 1");

    area.cli_ok(&["rebase", "-m", "rebase foo", "foo"]);
    area.cli_ok(&["push", "--upstream", "foo"]);

    let local_tip = area.container.resolve("subdir-local/foo").unwrap();
    let upstream_remote_tip = area.upstream.resolve("master").unwrap();
    let integration_remote_tip = area.integration.resolve("master").unwrap();

    assert_eq!(upstream_remote_tip, local_tip);
    assert_ne!(integration_remote_tip, local_tip);
}

/// A push that would not fast-forward the remote is rejected with the
/// `PushRejected` exit code (7), not silently force-pushed.
#[test]
fn push_non_fast_forward_is_rejected() {
    let area = TestArea::new();
    add_foo_with_upstream(&area);

    area.commit_append_in_container("foo/sub-file.txt", "local sub line 3");
    area.cli_ok(&["rebase", "-m", "rebase foo", "foo"]);

    // Someone else pushes directly to the integration remote in the
    // meantime, so our recorded rebase is no longer a fast-forward of it.
    area.commit_prepend_in_integration("other racer's commit");

    let output = area.run_cli(&["push", "foo"]);
    assert_eq!(output.status.code(), Some(7), "stderr:\n{}", String::from_utf8_lossy(&output.stderr));
}

/// `--upstream` without a configured upstream is an argument error (exit
/// code 2).
#[test]
fn push_upstream_without_config_is_an_arg_error() {
    let area = TestArea::new();
    let integration_url = area.integration_url();
    area.cli_ok(&["add", &integration_url, "-m", "add subdir", "./foo"]);

    let output = area.run_cli(&["push", "--upstream", "foo"]);
    assert_eq!(output.status.code(), Some(2), "stderr:\n{}", String::from_utf8_lossy(&output.stderr));
}
