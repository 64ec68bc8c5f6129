//! S1–S3: embedding an external repository into a new subdir, driven
//! through the built CLI binary.

use rstest::rstest;

use crate::common::TestArea;

/// S1/S2 — add with integration only, and with integration + upstream.
#[rstest]
#[case::integration_only(false)]
#[case::integration_and_upstream(true)]
fn add_materializes_and_records_metadata(#[case] with_upstream: bool) {
    let area = TestArea::new();
    let integration_url = area.integration_url();
    let upstream_url = area.upstream_url();

    let mut args = vec!["add", &integration_url, "-m", "add subdir"];
    if with_upstream {
        args.push("--upstream");
        args.push(&upstream_url);
    }
    args.push("./foo");

    let output = area.run_cli(&args);
    assert!(
        output.status.success(),
        "subdir add failed ({}):\n{}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    assert_eq!(
        area.config_get("foo/.git-subdir/config", "subdir.integration.url"),
        Some(integration_url)
    );
    if with_upstream {
        assert_eq!(
            area.config_get("foo/.git-subdir/config", "subdir.upstream.url"),
            Some(upstream_url)
        );
        let content = area.read_container_file("foo/sub-file.txt");
        assert!(content.contains("sub line 2\n"));
        assert!(!content.contains("upstream diverge 1\n"));
    } else {
        assert_eq!(area.config_get("foo/.git-subdir/config", "subdir.upstream.url"), None);
        assert!(area.read_container_file("foo/sub-file.txt").contains("sub line 2\n"));
    }
}

/// S3 — duplicate add is rejected with the `AlreadyInitialized` exit code.
#[test]
fn duplicate_add_is_rejected() {
    let area = TestArea::new();
    let integration_url = area.integration_url();
    let upstream_url = area.upstream_url();

    area.cli_ok(&["add", &integration_url, "-m", "add subdir", "./foo"]);
    let before = area.config_get("foo/.git-subdir/config", "subdir.integration.url");

    let output = area.run_cli(&["add", &integration_url, "--upstream", &upstream_url, "-m", "add subdir again", "./foo"]);
    assert_eq!(output.status.code(), Some(1), "stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already a subdir"));

    assert_eq!(area.config_get("foo/.git-subdir/config", "subdir.integration.url"), before);
    assert_eq!(area.config_get("foo/.git-subdir/config", "subdir.upstream.url"), None);
}

/// An empty integration URL is an argument error (exit code 2), not a panic.
#[test]
fn empty_integration_url_is_an_arg_error() {
    let area = TestArea::new();
    let output = area.run_cli(&["add", "", "-m", "add subdir", "./foo"]);
    assert_eq!(output.status.code(), Some(2), "stderr:\n{}", String::from_utf8_lossy(&output.stderr));
}
