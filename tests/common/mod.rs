#![allow(dead_code)]

//! Three-repository harness for the literal test scenarios: an upstream
//! repository, an integration clone of it, and a container repository that
//! embeds subdirs sourced from the integration clone.
//!
//! Mirrors the fixture every scenario needs: upstream commits `sub-file.txt`
//! with three lines, integration is cloned from upstream at that point, then
//! upstream diverges by one more prepended line, and the container gets its
//! own two commits plus a sibling file. Individual tests then drive `add`,
//! `branch`, `rebase`, and `push` against this starting point, either
//! through the engine directly (fixture setup, and whitebox assertions on
//! the resulting objects) or by spawning the built CLI binary via
//! [`TestArea::cli`].

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

use subdir::vcs::Repository;

const TEST_DATE: &str = "@1735689600 +0000";
const TEST_EPOCH: &str = "1735689600";

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// Environment every git invocation the harness makes is run with, so the
/// suite never reads the invoking user's global `~/.gitconfig`, prompts on a
/// terminal, or picks up a non-English locale that would make porcelain
/// output assertions flaky.
fn isolation_envs() -> [(&'static str, &'static str); 5] {
    [
        ("GIT_CONFIG_GLOBAL", NULL_DEVICE),
        ("GIT_CONFIG_SYSTEM", NULL_DEVICE),
        ("GIT_TERMINAL_PROMPT", "0"),
        ("LC_ALL", "C"),
        ("LANG", "C"),
    ]
}

/// Run a git subcommand against `repo` with the isolation environment plus
/// any `extra_envs` (e.g. author/committer dates) applied.
fn git(repo: &Repository, args: &[&str], extra_envs: &[(&str, &str)]) -> String {
    let mut envs = isolation_envs().to_vec();
    envs.extend_from_slice(extra_envs);
    repo.run_command_env(args, &envs).unwrap()
}

fn init_repo(dir: &std::path::Path) -> Repository {
    let repo = Repository::at(dir);
    git(&repo, &["init", "-q", "-b", "master"], &[]);
    git(&repo, &["config", "user.name", "Test User"], &[]);
    git(&repo, &["config", "user.email", "test@example.com"], &[]);
    git(&repo, &["config", "receive.denyCurrentBranch", "ignore"], &[]);
    repo
}

fn commit_file(repo: &Repository, filename: &str, contents: &str, message: &str) -> String {
    std::fs::write(repo.root().join(filename), contents).unwrap();
    git(repo, &["add", "--", filename], &[]);
    git(
        repo,
        &["commit", "-q", "-m", message, "--", filename],
        &[("GIT_AUTHOR_DATE", TEST_DATE), ("GIT_COMMITTER_DATE", TEST_DATE)],
    );
    repo.resolve("HEAD").unwrap()
}

fn append_line(repo: &Repository, filename: &str, line: &str) -> String {
    let path = repo.root().join(filename);
    let mut content = std::fs::read_to_string(&path).unwrap_or_default();
    content.push_str(line);
    content.push('\n');
    commit_file(repo, filename, &content, line)
}

fn prepend_line(repo: &Repository, filename: &str, line: &str) -> String {
    let path = repo.root().join(filename);
    let existing = std::fs::read_to_string(&path).unwrap_or_default();
    let content = format!("{line}\n{existing}");
    commit_file(repo, filename, &content, line)
}

/// The three repositories every scenario starts from, plus the tempdir
/// keeping them alive.
pub struct TestArea {
    _dir: TempDir,
    pub upstream: Repository,
    pub integration: Repository,
    pub container: Repository,
}

impl TestArea {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create test area");

        let upstream_path = dir.path().join("subdir_upstream");
        std::fs::create_dir(&upstream_path).unwrap();
        let upstream = init_repo(&upstream_path);
        commit_file(&upstream, "sub-file.txt", "initial content\n", "initial");
        append_line(&upstream, "sub-file.txt", "sub line 1");
        append_line(&upstream, "sub-file.txt", "sub line 2");

        let integration_path = dir.path().join("subdir_integration");
        let clone_source = upstream_path.to_string_lossy().into_owned();
        let clone_dest = integration_path.to_string_lossy().into_owned();
        git(&Repository::at(dir.path()), &["clone", "-q", &clone_source, &clone_dest], &[]);
        let integration = Repository::at(&integration_path);
        git(&integration, &["config", "receive.denyCurrentBranch", "ignore"], &[]);

        prepend_line(&upstream, "sub-file.txt", "upstream diverge 1");

        let container_path = dir.path().join("container_repo");
        std::fs::create_dir(&container_path).unwrap();
        let container = init_repo(&container_path);
        commit_file(&container, "file.txt", "initial content\n", "initial");
        append_line(&container, "file.txt", "line 1");
        commit_file(&container, "other.txt", "initial content\n", "create other file");

        Self {
            _dir: dir,
            upstream,
            integration,
            container,
        }
    }

    pub fn upstream_url(&self) -> String {
        self.upstream.root().to_string_lossy().into_owned()
    }

    pub fn integration_url(&self) -> String {
        self.integration.root().to_string_lossy().into_owned()
    }

    /// Append `line` to `path` (relative to the container root) and commit.
    pub fn commit_append_in_container(&self, path: &str, line: &str) -> String {
        append_line(&self.container, path, line)
    }

    pub fn commit_prepend_in_upstream(&self, line: &str) -> String {
        prepend_line(&self.upstream, "sub-file.txt", line)
    }

    pub fn commit_prepend_in_integration(&self, line: &str) -> String {
        prepend_line(&self.integration, "sub-file.txt", line)
    }

    pub fn read_container_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.container.root().join(path)).unwrap_or_default()
    }

    pub fn config_get(&self, subdir_config_path: &str, key: &str) -> Option<String> {
        self.container
            .config_get(&PathBuf::from(subdir_config_path), key)
            .unwrap()
    }

    /// A `subdir` invocation rooted at the container, isolated the same way
    /// the engine-level git calls above are, plus a pinned `SOURCE_DATE_EPOCH`
    /// so commits the CLI synthesizes (via `Repository::current_identity`)
    /// get a reproducible date.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_subdir"));
        cmd.current_dir(self.container.root());
        for (key, value) in isolation_envs() {
            cmd.env(key, value);
        }
        cmd.env("SOURCE_DATE_EPOCH", TEST_EPOCH);
        cmd.env("RUST_LOG", "warn");
        cmd
    }

    /// Run a `subdir` subcommand and return its captured output. Never
    /// panics on a non-zero exit; callers assert on `status`/`stderr`
    /// themselves to exercise the CLI's exit-code contract.
    pub fn run_cli(&self, args: &[&str]) -> Output {
        self.cli().args(args).output().expect("failed to spawn subdir binary")
    }

    /// Run a `subdir` subcommand and panic with its stderr if it didn't
    /// succeed. Convenience for fixture steps within a test that aren't
    /// themselves the behavior under test.
    pub fn cli_ok(&self, args: &[&str]) -> Output {
        let output = self.run_cli(args);
        assert!(
            output.status.success(),
            "subdir {} failed ({}):\n{}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }
}
