//! A thin, testable facade over the git plumbing operations the core engine
//! needs: config read/write in an explicit file, ref resolution, ranged commit
//! listing, tree read/write, commit synthesis, cherry-pick, fetch/push.
//!
//! This is the sole place that assembles `git` command strings; everything
//! above this module works in terms of hashes, trees, and records.

pub mod error;

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use dashmap::DashMap;

/// Result of a cherry-pick attempt.
#[derive(Debug)]
pub enum CherryPickOutcome {
    /// Cherry-pick applied cleanly; carries the new commit hash.
    Ok(String),
    /// Cherry-pick left conflict markers; `CHERRY_PICK_HEAD` is set and the
    /// worktree is left for the user to resolve.
    Conflict,
}

/// Result of a push attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Ok,
    /// Non-fast-forward; the remote already has commits we don't.
    Rejected,
}

/// Author or committer identity for a synthesized commit.
#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub email: String,
    /// `@<unix-seconds> <offset>`, git's raw date format.
    pub date: String,
}

#[derive(Default)]
struct RepoCache {
    /// Memoizes `resolve()` within one invocation; refs are re-resolved across
    /// invocations since the whole point is they change between them.
    resolved: DashMap<String, String>,
}

/// A handle onto one git repository, identified by its working directory.
///
/// Cloning a `Repository` is cheap and shares the same resolution cache,
/// mirroring the handle pattern used for git worktrees: an explicit repo
/// handle threaded through every operation rather than relying on process-wide
/// current-directory state.
#[derive(Clone, Debug)]
pub struct Repository {
    root: PathBuf,
    cache: Arc<RepoCache>,
}

impl Repository {
    /// Open a repository rooted at an already-known working directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Arc::new(RepoCache::default()),
        }
    }

    /// Discover the repository containing the current working directory.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let repo = Self::at(cwd);
        let toplevel = repo.run_command(&["rev-parse", "--show-toplevel"])?;
        Ok(Self::at(dunce::canonicalize(toplevel.trim())?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run a git subcommand, returning trimmed-free stdout on success.
    ///
    /// Every call is logged at debug level before execution and its outcome
    /// after, so `--debug` reconstructs the exact plumbing sequence.
    pub fn run_command(&self, args: &[&str]) -> Result<String> {
        self.run_command_env(args, &[])
    }

    /// Like [`Repository::run_command`], additionally setting environment
    /// variables for this invocation only (used for the `GIT_INDEX_FILE`
    /// scratch-index technique in the squash engine).
    pub fn run_command_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<String> {
        log::debug!("git {} (cwd={})", args.join(" "), self.root.display());

        let mut cmd = StdCommand::new("git");
        cmd.args(args).current_dir(&self.root);
        for (key, value) in envs {
            cmd.env(key, value);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute: git {}", args.join(" ")))?;

        log::debug!(
            "git {} -> {}",
            args.join(" "),
            output.status.code().unwrap_or(-1)
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{}", message);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Like [`Repository::run_command`] but only reports success/failure,
    /// swallowing output. Used for existence checks.
    ///
    /// Logged the same way as [`Repository::run_command_env`] so `--debug`
    /// reconstructs the full plumbing sequence, including checks.
    pub fn run_command_check(&self, args: &[&str]) -> bool {
        log::debug!("git {} (cwd={})", args.join(" "), self.root.display());

        let result = StdCommand::new("git")
            .args(args)
            .current_dir(&self.root)
            .output();

        let code = result.as_ref().ok().and_then(|out| out.status.code()).unwrap_or(-1);
        log::debug!("git {} -> {}", args.join(" "), code);

        result.map(|out| out.status.success()).unwrap_or(false)
    }

    // -------------------------------------------------------------------
    // Config (operates on an explicit file, not repo-default config)
    // -------------------------------------------------------------------

    /// Read `key` from the repository's own config (not an explicit file),
    /// i.e. the identity an ordinary `git commit` would use.
    pub fn repo_config_get(&self, key: &str) -> Result<Option<String>> {
        match self.run_command(&["config", "--get", key]) {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(_) => Ok(None),
        }
    }

    /// The invoking user's identity, for commits authored directly by a
    /// command invocation (squash, add) rather than copied from a projected
    /// commit.
    pub fn current_identity(&self) -> Result<Identity> {
        let name = self
            .repo_config_get("user.name")?
            .context("git user.name is not configured")?;
        let email = self
            .repo_config_get("user.email")?
            .context("git user.email is not configured")?;
        Ok(Identity {
            name,
            email,
            date: crate::utils::now_git_date(),
        })
    }

    pub fn config_get(&self, file: &Path, key: &str) -> Result<Option<String>> {
        let file = file.to_string_lossy().into_owned();
        match self.run_command(&["config", "-f", &file, "--get", key]) {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(_) => Ok(None),
        }
    }

    pub fn config_set(&self, file: &Path, key: &str, value: &str) -> Result<()> {
        let file = file.to_string_lossy().into_owned();
        self.run_command(&["config", "-f", &file, key, value])?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Refs and history
    // -------------------------------------------------------------------

    /// Resolve a ref (symbolic name or partial hash) to its full commit hash.
    pub fn resolve(&self, rref: &str) -> Result<String> {
        if let Some(hash) = self.cache.resolved.get(rref) {
            return Ok(hash.clone());
        }
        let hash = self
            .run_command(&["rev-parse", rref])
            .with_context(|| format!("Failed to resolve ref '{rref}'"))?
            .trim()
            .to_string();
        self.cache.resolved.insert(rref.to_string(), hash.clone());
        Ok(hash)
    }

    pub fn ref_exists(&self, name: &str) -> bool {
        self.run_command_check(&["show-ref", "--verify", "--quiet", name])
    }

    /// List commits in `range` (e.g. `"base..tip"`) in oldest-first ancestry
    /// order along first-parent lineage, optionally restricted to paths.
    pub fn rev_list(&self, range: &str, paths: &[&str]) -> Result<Vec<String>> {
        let mut args = vec!["rev-list", "--reverse", "--first-parent", range];
        if !paths.is_empty() {
            args.push("--");
            args.extend(paths.iter().copied());
        }
        let out = self.run_command(&args)?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    /// Resolve the tree hash of `subpath` within `commit`. Returns `None` if
    /// the path does not exist at that commit.
    pub fn read_tree(&self, commit: &str, subpath: &str) -> Result<Option<String>> {
        let spec = format!("{commit}:{subpath}");
        match self.run_command(&["rev-parse", "--verify", "--quiet", &spec]) {
            Ok(hash) => Ok(Some(hash.trim().to_string())),
            Err(_) => Ok(None),
        }
    }

    pub fn commit_message(&self, commit: &str) -> Result<String> {
        Ok(self.run_command(&["log", "-1", "--format=%B", commit])?.trim_end().to_string())
    }

    pub fn commit_subject(&self, commit: &str) -> Result<String> {
        Ok(self.run_command(&["log", "-1", "--format=%s", commit])?.trim().to_string())
    }

    pub fn author_identity(&self, commit: &str) -> Result<Identity> {
        let raw = self.run_command(&["log", "-1", "--format=%an\x1f%ae\x1f%ad", "--date=raw", commit])?;
        let mut parts = raw.trim_end().splitn(3, '\x1f');
        let name = parts.next().unwrap_or_default().to_string();
        let email = parts.next().unwrap_or_default().to_string();
        let date = parts.next().unwrap_or_default().to_string();
        Ok(Identity { name, email, date })
    }

    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        self.run_command_check(&["merge-base", "--is-ancestor", ancestor, descendant])
    }

    // -------------------------------------------------------------------
    // Commit and tree synthesis
    // -------------------------------------------------------------------

    /// Create a commit from an already-written tree with explicit parents,
    /// message, and authorship/committer identities.
    pub fn commit_tree(
        &self,
        tree: &str,
        parents: &[&str],
        message: &str,
        author: &Identity,
        committer: &Identity,
    ) -> Result<String> {
        let mut args = vec!["commit-tree".to_string(), tree.to_string()];
        for parent in parents {
            args.push("-p".to_string());
            args.push(parent.to_string());
        }
        args.push("-m".to_string());
        args.push(message.to_string());

        let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();
        let envs = [
            ("GIT_AUTHOR_NAME", author.name.as_str()),
            ("GIT_AUTHOR_EMAIL", author.email.as_str()),
            ("GIT_AUTHOR_DATE", author.date.as_str()),
            ("GIT_COMMITTER_NAME", committer.name.as_str()),
            ("GIT_COMMITTER_EMAIL", committer.email.as_str()),
            ("GIT_COMMITTER_DATE", committer.date.as_str()),
        ];
        Ok(self.run_command_env(&args_ref, &envs)?.trim().to_string())
    }

    pub fn checkout_detached(&self, commit: &str) -> Result<()> {
        self.run_command(&["checkout", "--detach", commit])?;
        Ok(())
    }

    /// The short name of the branch `HEAD` currently points at. Fails if
    /// `HEAD` is detached.
    pub fn current_branch(&self) -> Result<String> {
        Ok(self
            .run_command(&["symbolic-ref", "--short", "HEAD"])?
            .trim()
            .to_string())
    }

    pub fn checkout_branch(&self, name: &str) -> Result<()> {
        self.run_command(&["checkout", name])?;
        Ok(())
    }

    /// Cherry-pick `commit` onto the current `HEAD`.
    pub fn cherry_pick(&self, commit: &str) -> Result<CherryPickOutcome> {
        let succeeded = self.run_command_check(&["cherry-pick", "--keep-redundant-commits", commit]);
        if succeeded {
            let head = self.resolve("HEAD")?;
            Ok(CherryPickOutcome::Ok(head))
        } else if self.root.join(".git/CHERRY_PICK_HEAD").exists() {
            Ok(CherryPickOutcome::Conflict)
        } else {
            bail!("cherry-pick of {commit} failed without leaving CHERRY_PICK_HEAD")
        }
    }

    pub fn update_ref(&self, name: &str, hash: &str) -> Result<()> {
        self.run_command(&["update-ref", name, hash])?;
        Ok(())
    }

    /// Move the current branch to `commit` and reset the index and working
    /// tree to match, discarding local modifications. The one place a
    /// domain module is allowed to touch the working tree after assembling a
    /// commit purely out of tree/blob plumbing.
    pub fn reset_hard(&self, commit: &str) -> Result<()> {
        self.run_command(&["reset", "--hard", commit])?;
        Ok(())
    }

    /// Raw `ls-tree` lines (`<mode> <type> <hash>\t<name>`) for the immediate
    /// children of `tree`.
    fn ls_tree_entries(&self, tree: &str) -> Result<Vec<String>> {
        let out = self.run_command(&["ls-tree", tree])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    /// Write `content` as a blob, returning its hash.
    pub fn write_blob(&self, content: &str) -> Result<String> {
        use std::io::Write;
        let mut child = StdCommand::new("git")
            .args(["hash-object", "-w", "--stdin"])
            .current_dir(&self.root)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .context("Failed to spawn git hash-object")?;
        child
            .stdin
            .as_mut()
            .expect("stdin was piped")
            .write_all(content.as_bytes())?;
        let output = child.wait_with_output().context("Failed to wait on git hash-object")?;
        if !output.status.success() {
            bail!("{}", String::from_utf8_lossy(&output.stderr).trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Build a single-entry tree containing one blob named `name`.
    pub fn blob_tree(&self, name: &str, blob_hash: &str) -> Result<String> {
        self.mktree(&[format!("100644 blob {blob_hash}\t{name}")])
    }

    /// The empty tree, for splicing a subdir into a container that has no
    /// commits yet.
    pub fn empty_tree(&self) -> Result<String> {
        self.mktree(&[])
    }

    /// Build a tree object from raw `ls-tree`-format entry lines.
    pub(crate) fn mktree(&self, entries: &[String]) -> Result<String> {
        use std::io::Write;
        let mut child = StdCommand::new("git")
            .arg("mktree")
            .current_dir(&self.root)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .context("Failed to spawn git mktree")?;
        {
            let stdin = child.stdin.as_mut().expect("stdin was piped");
            for entry in entries {
                writeln!(stdin, "{entry}")?;
            }
        }
        let output = child.wait_with_output().context("Failed to wait on git mktree")?;
        if !output.status.success() {
            bail!("{}", String::from_utf8_lossy(&output.stderr).trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Return `tree` with its top-level `name` entry removed. A no-op
    /// (returns `tree` unchanged) if no such entry exists.
    pub fn tree_without_entry(&self, tree: &str, name: &str) -> Result<String> {
        let entries = self.ls_tree_entries(tree)?;
        let filtered: Vec<String> = entries
            .into_iter()
            .filter(|line| !line.ends_with(&format!("\t{name}")))
            .collect();
        self.mktree(&filtered)
    }

    /// Return `tree` with its top-level `name` entry replaced (or inserted)
    /// to point at `child_tree` (mode `040000`, type `tree`).
    pub fn tree_with_entry(&self, tree: &str, name: &str, child_tree: &str) -> Result<String> {
        let mut entries: Vec<String> = self
            .ls_tree_entries(tree)?
            .into_iter()
            .filter(|line| !line.ends_with(&format!("\t{name}")))
            .collect();
        entries.push(format!("040000 tree {child_tree}\t{name}"));
        self.mktree(&entries)
    }

    /// Return `root_tree` with the subtree at `path` (which may be nested,
    /// e.g. `"vendor/foo"`) replaced wholesale by `new_subtree`, creating
    /// `path` if it did not previously exist.
    ///
    /// Uses a scratch index file rather than the repository's real index, so
    /// this never disturbs the caller's staged changes or working tree —
    /// the classic `git-subtree` tree-splicing technique.
    pub fn replace_path_in_tree(&self, root_tree: &str, path: &str, new_subtree: &str) -> Result<String> {
        let scratch = tempfile::NamedTempFile::new().context("Failed to create scratch index")?;
        let index_path = scratch.path().to_string_lossy().into_owned();
        let envs = [("GIT_INDEX_FILE", index_path.as_str())];

        self.run_command_env(&["read-tree", root_tree], &envs)?;
        self.run_command_env(
            &["rm", "--cached", "-r", "--ignore-unmatch", "--", path],
            &envs,
        )?;
        let prefix = format!("{path}/");
        self.run_command_env(&["read-tree", "--prefix", &prefix, new_subtree], &envs)?;
        Ok(self.run_command_env(&["write-tree"], &envs)?.trim().to_string())
    }

    // -------------------------------------------------------------------
    // Remotes
    // -------------------------------------------------------------------

    /// Fetch `branch` from `url`, returning the fetched tip's commit hash.
    pub fn fetch(&self, url: &str, branch: &str) -> Result<String> {
        self.run_command(&["fetch", url, branch])
            .with_context(|| format!("Failed to fetch '{branch}' from {url}"))?;
        self.resolve("FETCH_HEAD")
    }

    /// Push `hash` to `branch` on `url`. Non-fast-forward is reported as
    /// [`PushOutcome::Rejected`] rather than an error.
    pub fn push(&self, url: &str, branch: &str, hash: &str) -> Result<PushOutcome> {
        let refspec = format!("{hash}:refs/heads/{branch}");
        match self.run_command(&["push", url, &refspec]) {
            Ok(_) => Ok(PushOutcome::Ok),
            Err(err) => {
                let message = err.to_string();
                if message.contains("[rejected]") || message.contains("non-fast-forward") {
                    Ok(PushOutcome::Rejected)
                } else {
                    Err(err)
                }
            }
        }
    }
}
