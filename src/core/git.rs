//! Local git repository operations
//!
//! This module provides a wrapper around git2 for the commit flow:
//! - Repository discovery and validation
//! - Staged diff extraction with path exclusions
//! - Staging tracked files and committing

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Signature, Tree};
use regex::Regex;
use tracing::debug;

use crate::error::{AicommitsError, Result};

/// Lock files never worth summarizing
const LOCK_FILES: [&str; 3] = ["package-lock.json", "pnpm-lock.yaml", "*.lock"];

/// Staged changes handed to the AI providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDiff {
    /// Paths of staged files, relative to the repository root
    pub files: Vec<String>,
    /// Unified diff of the staged changes
    pub diff: String,
}

/// Wrapper for local git repository operations
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the git repository in the current directory
    pub fn open_current_dir() -> Result<Self> {
        Self::discover(".")
    }

    /// Discover a git repository from the given path
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| AicommitsError::NotGitRepository)?;
        Ok(Self { repo })
    }

    /// Get the diff of staged changes
    ///
    /// Returns `None` when nothing is staged once `exclude` and lock files
    /// are filtered out.
    pub fn staged_diff(&self, exclude: &[String]) -> Result<Option<StagedDiff>> {
        let matcher = PathMatcher::new(exclude.iter().map(String::as_str).chain(LOCK_FILES))?;

        let head = self.head_tree()?;
        let mut index = self.repo.index()?;
        index.read(true)?;
        let mut opts = DiffOptions::new();
        opts.minimal(true);

        let diff = self
            .repo
            .diff_tree_to_index(head.as_ref(), Some(&index), Some(&mut opts))?;

        let files: Vec<String> = diff
            .deltas()
            .filter_map(|delta| delta_path(&delta))
            .filter(|path| !matcher.is_match(path))
            .collect();

        if files.is_empty() {
            debug!("No staged files after exclusions");
            return Ok(None);
        }

        Ok(Some(StagedDiff {
            diff: patch_text(&diff, &matcher)?,
            files,
        }))
    }

    /// Stage modifications and deletions of tracked files (`git add --update`)
    pub fn stage_tracked(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        index.read(true)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    /// Create a commit with the staged changes
    pub fn commit(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        index.read(true)?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if is_unborn(&e) => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let signature = self.repo.signature().or_else(|_| {
            // Fallback signature if not configured
            Signature::now("aicommits", "aicommits@localhost")
        })?;

        let commit_id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(commit_id.to_string())
    }

    /// Commit through system git so extra `git commit` flags and hooks apply
    pub fn commit_with_args(&self, message: &str, args: &[String]) -> Result<()> {
        let output = Command::new("git")
            .current_dir(self.root_dir()?)
            .args(["commit", "-m", message])
            .args(args)
            .output()
            .map_err(|e| AicommitsError::GitCommand(format!("Failed to execute git commit: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AicommitsError::GitCommand(format!(
                "Commit failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// Get the repository root directory
    pub fn root_dir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(|p| p.to_path_buf())
            .ok_or(AicommitsError::NotGitRepository)
    }

    /// HEAD tree, or `None` before the first commit
    fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_tree()?)),
            Err(e) if is_unborn(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_unborn(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

fn delta_path(delta: &git2::DiffDelta<'_>) -> Option<String> {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().replace('\\', "/"))
}

/// Render the patch for every file the matcher does not exclude
fn patch_text(diff: &Diff<'_>, matcher: &PathMatcher) -> Result<String> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        if delta_path(&delta).is_some_and(|path| matcher.is_match(&path)) {
            return true;
        }
        if matches!(line.origin(), '+' | '-' | ' ') {
            text.push(line.origin());
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(text)
}

/// Exclusion pathspecs: exact paths, directory prefixes and `*`/`?` globs
struct PathMatcher {
    patterns: Vec<Regex>,
}

impl PathMatcher {
    fn new<'a>(specs: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let patterns = specs
            .into_iter()
            .map(|spec| spec.trim().trim_start_matches(":(exclude)").trim_end_matches('/'))
            .filter(|spec| !spec.is_empty())
            .map(|spec| {
                Regex::new(&glob_to_regex(spec)).map_err(|e| {
                    AicommitsError::InvalidInput(format!("Invalid exclude pattern '{}': {}", spec, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }
}

/// Translate a pathspec glob into an anchored regex
///
/// As in git pathspecs, `*` also matches across `/`. A pattern also matches
/// everything below it when it names a directory.
fn glob_to_regex(spec: &str) -> String {
    let mut pattern = String::from("^");
    for c in spec.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push_str("(/.*)?$");
    pattern
}
