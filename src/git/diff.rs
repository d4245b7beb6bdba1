use serde::Serialize;

use crate::error::GitRbError;
use crate::git::repository::Repository;
use crate::git::revision::{DiffPlan, RevisionRange};
use crate::git::svn_diff::make_svn_diff;
use crate::git::upstream::Backend;
use crate::utils::debug_log;

/// Diff text for one review: the primary diff and an optional parent diff that
/// must be applied before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub primary_diff: Option<String>,
    pub parent_diff: Option<String>,
}

/// `git diff` options per backend.
fn diff_args(backend: &Backend) -> &'static [&'static str] {
    match backend {
        // Full blob ids keep index lines stable no matter the local abbreviation length.
        Backend::Native => &[
            "diff",
            "--no-color",
            "--full-index",
            "--no-ext-diff",
            "--ignore-submodules",
        ],
        Backend::SvnBridge(_) => &[
            "diff",
            "--no-color",
            "--no-prefix",
            "--no-ext-diff",
            "-r",
            "-u",
        ],
    }
}

/// Produce the diff for `(range.ancestor, range.target]`.
///
/// Returns `Ok(None)` when git can't diff the range (unknown revisions) or when the
/// range has no changes. An SVN-bridge diff that can't be stamped with a revision
/// is a `TranslationUnavailable` error, not an empty result.
pub fn make_diff(
    repo: &Repository,
    backend: &Backend,
    range: &RevisionRange,
) -> Result<Option<String>, GitRbError> {
    let git_range = range.to_git_range();
    let mut args: Vec<&str> = diff_args(backend).to_vec();
    args.push(&git_range);

    let raw = match repo.git(&args) {
        Ok(raw) => raw,
        Err(GitRbError::GitCliError { stderr, .. }) => {
            debug_log(&format!("cannot diff {}: {}", git_range, stderr.trim()));
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    if raw.is_empty() {
        return Ok(None);
    }

    match backend {
        Backend::Native => Ok(Some(raw)),
        Backend::SvnBridge(_) => make_svn_diff(repo, &range.ancestor, &raw).map(Some),
    }
}

/// Produce both diffs of a plan. The two invocations share no state.
pub fn run_plan(
    repo: &Repository,
    backend: &Backend,
    plan: &DiffPlan,
) -> Result<DiffResult, GitRbError> {
    let primary_diff = make_diff(repo, backend, &plan.primary)?;
    let parent_diff = match &plan.parent {
        Some(range) => make_diff(repo, backend, range)?,
        None => None,
    };
    Ok(DiffResult {
        primary_diff,
        parent_diff,
    })
}
