use serde::Serialize;

use crate::error::GitRbError;

/// A commit set `(ancestor, target]`: everything reachable from `target`
/// that is not reachable from `ancestor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionRange {
    pub ancestor: String,
    pub target: String,
}

impl RevisionRange {
    pub fn new(ancestor: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            ancestor: ancestor.into(),
            target: target.into(),
        }
    }

    /// `ancestor..target`, as git spells the range.
    pub fn to_git_range(&self) -> String {
        format!("{}..{}", self.ancestor, self.target)
    }
}

/// A user supplied revision argument: `R` or `R1:R2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionSpec {
    Single(String),
    Pair(String, String),
}

impl RevisionSpec {
    pub fn parse(revision_range: &str) -> Result<Self, GitRbError> {
        let revision_range = revision_range.trim();
        let invalid = || GitRbError::InvalidRevisionRange(revision_range.to_string());

        match revision_range.split_once(':') {
            None if revision_range.is_empty() => Err(invalid()),
            None => Ok(RevisionSpec::Single(revision_range.to_string())),
            Some((start, end)) => {
                if start.is_empty() || end.is_empty() || end.contains(':') {
                    return Err(invalid());
                }
                Ok(RevisionSpec::Pair(start.to_string(), end.to_string()))
            }
        }
    }

    /// The revision whose reachability decides whether a parent diff is needed.
    pub fn base(&self) -> &str {
        match self {
            RevisionSpec::Single(r) => r,
            RevisionSpec::Pair(r1, _) => r1,
        }
    }

    /// All revisions named by the argument, for validation.
    pub fn revisions(&self) -> Vec<&str> {
        match self {
            RevisionSpec::Single(r) => vec![r],
            RevisionSpec::Pair(r1, r2) => vec![r1, r2],
        }
    }
}

/// The diffs to produce for one review: a primary range and, when the primary
/// range doesn't start from history the server knows, a parent range leading up to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPlan {
    pub primary: RevisionRange,
    pub parent: Option<RevisionRange>,
}

/// Plan for the default diff of the current branch.
///
/// Without a parent branch this is `(merge_base, head]`. With one, the primary
/// diff starts at the parent branch and a parent diff covers
/// `(merge_base, parent_branch]` so the two compose into a full patch chain.
pub fn plan_branch_diff(merge_base: &str, head_ref: &str, parent_branch: Option<&str>) -> DiffPlan {
    match parent_branch {
        Some(parent) => DiffPlan {
            primary: RevisionRange::new(parent, head_ref),
            parent: Some(RevisionRange::new(merge_base, parent)),
        },
        None => DiffPlan {
            primary: RevisionRange::new(merge_base, head_ref),
            parent: None,
        },
    }
}

/// Plan for an explicit revision argument.
///
/// `base_on_remote` says whether the base revision of `spec` is already contained
/// in some remote-tracking branch; if it isn't, a parent diff from the merge base
/// up to it is added so the server never gets an unanchored patch.
pub fn plan_revision_diff(
    spec: &RevisionSpec,
    merge_base: &str,
    head_ref: &str,
    base_on_remote: bool,
) -> DiffPlan {
    let primary = match spec {
        RevisionSpec::Single(r) => RevisionRange::new(r.as_str(), head_ref),
        RevisionSpec::Pair(r1, r2) => RevisionRange::new(r1.as_str(), r2.as_str()),
    };
    let parent = if base_on_remote {
        None
    } else {
        Some(RevisionRange::new(merge_base, spec.base()))
    };
    DiffPlan { primary, parent }
}
