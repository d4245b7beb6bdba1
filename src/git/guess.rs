use serde::Serialize;

use crate::config::ClientOptions;
use crate::git::repository::Repository;
use crate::git::revision::RevisionRange;

/// Summary and description guessed from commit messages. Fields stay `None`
/// when not requested or when the caller already supplied a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Guesses {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub fn guess_for_range(repo: &Repository, options: &ClientOptions, range: &RevisionRange) -> Guesses {
    Guesses {
        summary: options
            .wants_summary_guess()
            .then(|| guess_summary(repo, range)),
        description: options
            .wants_description_guess()
            .then(|| guess_description(repo, range)),
    }
}

/// The one-line subject of the oldest commit in `(ancestor, target]`, with
/// newlines collapsed to spaces.
pub fn guess_summary(repo: &Repository, range: &RevisionRange) -> String {
    let exclude = format!("^{}", range.ancestor);
    let Some(first_commit) = repo
        .git_opt(&["rev-list", "--reverse", "--parents", &exclude, &range.target])
        .and_then(|out| {
            out.lines()
                .next()
                .and_then(|line| line.split(' ').next())
                .map(str::to_string)
        })
        .filter(|c| !c.is_empty())
    else {
        return String::new();
    };

    // `<c> ^<c>^` shows only the commit itself
    let exclude_parent = format!("^{}^", first_commit);
    let subject = repo
        .git_opt(&[
            "log",
            "--no-merges",
            "--pretty=format:%s",
            &first_commit,
            &exclude_parent,
        ])
        .or_else(|| {
            // A root commit has no parent to exclude
            repo.git_opt(&["log", "-1", "--no-merges", "--pretty=format:%s", &first_commit])
        })
        .unwrap_or_default();
    subject.replace('\n', " ").trim().to_string()
}

/// Subject and body of every non-merge commit in `(ancestor, target]`, oldest first.
pub fn guess_description(repo: &Repository, range: &RevisionRange) -> String {
    repo.git_opt(&[
        "log",
        "--reverse",
        "--no-merges",
        "--pretty=format:%s%n%n%b",
        &range.to_git_range(),
    ])
    .unwrap_or_default()
    .trim()
    .to_string()
}
