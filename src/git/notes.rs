//! Reviewer attribution stored in git notes (`refs/notes/commits`).

use crate::config::ClientOptions;
use crate::error::GitRbError;
use crate::git::repository::Repository;
use crate::git::revision::RevisionRange;
use crate::utils::debug_log;

const REVIEWED_BY: &str = "Reviewed-By:";

/// Build the `Reviewed-By:` line for a review.
///
/// People and groups are both optional; the review URL is always appended in
/// angle brackets.
pub fn reviewed_by_line(options: &ClientOptions, review_url: &str) -> String {
    let people = options.target_people.as_deref().filter(|p| !p.is_empty());
    let groups = options.target_groups.as_deref().filter(|g| !g.is_empty());

    let mut line = REVIEWED_BY.to_string();
    if let Some(people) = people {
        line.push(' ');
        line.push_str(people);
    }
    if people.is_some() && groups.is_some() {
        line.push_str(" and");
    }
    if let Some(groups) = groups {
        line.push_str(" groups:");
        line.push_str(groups);
    }
    line.push_str(&format!(" <{}>", review_url));
    line
}

fn is_reviewed_by(line: &str) -> bool {
    line.to_ascii_lowercase().contains("reviewed-by: ")
}

/// Replace any `Reviewed-By:` lines in a note with exactly one `reviewed_by` line.
pub fn rewrite_reviewed_by(existing: &str, reviewed_by: &str) -> String {
    let mut lines: Vec<&str> = existing.lines().filter(|l| !is_reviewed_by(l)).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.push(reviewed_by);
    let mut note = lines.join("\n");
    note.push('\n');
    note
}

/// The `Reviewed-By:` line of a note that already attributes the commit to `review_url`.
pub fn existing_review_line<'a>(note: &'a str, review_url: &str) -> Option<&'a str> {
    note.lines()
        .find(|line| line.starts_with("Reviewed-By: ") && line.contains(review_url))
}

pub fn notes_show(repo: &Repository, commit_sha: &str) -> Option<String> {
    repo.git_opt(&["notes", "show", commit_sha])
}

pub fn notes_add(repo: &Repository, commit_sha: &str, note_content: &str) -> Result<(), GitRbError> {
    // Read note content from stdin to avoid command line length limits
    repo.git_stdin(
        &["notes", "add", "-f", "-F", "-", commit_sha],
        note_content.as_bytes(),
    )?;
    Ok(())
}

/// Add reviewer attribution to every commit in `range`, oldest first.
///
/// Returns how many commits carry the attribution afterwards. When the oldest
/// commit already names the review, its `Reviewed-By:` line is reused for the
/// rest of the range instead of one built from `options`. Commits whose note
/// would not change are counted without being rewritten, so re-running against an
/// already annotated range is a no-op. A failed note write is skipped, not fatal.
pub fn update_commits_with_reviewer_info(
    repo: &Repository,
    range: &RevisionRange,
    options: &ClientOptions,
    review_url: &str,
) -> usize {
    let Some(mut commits) = repo.rev_list_reverse(&range.ancestor, &range.target) else {
        return 0;
    };
    if commits.is_empty() {
        return 0;
    }

    let mut num_successful_updates = 0;

    // Earlier runs against the same review already annotated the oldest commit.
    let mut reviewed_by = reviewed_by_line(options, review_url);
    if let Some(note) = notes_show(repo, &commits[0])
        && let Some(line) = existing_review_line(&note, review_url)
    {
        reviewed_by = line.to_string();
        commits.remove(0);
        num_successful_updates += 1;
    }

    for commit in &commits {
        let existing = notes_show(repo, commit).unwrap_or_default();
        let updated = rewrite_reviewed_by(&existing, &reviewed_by);
        if updated == existing {
            num_successful_updates += 1;
            continue;
        }
        match notes_add(repo, commit, &updated) {
            Ok(()) => num_successful_updates += 1,
            Err(e) => debug_log(&format!("failed to update notes for {}: {}", commit, e)),
        }
    }

    num_successful_updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn options(people: Option<&str>, groups: Option<&str>) -> ClientOptions {
        ClientOptions {
            target_people: people.map(String::from),
            target_groups: groups.map(String::from),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(Some("alice,bob"), None, "Reviewed-By: alice,bob <https://rb/r/1/>")]
    #[case(None, Some("core"), "Reviewed-By: groups:core <https://rb/r/1/>")]
    #[case(Some("alice"), Some("core"), "Reviewed-By: alice and groups:core <https://rb/r/1/>")]
    #[case(None, None, "Reviewed-By: <https://rb/r/1/>")]
    #[case(Some(""), Some("core"), "Reviewed-By: groups:core <https://rb/r/1/>")]
    fn test_reviewed_by_line(
        #[case] people: Option<&str>,
        #[case] groups: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(
            reviewed_by_line(&options(people, groups), "https://rb/r/1/"),
            expected
        );
    }

    #[test]
    fn test_rewrite_empty_note() {
        assert_eq!(
            rewrite_reviewed_by("", "Reviewed-By: alice <u>"),
            "Reviewed-By: alice <u>\n"
        );
    }

    #[test]
    fn test_rewrite_replaces_old_lines_case_insensitively() {
        let existing = "Tested on staging\nreviewed-by: bob <old>\nREVIEWED-BY: carol <older>\n\n";
        assert_eq!(
            rewrite_reviewed_by(existing, "Reviewed-By: alice <new>"),
            "Tested on staging\nReviewed-By: alice <new>\n"
        );
    }

    #[test]
    fn test_rewrite_is_stable() {
        let once = rewrite_reviewed_by("Some context\n", "Reviewed-By: alice <u>");
        let twice = rewrite_reviewed_by(&once, "Reviewed-By: alice <u>");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_existing_review_line() {
        assert_eq!(
            existing_review_line(
                "x\nReviewed-By: alice <https://rb/r/1/>\n",
                "https://rb/r/1/"
            ),
            Some("Reviewed-By: alice <https://rb/r/1/>")
        );
        assert_eq!(
            existing_review_line("Reviewed-By: alice <https://rb/r/2/>\n", "https://rb/r/1/"),
            None
        );
        assert_eq!(existing_review_line("", "https://rb/r/1/"), None);
    }
}
