mod repos;

use git_rb::client::ScmClient;
use git_rb::config::ClientOptions;
use repos::test_repo::{TestRepo, diff_paths};
use std::fs;

fn tracking_main() -> ClientOptions {
    ClientOptions {
        tracking: Some("origin/main".to_string()),
        ..Default::default()
    }
}

/// main (pushed) -> base (local) -> feature (local, checked out)
fn stacked_branches() -> (TestRepo, TestRepo) {
    let (local, upstream) = TestRepo::new_with_remote();

    local.git(&["checkout", "-q", "-b", "base"]).unwrap();
    local.write_file("base.txt", "base line\n");
    local.commit_all("Add base file");

    local.git(&["checkout", "-q", "-b", "feature"]).unwrap();
    local.write_file("feature.txt", "feature line\n");
    local.write_file("README.md", "# project\n\nNow with features.\n");
    local.commit_all("Add feature");

    (local, upstream)
}

fn apply_patch(repo: &TestRepo, worktree: &std::path::Path, name: &str, patch: &str) {
    let patch_path = repo.scratch_dir().join(name);
    fs::write(&patch_path, patch).unwrap();
    repo.git(&[
        "-C",
        worktree.to_str().unwrap(),
        "apply",
        "--index",
        patch_path.to_str().unwrap(),
    ])
    .unwrap();
}

#[test]
fn test_branch_diff_against_upstream() {
    let (local, _upstream) = TestRepo::new_with_remote();
    local.write_file("src/lib.rs", "pub fn answer() -> u32 {\n    42\n}\n");
    local.commit_all("Add library");

    let client = local.client(ClientOptions::default());
    let context = client.get_repository_info().unwrap().unwrap();
    let outcome = client.diff(&context).unwrap();

    let base = local.rev_parse("origin/main");
    assert_eq!(outcome.range.ancestor, base);
    assert_eq!(outcome.range.target, "refs/heads/main");
    assert!(outcome.diff.parent_diff.is_none());

    let diff = outcome.diff.primary_diff.unwrap();
    assert_eq!(diff_paths(&diff), vec!["src/lib.rs"]);
    assert!(diff.contains("+    42"));

    // --full-index: 40 hex digit blob ids
    let index_line = diff.lines().find(|l| l.starts_with("index ")).unwrap();
    let new_blob = index_line
        .trim_start_matches("index ")
        .split("..")
        .nth(1)
        .unwrap()
        .split(' ')
        .next()
        .unwrap();
    assert_eq!(new_blob.len(), 40);
}

#[test]
fn test_no_changes_gives_no_diff() {
    let (local, _upstream) = TestRepo::new_with_remote();
    let client = local.client(ClientOptions::default());
    let context = client.get_repository_info().unwrap().unwrap();

    let outcome = client.diff(&context).unwrap();
    assert!(outcome.diff.primary_diff.is_none());
    assert!(outcome.diff.parent_diff.is_none());
}

#[test]
fn test_missing_upstream_is_an_error() {
    let (local, _upstream) = TestRepo::new_with_remote();
    let options = ClientOptions {
        tracking: Some("origin/does-not-exist".to_string()),
        ..Default::default()
    };
    let client = local.client(options);
    let context = client.get_repository_info().unwrap().unwrap();
    assert!(client.diff(&context).is_err());
}

#[test]
fn test_parent_branch_diffs_compose() {
    let (local, _upstream) = stacked_branches();
    let options = ClientOptions {
        parent_branch: Some("base".to_string()),
        ..tracking_main()
    };
    let client = local.client(options);
    let context = client.get_repository_info().unwrap().unwrap();
    let outcome = client.diff(&context).unwrap();

    let merge_base = local.rev_parse("origin/main");
    assert_eq!(outcome.range.ancestor, "base");
    assert_eq!(outcome.range.target, "refs/heads/feature");

    let primary = outcome.diff.primary_diff.unwrap();
    let parent = outcome.diff.parent_diff.unwrap();
    assert_eq!(diff_paths(&parent), vec!["base.txt"]);
    assert_eq!(diff_paths(&primary), vec!["README.md", "feature.txt"]);

    // Parent then primary on top of the merge base rebuilds the feature tree.
    let worktree = local.scratch_dir().join("replay");
    local
        .git(&[
            "worktree",
            "add",
            "-q",
            "--detach",
            worktree.to_str().unwrap(),
            &merge_base,
        ])
        .unwrap();
    apply_patch(&local, &worktree, "parent.patch", &parent);
    apply_patch(&local, &worktree, "primary.patch", &primary);

    let tree = local
        .git(&["-C", worktree.to_str().unwrap(), "write-tree"])
        .unwrap();
    assert_eq!(tree.trim(), local.rev_parse("feature^{tree}"));
}

#[test]
fn test_single_revision_on_remote_needs_no_parent() {
    let (local, _upstream) = stacked_branches();
    let client = local.client(tracking_main());
    let context = client.get_repository_info().unwrap().unwrap();

    let outcome = client
        .diff_between_revisions(&context, "origin/main")
        .unwrap()
        .unwrap();
    assert_eq!(outcome.range.ancestor, "origin/main");
    assert_eq!(outcome.range.target, "refs/heads/feature");
    assert!(outcome.diff.parent_diff.is_none());
    assert_eq!(
        diff_paths(&outcome.diff.primary_diff.unwrap()),
        vec!["README.md", "base.txt", "feature.txt"]
    );
}

#[test]
fn test_single_local_revision_adds_parent_diff() {
    let (local, _upstream) = stacked_branches();
    let client = local.client(tracking_main());
    let context = client.get_repository_info().unwrap().unwrap();

    let outcome = client
        .diff_between_revisions(&context, "base")
        .unwrap()
        .unwrap();
    assert_eq!(outcome.range.ancestor, "base");
    assert_eq!(
        diff_paths(&outcome.diff.parent_diff.unwrap()),
        vec!["base.txt"]
    );
    assert_eq!(
        diff_paths(&outcome.diff.primary_diff.unwrap()),
        vec!["README.md", "feature.txt"]
    );
}

#[test]
fn test_revision_pair() {
    let (local, _upstream) = stacked_branches();
    let client = local.client(tracking_main());
    let context = client.get_repository_info().unwrap().unwrap();

    let outcome = client
        .diff_between_revisions(&context, "origin/main:base")
        .unwrap()
        .unwrap();
    assert_eq!(outcome.range.ancestor, "origin/main");
    assert_eq!(outcome.range.target, "base");
    assert!(outcome.diff.parent_diff.is_none());
    assert_eq!(
        diff_paths(&outcome.diff.primary_diff.unwrap()),
        vec!["base.txt"]
    );
}

#[test]
fn test_invalid_revisions_give_none() {
    let (local, _upstream) = stacked_branches();
    let client = local.client(tracking_main());
    let context = client.get_repository_info().unwrap().unwrap();

    for revision_range in ["no-such-branch", "base:no-such-branch", "a:b:c", ""] {
        assert!(
            client
                .diff_between_revisions(&context, revision_range)
                .unwrap()
                .is_none(),
            "{:?} should not resolve",
            revision_range
        );
    }
}

#[test]
fn test_guessed_summary_and_description() {
    let (local, _upstream) = TestRepo::new_with_remote();
    local.write_file("widget.txt", "one\n");
    local.commit_all("Add widget\n\nThe widget does things.");
    local.write_file("widget.txt", "one\ntwo\n");
    local.commit_all("Tweak widget");

    let options = ClientOptions {
        guess_summary: true,
        guess_description: true,
        ..Default::default()
    };
    let client = local.client(options);
    let context = client.get_repository_info().unwrap().unwrap();
    let outcome = client.diff(&context).unwrap();

    assert_eq!(outcome.guesses.summary.as_deref(), Some("Add widget"));
    let description = outcome.guesses.description.unwrap();
    assert!(description.starts_with("Add widget\n\nThe widget does things."));
    assert!(description.ends_with("Tweak widget"));
}

#[test]
fn test_supplied_summary_is_not_guessed() {
    let (local, _upstream) = TestRepo::new_with_remote();
    local.write_file("widget.txt", "one\n");
    local.commit_all("Add widget");

    let options = ClientOptions {
        guess_summary: true,
        summary: Some("My own summary".to_string()),
        ..Default::default()
    };
    let client = local.client(options);
    let context = client.get_repository_info().unwrap().unwrap();
    let outcome = client.diff(&context).unwrap();
    assert!(outcome.guesses.summary.is_none());
    assert!(outcome.guesses.description.is_none());
}

#[test]
fn test_diff_outcome_serializes_flat() {
    let (local, _upstream) = TestRepo::new_with_remote();
    local.write_file("a.txt", "a\n");
    local.commit_all("Add a");

    let options = ClientOptions {
        guess_summary: true,
        ..Default::default()
    };
    let client = local.client(options);
    let context = client.get_repository_info().unwrap().unwrap();
    let json = serde_json::to_value(client.diff(&context).unwrap()).unwrap();

    assert!(json["primary_diff"].as_str().unwrap().contains("a.txt"));
    assert!(json["parent_diff"].is_null());
    assert_eq!(json["range"]["target"], "refs/heads/main");
    assert_eq!(json["summary"], "Add a");
    assert!(json.get("description").is_none());
}

#[test]
fn test_resolve_plan_without_diffing() {
    let (local, _upstream) = stacked_branches();
    let client = local.client(tracking_main());
    let context = client.get_repository_info().unwrap().unwrap();

    let plan = client.resolve_plan(&context, Some("base")).unwrap().unwrap();
    assert_eq!(plan.primary.ancestor, "base");
    assert_eq!(plan.primary.target, "refs/heads/feature");
    assert_eq!(plan.parent.unwrap().target, "base");

    let branch_plan = client.resolve_plan(&context, None).unwrap().unwrap();
    assert_eq!(branch_plan.primary.ancestor, local.rev_parse("origin/main"));
    assert!(branch_plan.parent.is_none());

    assert!(client.resolve_plan(&context, Some("nope")).unwrap().is_none());
}
