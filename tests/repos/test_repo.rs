#![allow(dead_code)]

use git_rb::client::{GitClient, ScmClient};
use git_rb::config::ClientOptions;
use git_rb::git::upstream::RepositoryContext;
use git2::Repository;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A throwaway git repository on disk, removed when dropped.
pub struct TestRepo {
    dir: TempDir,
    path: PathBuf,
}

fn configure_identity(repo: &Repository) {
    let mut config = repo.config().expect("failed to open repository config");
    config
        .set_str("user.name", "Test User")
        .expect("failed to set user.name");
    config
        .set_str("user.email", "test@example.com")
        .expect("failed to set user.email");
    config
        .set_bool("commit.gpgsign", false)
        .expect("failed to set commit.gpgsign");
}

impl TestRepo {
    /// A fresh non-bare repository whose unborn branch is `main`.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("repo");
        let repo = Repository::init(&path).expect("failed to initialize git2 repository");
        configure_identity(&repo);
        repo.set_head("refs/heads/main")
            .expect("failed to point HEAD at main");
        Self { dir, path }
    }

    pub fn new_bare() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("repo.git");
        let repo = Repository::init_bare(&path).expect("failed to init bare repository");
        repo.set_head("refs/heads/main")
            .expect("failed to point HEAD at main");
        Self { dir, path }
    }

    /// Create a pair of test repos: a local clone and its bare upstream.
    ///
    /// The clone has one commit on `main` that is pushed, with `origin/main`
    /// configured as the tracking branch.
    pub fn new_with_remote() -> (Self, Self) {
        let upstream = Self::new_bare();

        let dir = TempDir::new().expect("failed to create temp dir");
        let mirror_path = dir.path().join("clone");
        let clone_output = Command::new("git")
            .args([
                "clone",
                upstream.path.to_str().unwrap(),
                mirror_path.to_str().unwrap(),
            ])
            .output()
            .expect("failed to clone upstream repository");
        if !clone_output.status.success() {
            panic!(
                "Failed to clone upstream repository:\nstderr: {}",
                String::from_utf8_lossy(&clone_output.stderr)
            );
        }

        let mirror_repo = Repository::open(&mirror_path).expect("failed to open clone");
        configure_identity(&mirror_repo);
        let mirror = Self {
            dir,
            path: mirror_path,
        };
        mirror.git(&["symbolic-ref", "HEAD", "refs/heads/main"]).unwrap();

        mirror.write_file("README.md", "# project\n");
        mirror.commit_all("Initial commit");
        mirror.git(&["push", "-u", "origin", "main"]).unwrap();

        (mirror, upstream)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().unwrap()
    }

    /// Directory next to the repository for scratch files.
    pub fn scratch_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> Result<String, String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .unwrap_or_else(|_| panic!("Failed to execute git command: {:?}", args));

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if output.status.success() {
            Ok(stdout)
        } else {
            Err(format!(
                "git {:?} failed:\nstdout: {}\nstderr: {}",
                args,
                stdout,
                String::from_utf8_lossy(&output.stderr)
            ))
        }
    }

    pub fn write_file(&self, name: &str, contents: &str) {
        let file_path = self.path.join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file_path, contents).unwrap();
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) {
        fs::write(self.path.join(name), contents).unwrap();
    }

    /// Stage everything and commit; returns the new commit sha.
    pub fn commit_all(&self, message: &str) -> String {
        self.git(&["add", "-A"]).unwrap();
        self.git(&["commit", "-q", "-m", message]).unwrap();
        self.rev_parse("HEAD")
    }

    pub fn rev_parse(&self, spec: &str) -> String {
        self.git(&["rev-parse", spec]).unwrap().trim().to_string()
    }

    pub fn client(&self, options: ClientOptions) -> GitClient {
        GitClient::in_path(self.path_str(), options)
    }

    pub fn context(&self, options: &ClientOptions) -> RepositoryContext {
        self.client(options.clone())
            .get_repository_info()
            .expect("repository detection failed")
            .expect("no repository detected")
    }

    pub fn notes_for(&self, commit: &str) -> Option<String> {
        self.git(&["notes", "show", commit]).ok()
    }
}

/// Paths named in `diff --git` headers, in order.
pub fn diff_paths(diff: &str) -> Vec<String> {
    diff.lines()
        .filter(|l| l.starts_with("diff --git "))
        .filter_map(|l| l.split(' ').nth(3))
        .map(|b| b.trim_start_matches("b/").to_string())
        .collect()
}

pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_git-rb"))
}
