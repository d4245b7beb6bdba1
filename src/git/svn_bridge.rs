//! Queries against git-svn metadata.
//!
//! Every lookup here is soft: a missing or broken git-svn install just means the
//! repository is not treated as SVN-backed, except for the explicit too-old check.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::GitRbError;
use crate::git::repository::{Repository, parse_version};
use crate::utils::{debug_log, is_valid_version};

/// First git-svn release that understands `git svn info`.
pub const MIN_GIT_SVN_VERSION: (u32, u32, u32) = (1, 5, 4);

static REPOSITORY_ROOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Repository Root: (.+)$").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^URL: (.+)$").unwrap());
static UUID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^Repository UUID: (.+)$").unwrap());
static REMOTE_BRANCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Remote Branch:\s*(.+)$").unwrap());

/// What `git svn info` reported about the SVN side of the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnInfo {
    pub root: String,
    pub url: String,
    pub uuid: String,
}

impl SvnInfo {
    /// The URL path below the repository root, `/` for the root itself.
    pub fn base_path(&self) -> String {
        let suffix = self.url.strip_prefix(&self.root).unwrap_or("");
        if suffix.is_empty() {
            "/".to_string()
        } else {
            suffix.to_string()
        }
    }
}

/// Result of reading `git svn info` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvnInfoParse {
    Complete(SvnInfo),
    /// A repository root was reported but URL or UUID was missing.
    Partial,
    /// No repository root at all.
    Missing,
}

fn capture(re: &Regex, data: &str) -> Option<String> {
    re.captures(data)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('\r').to_string())
}

pub fn parse_svn_info(data: &str) -> SvnInfoParse {
    let Some(root) = capture(&REPOSITORY_ROOT_RE, data) else {
        return SvnInfoParse::Missing;
    };
    match (capture(&URL_RE, data), capture(&UUID_RE, data)) {
        (Some(url), Some(uuid)) => SvnInfoParse::Complete(SvnInfo { root, url, uuid }),
        _ => SvnInfoParse::Partial,
    }
}

pub fn parse_remote_branch(data: &str) -> Option<String> {
    capture(&REMOTE_BRANCH_RE, data).map(|s| s.trim().to_string())
}

/// Whether the git dir holds non-empty git-svn metadata.
pub fn has_bridge_metadata(repo: &Repository) -> bool {
    let svn_dir = repo.path().join("svn");
    match std::fs::read_dir(&svn_dir) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

pub fn svn_info(repo: &Repository) -> SvnInfoParse {
    let data = repo.git_opt(&["svn", "info"]).unwrap_or_default();
    parse_svn_info(&data)
}

/// Fail when git-svn is configured for this repository but too old to be queried.
///
/// Without a configured `svn-remote.svn.url`, or when the version can't be read,
/// detection quietly falls through to plain git.
pub fn check_bridge_version(repo: &Repository) -> Result<(), GitRbError> {
    let version_output = repo.git_opt(&["svn", "--version"]).unwrap_or_default();
    let Some(version) = parse_version(&version_output) else {
        debug_log("could not determine git-svn version");
        return Ok(());
    };

    if repo.config_value("svn-remote.svn.url").is_some()
        && !is_valid_version(version, MIN_GIT_SVN_VERSION)
    {
        return Err(GitRbError::UnsupportedBridgeVersion {
            found: Some(version),
            required: MIN_GIT_SVN_VERSION,
        });
    }
    Ok(())
}

/// The SVN branch the current checkout tracks, from a dry-run rebase.
pub fn tracking_branch(repo: &Repository) -> Option<String> {
    let data = repo.git_opt(&["svn", "rebase", "-n"])?;
    parse_remote_branch(&data)
}

/// SVN revision number of `revision`, or `None` if git-svn doesn't know it.
pub fn find_rev(repo: &Repository, revision: &str) -> Option<String> {
    repo.git_opt(&["svn", "find-rev", revision])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The `reviewboard:url` property set on the SVN repository, if any.
pub fn server_property(repo: &Repository) -> Option<String> {
    repo.git_opt(&["svn", "propget", "reviewboard:url", "."])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
