//! Repository discovery: where the repository is, whether it's plain git or a
//! git-svn checkout, and which upstream branch diffs are measured against.

use serde::Serialize;

use crate::config::{ClientOptions, DEFAULT_UPSTREAM_BRANCH};
use crate::error::GitRbError;
use crate::git::repository::{Repository, find_repository, git_is_available, parse_version};
use crate::git::svn_bridge::{self, MIN_GIT_SVN_VERSION, SvnInfo, SvnInfoParse};
use crate::repo_url::expand_repo_paths;
use crate::utils::{debug_log, strip_heads_prefix};

/// Which kind of remote the working copy talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Native,
    /// A git-svn checkout of an SVN repository.
    SvnBridge(SvnInfo),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Native => "git",
            Backend::SvnBridge(_) => "svn",
        }
    }
}

/// What the review server needs to know to find the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryInfo {
    /// Every URL the repository may be registered under.
    pub path: Vec<String>,
    pub base_path: String,
    pub supports_parent_diffs: bool,
    pub supports_updating_commits: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// Everything learned about the repository, gathered once up front and read-only after.
#[derive(Debug, Clone)]
pub struct RepositoryContext {
    pub repo: Repository,
    pub backend: Backend,
    pub upstream_branch: String,
    /// Symbolic ref of HEAD, empty when detached.
    pub head_ref: String,
    pub info: RepositoryInfo,
}

impl RepositoryContext {
    /// The ref diffs end at: the current branch, or `HEAD` when detached.
    pub fn head(&self) -> &str {
        if self.head_ref.is_empty() {
            "HEAD"
        } else {
            &self.head_ref
        }
    }

    /// Merge base of the upstream branch and HEAD, the default diff ancestor.
    pub fn merge_base(&self) -> Result<String, GitRbError> {
        self.repo
            .merge_base(&self.upstream_branch, self.head())
            .map_err(|e| {
                debug_log(&format!("merge-base failed: {}", e));
                GitRbError::AmbiguousOrMissingUpstream(self.upstream_branch.clone())
            })
    }
}

/// Discover the repository for `global_args` (e.g. `-C <path>`).
///
/// Returns `Ok(None)` when git is unavailable or there is no repository, so the
/// caller can move on to another client.
pub fn detect(
    global_args: &[String],
    options: &ClientOptions,
) -> Result<Option<RepositoryContext>, GitRbError> {
    if !git_is_available() {
        debug_log("git executable not available");
        return Ok(None);
    }

    let repo = match find_repository(global_args) {
        Ok(repo) => repo,
        Err(GitRbError::NoRepositoryFound) => return Ok(None),
        Err(e) => return Err(e),
    };

    let head_ref = repo.symbolic_head();

    // Only look at git-svn when its metadata exists; otherwise git svn may start
    // scanning history, which is slow.
    if options.repository_url.is_none() && svn_bridge::has_bridge_metadata(&repo) {
        if let Some(context) = detect_svn_bridge(&repo, &head_ref, options)? {
            return Ok(Some(context));
        }
    }

    detect_native(repo, head_ref, options).map(Some)
}

fn detect_svn_bridge(
    repo: &Repository,
    head_ref: &str,
    options: &ClientOptions,
) -> Result<Option<RepositoryContext>, GitRbError> {
    match svn_bridge::svn_info(repo) {
        SvnInfoParse::Complete(svn) => {
            let upstream_branch = match options.parent_branch.as_deref() {
                Some(parent) => parent.to_string(),
                None => svn_bridge::tracking_branch(repo).unwrap_or_else(|| {
                    eprintln!("Failed to determine SVN tracking branch. Defaulting to \"master\"");
                    "master".to_string()
                }),
            };

            let info = RepositoryInfo {
                path: vec![svn.root.clone()],
                base_path: svn.base_path(),
                supports_parent_diffs: true,
                supports_updating_commits: false,
                uuid: Some(svn.uuid.clone()),
            };

            Ok(Some(RepositoryContext {
                repo: repo.clone(),
                backend: Backend::SvnBridge(svn),
                upstream_branch,
                head_ref: head_ref.to_string(),
                info,
            }))
        }
        SvnInfoParse::Partial => {
            // A root without URL/UUID is what old git-svn prints.
            if repo.config_value("svn-remote.svn.url").is_some() {
                let version = repo
                    .git_opt(&["svn", "--version"])
                    .and_then(|out| parse_version(&out));
                return Err(GitRbError::UnsupportedBridgeVersion {
                    found: version,
                    required: MIN_GIT_SVN_VERSION,
                });
            }
            Ok(None)
        }
        SvnInfoParse::Missing => {
            svn_bridge::check_bridge_version(repo)?;
            Ok(None)
        }
    }
}

fn detect_native(
    repo: Repository,
    head_ref: String,
    options: &ClientOptions,
) -> Result<RepositoryContext, GitRbError> {
    let tracked = tracking_branch(&repo, &head_ref);

    let (upstream_branch, url) = match options.repository_url.as_deref() {
        Some(url) => {
            let (upstream, _) = get_origin(&repo, options, tracked.as_deref());
            (upstream, url.to_string())
        }
        None => {
            let (mut upstream, mut origin_url) = get_origin(&repo, options, tracked.as_deref());
            if origin_url.is_none() {
                (upstream, origin_url) = get_origin(&repo, options, None);
            }

            match origin_url.map(|u| u.trim_end_matches('/').to_string()) {
                Some(url) if !url.is_empty() => (upstream, url),
                _ => {
                    // Central bare repositories have no remote; point at the repository itself.
                    let path = repo
                        .path()
                        .canonicalize()
                        .unwrap_or_else(|_| repo.path().to_path_buf());
                    let branch = upstream.rsplit('/').next().unwrap_or("").to_string();
                    (branch, path.display().to_string())
                }
            }
        }
    };

    debug_log(&format!(
        "native git repository, upstream '{}', url '{}'",
        upstream_branch, url
    ));

    Ok(RepositoryContext {
        repo,
        backend: Backend::Native,
        upstream_branch,
        head_ref,
        info: RepositoryInfo {
            path: expand_repo_paths(&url),
            base_path: String::new(),
            supports_parent_diffs: true,
            supports_updating_commits: true,
            uuid: None,
        },
    })
}

/// `<remote>/<branch>` configured as the current branch's upstream, if any.
///
/// Branches tracking another local branch (remote `.`) have no usable upstream.
fn tracking_branch(repo: &Repository, head_ref: &str) -> Option<String> {
    if head_ref.is_empty() {
        return None;
    }
    let short_head = strip_heads_prefix(head_ref);
    let merge = repo.config_value(&format!("branch.{}.merge", short_head))?;
    let remote = repo.config_value(&format!("branch.{}.remote", short_head))?;
    if remote == "." {
        return None;
    }
    Some(format!("{}/{}", remote, strip_heads_prefix(&merge)))
}

/// Pick the upstream branch and look up its remote's URL.
///
/// Precedence: `--tracking`, then `default_upstream`, then `origin/master`.
pub fn get_origin(
    repo: &Repository,
    options: &ClientOptions,
    default_upstream: Option<&str>,
) -> (String, Option<String>) {
    let upstream_branch = options
        .tracking
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(default_upstream.filter(|d| !d.is_empty()))
        .unwrap_or(DEFAULT_UPSTREAM_BRANCH)
        .to_string();
    let upstream_remote = upstream_branch.split('/').next().unwrap_or("");
    let origin_url = repo.config_value(&format!("remote.{}.url", upstream_remote));
    (upstream_branch, origin_url)
}
