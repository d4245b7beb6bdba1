use std::fmt;

#[derive(Debug)]
pub enum GitRbError {
    IoError(std::io::Error),
    /// Errors from invoking the git CLI that exited with a non-zero status
    GitCliError {
        code: Option<i32>,
        stderr: String,
        args: Vec<String>,
    },
    /// Errors from gix-config
    GixError(String),
    JsonError(serde_json::Error),
    FromUtf8Error(std::string::FromUtf8Error),
    /// git is not installed or the working directory is not inside a repository
    NoRepositoryFound,
    /// git-svn metadata is present but the installed git-svn is too old to query it
    UnsupportedBridgeVersion {
        found: Option<(u32, u32, u32)>,
        required: (u32, u32, u32),
    },
    AmbiguousOrMissingUpstream(String),
    InvalidRevisionRange(String),
    TranslationUnavailable(String),
    Generic(String),
}

fn version_string(v: &(u32, u32, u32)) -> String {
    format!("{}.{}.{}", v.0, v.1, v.2)
}

impl fmt::Display for GitRbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitRbError::IoError(e) => write!(f, "IO error: {}", e),
            GitRbError::GitCliError { code, stderr, args } => match code {
                Some(c) => write!(
                    f,
                    "Git CLI ({}) failed with exit code {}: {}",
                    args.join(" "),
                    c,
                    stderr
                ),
                None => write!(f, "Git CLI ({}) failed: {}", args.join(" "), stderr),
            },
            GitRbError::GixError(e) => write!(f, "Gix error: {}", e),
            GitRbError::JsonError(e) => write!(f, "JSON error: {}", e),
            GitRbError::FromUtf8Error(e) => write!(f, "From UTF-8 error: {}", e),
            GitRbError::NoRepositoryFound => {
                write!(f, "git is not available or this is not a git repository")
            }
            GitRbError::UnsupportedBridgeVersion { found, required } => match found {
                Some(found) => write!(
                    f,
                    "Your installation of git-svn ({}) must be upgraded to version {} or later",
                    version_string(found),
                    version_string(required)
                ),
                None => write!(
                    f,
                    "Your installation of git-svn must be upgraded to version {} or later",
                    version_string(required)
                ),
            },
            GitRbError::AmbiguousOrMissingUpstream(upstream) => write!(
                f,
                "Could not determine a merge base with upstream '{}'. Use --tracking to choose the upstream branch",
                upstream
            ),
            GitRbError::InvalidRevisionRange(range) => {
                write!(f, "Invalid revision range: {}", range)
            }
            GitRbError::TranslationUnavailable(ancestor) => write!(
                f,
                "Could not produce an SVN compatible diff: no SVN revision found for {}",
                ancestor
            ),
            GitRbError::Generic(e) => write!(f, "Generic error: {}", e),
        }
    }
}

impl std::error::Error for GitRbError {}

impl From<std::io::Error> for GitRbError {
    fn from(err: std::io::Error) -> Self {
        GitRbError::IoError(err)
    }
}

impl From<serde_json::Error> for GitRbError {
    fn from(err: serde_json::Error) -> Self {
        GitRbError::JsonError(err)
    }
}

impl From<std::string::FromUtf8Error> for GitRbError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        GitRbError::FromUtf8Error(err)
    }
}
