pub mod annotate;
pub mod diff;
pub mod info;
pub mod server;

use clap::Args;

use crate::client::{GitClient, ScmClient};
use crate::config::ClientOptions;
use crate::error::GitRbError;
use crate::git::upstream::RepositoryContext;

/// Options that decide which repository and upstream a command works against.
#[derive(Args, Debug, Clone, Default)]
pub struct RepositoryArgs {
    /// Repository URL to report instead of the remote's (skips git-svn detection)
    #[arg(long)]
    pub repository_url: Option<String>,

    /// Remote branch to diff against instead of the configured upstream
    #[arg(long)]
    pub tracking: Option<String>,

    /// Branch the current work is based on; adds a parent diff from upstream to it
    #[arg(long = "parent")]
    pub parent_branch: Option<String>,
}

/// Selects which revisions a command covers.
#[derive(Args, Debug, Clone, Default)]
pub struct RevisionArgs {
    /// Revision `R` (R..HEAD) or range `R1:R2` instead of the whole branch
    #[arg(long)]
    pub revision_range: Option<String>,
}

impl RepositoryArgs {
    pub fn apply(&self, options: &mut ClientOptions) {
        options.repository_url = self.repository_url.clone();
        options.tracking = self.tracking.clone();
        options.parent_branch = self.parent_branch.clone();
    }
}

/// Detect the repository, turning "no repository" into an error for CLI use.
pub fn require_repository(client: &GitClient) -> Result<RepositoryContext, GitRbError> {
    client
        .get_repository_info()?
        .ok_or(GitRbError::NoRepositoryFound)
}
