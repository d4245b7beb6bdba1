use clap::Args;

use crate::client::{GitClient, ScmClient};
use crate::commands::{RepositoryArgs, RevisionArgs, require_repository};
use crate::config::ClientOptions;
use crate::error::GitRbError;

#[derive(Args, Debug, Clone)]
pub struct AnnotateArgs {
    /// URL of the review the commits were posted to
    #[arg(long)]
    pub review_url: String,

    /// Reviewers to credit
    #[arg(long)]
    pub target_people: Option<String>,

    /// Review groups to credit
    #[arg(long)]
    pub target_groups: Option<String>,

    #[command(flatten)]
    pub repository: RepositoryArgs,

    #[command(flatten)]
    pub revisions: RevisionArgs,
}

impl AnnotateArgs {
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions {
            target_people: self.target_people.clone(),
            target_groups: self.target_groups.clone(),
            ..Default::default()
        };
        self.repository.apply(&mut options);
        options
    }
}

/// Resolve the same range `diff` would post, then add `Reviewed-By:` notes to its commits.
///
/// A revision argument that doesn't resolve annotates nothing.
pub fn handle_annotate(client: &GitClient, args: &AnnotateArgs) -> Result<(), GitRbError> {
    let context = require_repository(client)?;
    if !context.info.supports_updating_commits {
        return Err(GitRbError::Generic(format!(
            "Updating commits is not supported for {} repositories",
            context.backend.name()
        )));
    }

    let revision_range = args.revisions.revision_range.as_deref();
    let updated = match client.resolve_plan(&context, revision_range)? {
        Some(plan) => {
            client.update_commits_with_reviewer_info(&context, &plan.primary, &args.review_url)
        }
        None => 0,
    };

    println!(
        "Updated {} commit{} with reviewer info",
        updated,
        if updated == 1 { "" } else { "s" }
    );
    Ok(())
}
