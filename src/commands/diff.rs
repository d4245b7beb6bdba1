use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::client::{DiffOutcome, GitClient, ScmClient};
use crate::commands::{RepositoryArgs, RevisionArgs, require_repository};
use crate::config::ClientOptions;
use crate::error::GitRbError;
use crate::git::upstream::RepositoryContext;

#[derive(Args, Debug, Clone, Default)]
pub struct DiffArgs {
    #[command(flatten)]
    pub repository: RepositoryArgs,

    #[command(flatten)]
    pub revisions: RevisionArgs,

    /// Guess the summary from the first commit's subject
    #[arg(long)]
    pub guess_summary: bool,

    /// Guess the description from the commit messages
    #[arg(long)]
    pub guess_description: bool,

    /// Summary to use; suppresses --guess-summary
    #[arg(long)]
    pub summary: Option<String>,

    /// Description to use; suppresses --guess-description
    #[arg(long)]
    pub description: Option<String>,

    /// Write the parent diff, when one is needed, to this file
    #[arg(long)]
    pub parent_diff_file: Option<PathBuf>,

    /// Print diffs, range and guesses as JSON
    #[arg(long)]
    pub json: bool,
}

impl DiffArgs {
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions {
            guess_summary: self.guess_summary,
            guess_description: self.guess_description,
            summary: self.summary.clone(),
            description: self.description.clone(),
            ..Default::default()
        };
        self.repository.apply(&mut options);
        options
    }
}

/// Run whichever diff the revision arguments ask for.
pub fn compute_diff(
    client: &GitClient,
    context: &RepositoryContext,
    revisions: &RevisionArgs,
) -> Result<DiffOutcome, GitRbError> {
    match revisions.revision_range.as_deref() {
        Some(range) => client
            .diff_between_revisions(context, range)?
            .ok_or_else(|| GitRbError::InvalidRevisionRange(range.to_string())),
        None => client.diff(context),
    }
}

pub fn handle_diff(client: &GitClient, args: &DiffArgs) -> Result<(), GitRbError> {
    let context = require_repository(client)?;
    let outcome = compute_diff(client, &context, &args.revisions)?;

    if outcome.diff.primary_diff.is_none() && !args.json {
        eprintln!("There don't seem to be any diffs!");
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if let Some(parent_diff) = &outcome.diff.parent_diff {
        match &args.parent_diff_file {
            Some(path) => fs::write(path, parent_diff)?,
            None => eprintln!(
                "A parent diff is required for {}; pass --parent-diff-file to save it",
                outcome.range.ancestor
            ),
        }
    }

    if let Some(summary) = &outcome.guesses.summary {
        eprintln!("Summary: {}", summary);
    }
    if let Some(description) = &outcome.guesses.description {
        eprintln!("Description:\n{}", description);
    }

    if let Some(primary_diff) = &outcome.diff.primary_diff {
        print!("{}", primary_diff);
    }
    Ok(())
}
