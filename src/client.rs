use serde::Serialize;

use crate::config::{self, ClientOptions};
use crate::error::GitRbError;
use crate::git::diff::{DiffResult, run_plan};
use crate::git::guess::{Guesses, guess_for_range};
use crate::git::notes;
use crate::git::revision::{
    DiffPlan, RevisionRange, RevisionSpec, plan_branch_diff, plan_revision_diff,
};
use crate::git::svn_bridge;
use crate::git::upstream::{self, Backend, RepositoryContext};
use crate::utils::debug_log;

/// Diffs for one review plus what they were computed from.
#[derive(Debug, Clone, Serialize)]
pub struct DiffOutcome {
    #[serde(flatten)]
    pub diff: DiffResult,
    /// The primary range; commits in it are the ones reviewer info is attached to.
    pub range: RevisionRange,
    #[serde(flatten)]
    pub guesses: Guesses,
}

/// What a review-posting tool needs from a version control client.
pub trait ScmClient {
    /// `Ok(None)` when this client doesn't apply to the current directory.
    fn get_repository_info(&self) -> Result<Option<RepositoryContext>, GitRbError>;

    fn scan_for_server(&self, context: &RepositoryContext) -> Option<String>;

    /// Diff the current branch against its upstream (or the parent branch).
    fn diff(&self, context: &RepositoryContext) -> Result<DiffOutcome, GitRbError>;

    /// Diff an explicit `R` or `R1:R2` revision argument.
    ///
    /// `Ok(None)` when the argument is malformed or names unknown revisions.
    fn diff_between_revisions(
        &self,
        context: &RepositoryContext,
        revision_range: &str,
    ) -> Result<Option<DiffOutcome>, GitRbError>;

    /// Attach reviewer info to the commits in `range`; returns the number updated.
    fn update_commits_with_reviewer_info(
        &self,
        context: &RepositoryContext,
        range: &RevisionRange,
        review_url: &str,
    ) -> usize;
}

pub struct GitClient {
    options: ClientOptions,
    global_args: Vec<String>,
}

impl GitClient {
    /// A client for the repository containing the current directory.
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            global_args: Vec::new(),
        }
    }

    /// A client for the repository containing `path`.
    pub fn in_path(path: &str, options: ClientOptions) -> Self {
        Self {
            options,
            global_args: vec!["-C".to_string(), path.to_string()],
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Resolve which ranges a review covers without producing any diff.
    ///
    /// `revision_range` of `None` plans the whole branch. `Ok(None)` when the
    /// argument is malformed or names unknown revisions.
    pub fn resolve_plan(
        &self,
        context: &RepositoryContext,
        revision_range: Option<&str>,
    ) -> Result<Option<DiffPlan>, GitRbError> {
        let merge_base = context.merge_base()?;
        let Some(revision_range) = revision_range else {
            return Ok(Some(plan_branch_diff(
                &merge_base,
                context.head(),
                self.options.parent_branch.as_deref(),
            )));
        };

        let spec = match RevisionSpec::parse(revision_range) {
            Ok(spec) => spec,
            Err(e) => {
                debug_log(&e.to_string());
                return Ok(None);
            }
        };
        if let Some(unknown) = spec
            .revisions()
            .into_iter()
            .find(|r| context.repo.rev_parse_verify(r).is_none())
        {
            debug_log(&format!("unknown revision: {}", unknown));
            return Ok(None);
        }

        let base_on_remote = context.repo.remote_branches_contain(spec.base())?;
        Ok(Some(plan_revision_diff(
            &spec,
            &merge_base,
            context.head(),
            base_on_remote,
        )))
    }

    fn outcome_for(
        &self,
        context: &RepositoryContext,
        plan: DiffPlan,
    ) -> Result<DiffOutcome, GitRbError> {
        let diff = run_plan(&context.repo, &context.backend, &plan)?;
        let guesses = guess_for_range(&context.repo, &self.options, &plan.primary);
        Ok(DiffOutcome {
            diff,
            range: plan.primary,
            guesses,
        })
    }
}

impl ScmClient for GitClient {
    fn get_repository_info(&self) -> Result<Option<RepositoryContext>, GitRbError> {
        upstream::detect(&self.global_args, &self.options)
    }

    fn scan_for_server(&self, context: &RepositoryContext) -> Option<String> {
        if let Some(url) = config::server_from_dotfiles(context.repo.workdir()) {
            return Some(url);
        }

        if let Some(url) = context.repo.config_value("reviewboard.url") {
            return Some(url);
        }

        match context.backend {
            Backend::SvnBridge(_) => svn_bridge::server_property(&context.repo),
            Backend::Native => None,
        }
    }

    fn diff(&self, context: &RepositoryContext) -> Result<DiffOutcome, GitRbError> {
        let merge_base = context.merge_base()?;
        let plan = plan_branch_diff(
            &merge_base,
            context.head(),
            self.options.parent_branch.as_deref(),
        );
        self.outcome_for(context, plan)
    }

    fn diff_between_revisions(
        &self,
        context: &RepositoryContext,
        revision_range: &str,
    ) -> Result<Option<DiffOutcome>, GitRbError> {
        match self.resolve_plan(context, Some(revision_range))? {
            Some(plan) => self.outcome_for(context, plan).map(Some),
            None => Ok(None),
        }
    }

    fn update_commits_with_reviewer_info(
        &self,
        context: &RepositoryContext,
        range: &RevisionRange,
        review_url: &str,
    ) -> usize {
        notes::update_commits_with_reviewer_info(&context.repo, range, &self.options, review_url)
    }
}
