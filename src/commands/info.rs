use serde::Serialize;

use crate::client::GitClient;
use crate::commands::require_repository;
use crate::error::GitRbError;
use crate::git::upstream::{RepositoryContext, RepositoryInfo};

#[derive(Debug, Serialize)]
pub struct InfoJson<'a> {
    #[serde(rename = "type")]
    pub backend: &'static str,
    pub upstream_branch: &'a str,
    pub head_ref: &'a str,
    pub root: String,
    pub bare: bool,
    pub repository: &'a RepositoryInfo,
}

impl<'a> InfoJson<'a> {
    pub fn from_context(context: &'a RepositoryContext) -> Self {
        Self {
            backend: context.backend.name(),
            upstream_branch: &context.upstream_branch,
            head_ref: &context.head_ref,
            root: context.repo.workdir().display().to_string(),
            bare: context.repo.is_bare(),
            repository: &context.info,
        }
    }
}

pub fn handle_info(client: &GitClient, json: bool) -> Result<(), GitRbError> {
    let context = require_repository(client)?;
    let info = InfoJson::from_context(&context);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Type:            {}", info.backend);
    println!("Root:            {}", info.root);
    println!("Upstream branch: {}", info.upstream_branch);
    let head = if info.head_ref.is_empty() {
        "(detached)"
    } else {
        info.head_ref
    };
    println!("Head:            {}", head);
    if !context.info.base_path.is_empty() {
        println!("Base path:       {}", context.info.base_path);
    }
    if let Some(uuid) = &context.info.uuid {
        println!("UUID:            {}", uuid);
    }
    for path in &context.info.path {
        println!("Path:            {}", path);
    }
    Ok(())
}
