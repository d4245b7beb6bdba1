use crate::client::{GitClient, ScmClient};
use crate::commands::require_repository;
use crate::error::GitRbError;

pub fn handle_server(client: &GitClient) -> Result<(), GitRbError> {
    let context = require_repository(client)?;
    match client.scan_for_server(&context) {
        Some(url) => {
            println!("{}", url);
            Ok(())
        }
        None => Err(GitRbError::Generic(
            "No review server configured. Set reviewboard.url or REVIEWBOARD_URL in .reviewboardrc"
                .to_string(),
        )),
    }
}
