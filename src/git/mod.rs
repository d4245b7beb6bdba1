pub mod diff;
pub mod guess;
pub mod notes;
pub mod repository;
pub mod revision;
pub mod svn_bridge;
pub mod svn_diff;
pub mod upstream;

pub use repository::{find_repository, find_repository_in_path};
