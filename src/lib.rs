pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod repo_url;
pub mod utils;
