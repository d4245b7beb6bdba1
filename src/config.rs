use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::debug_log;

/// Remote branch assumed when no tracking branch is configured.
pub const DEFAULT_UPSTREAM_BRANCH: &str = "origin/master";

pub struct Config {
    git_path: String,
}

#[derive(Deserialize, Serialize, Default)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_path: Option<String>,
}

/// Settings read from `GIT_RB_*` environment variables.
#[derive(Deserialize, Default, Debug)]
struct EnvConfig {
    #[serde(default)]
    git_path: Option<String>,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    /// Access the global configuration. Lazily initializes if not already initialized.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(build_config)
    }

    /// Returns the command to invoke git.
    pub fn git_cmd(&self) -> &str {
        &self.git_path
    }
}

/// Options supplied by the caller of the client, usually straight from the command line.
///
/// `summary` and `description` are only filled in by guessing when they are empty
/// and the matching `guess_*` flag is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Explicit repository URL. Disables git-svn detection when set.
    #[serde(default)]
    pub repository_url: Option<String>,
    /// Remote branch to diff against, overriding the configured tracking branch.
    #[serde(default)]
    pub tracking: Option<String>,
    #[serde(default)]
    pub parent_branch: Option<String>,
    #[serde(default)]
    pub guess_summary: bool,
    #[serde(default)]
    pub guess_description: bool,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_people: Option<String>,
    #[serde(default)]
    pub target_groups: Option<String>,
}

impl ClientOptions {
    pub fn wants_summary_guess(&self) -> bool {
        self.guess_summary && self.summary.as_deref().unwrap_or("").is_empty()
    }

    pub fn wants_description_guess(&self) -> bool {
        self.guess_description && self.description.as_deref().unwrap_or("").is_empty()
    }
}

fn build_config() -> Config {
    let env_cfg = load_env_config();
    let file_cfg = load_file_config();
    Config {
        git_path: resolve_git_path(&env_cfg, &file_cfg),
    }
}

fn load_env_config() -> EnvConfig {
    match envy::prefixed("GIT_RB_").from_env::<EnvConfig>() {
        Ok(cfg) => cfg,
        Err(e) => {
            debug_log(&format!("Ignoring invalid GIT_RB_ environment settings: {}", e));
            EnvConfig::default()
        }
    }
}

fn resolve_git_path(env_cfg: &EnvConfig, file_cfg: &Option<FileConfig>) -> String {
    // 1) From the environment, then the config file
    let configured = env_cfg
        .git_path
        .as_deref()
        .into_iter()
        .chain(file_cfg.as_ref().and_then(|c| c.git_path.as_deref()));
    for path in configured {
        let trimmed = path.trim();
        if !trimmed.is_empty() && is_executable(Path::new(trimmed)) {
            return trimmed.to_string();
        }
    }

    // 2) Probe common locations across platforms
    let candidates: &[&str] = &[
        "/opt/homebrew/bin/git",
        "/usr/local/bin/git",
        "/usr/bin/git",
        "/bin/git",
        r"C:\\Program Files\\Git\\bin\\git.exe",
        r"C:\\Program Files (x86)\\Git\\bin\\git.exe",
    ];

    if let Some(found) = candidates.iter().map(Path::new).find(|p| is_executable(p)) {
        return found.to_string_lossy().to_string();
    }

    // 3) Let the OS search PATH; a missing git surfaces as NoRepositoryFound later
    if cfg!(windows) {
        "git.exe".to_string()
    } else {
        "git".to_string()
    }
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_file_path()?;
    let data = fs::read(&path).ok()?;
    match serde_json::from_slice::<FileConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: Ignoring malformed config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".git-rb").join("config.json"))
}

static REVIEWBOARD_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*REVIEWBOARD_URL\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Extract `REVIEWBOARD_URL` from the contents of a `.reviewboardrc` file.
pub fn parse_reviewboardrc(contents: &str) -> Option<String> {
    REVIEWBOARD_URL_RE
        .captures(contents)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Look for a server URL in `.reviewboardrc` under `repo_root`, then the home directory.
pub fn server_from_dotfiles(repo_root: &Path) -> Option<String> {
    let candidates = std::iter::once(repo_root.to_path_buf())
        .chain(dirs::home_dir())
        .map(|dir| dir.join(".reviewboardrc"));
    for path in candidates {
        if let Ok(contents) = fs::read_to_string(&path)
            && let Some(url) = parse_reviewboardrc(&contents)
        {
            debug_log(&format!("server URL from {}", path.display()));
            return Some(url);
        }
    }
    None
}

fn is_executable(path: &Path) -> bool {
    path.exists() && path.is_file()
}
