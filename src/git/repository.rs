use crate::config;
use crate::error::GitRbError;
use crate::utils::debug_log;
#[cfg(windows)]
use crate::utils::{CREATE_NO_WINDOW, is_interactive_terminal};

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[derive(Debug, Clone)]
pub struct Repository {
    global_args: Vec<String>,
    git_dir: PathBuf,
    workdir: PathBuf,
    bare: bool,
}

impl Repository {
    // Util for preparing global args for execution
    pub fn global_args_for_exec(&self) -> Vec<String> {
        let mut args = self.global_args.clone();
        if !args.iter().any(|arg| arg == "--no-pager") {
            args.push("--no-pager".to_string());
        }
        args
    }

    fn full_args(&self, args: &[&str]) -> Vec<String> {
        let mut full_args = self.global_args_for_exec();
        full_args.extend(args.iter().map(|s| s.to_string()));
        full_args
    }

    /// Execute an arbitrary git command and return stdout as string
    pub fn git(&self, args: &[&str]) -> Result<String, GitRbError> {
        let output = exec_git(&self.full_args(args))?;
        Ok(String::from_utf8(output.stdout)?)
    }

    /// Execute a git command, returning `None` instead of an error when it fails.
    ///
    /// Used for lookups where failure just means "not available".
    pub fn git_opt(&self, args: &[&str]) -> Option<String> {
        match self.git(args) {
            Ok(stdout) => Some(stdout),
            Err(e) => {
                debug_log(&format!("ignored: {}", e));
                None
            }
        }
    }

    /// Execute a git command feeding `stdin_data` on stdin.
    pub fn git_stdin(&self, args: &[&str], stdin_data: &[u8]) -> Result<String, GitRbError> {
        let output = exec_git_stdin(&self.full_args(args), stdin_data)?;
        Ok(String::from_utf8(output.stdout)?)
    }

    // Returns the path to the .git folder for normal repositories or the repository itself for bare repositories.
    pub fn path(&self) -> &Path {
        self.git_dir.as_path()
    }

    /// Top-level working directory, or the git dir's parent for bare repositories.
    pub fn workdir(&self) -> &Path {
        self.workdir.as_path()
    }

    pub fn is_bare(&self) -> bool {
        self.bare
    }

    /// Returns the symbolic ref HEAD points at (e.g. `refs/heads/main`), or an
    /// empty string when HEAD is detached.
    pub fn symbolic_head(&self) -> String {
        self.git_opt(&["symbolic-ref", "-q", "HEAD"])
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Get the git config file for this repository and fallback to global config if not found.
    fn get_git_config_file(&self) -> Result<gix_config::File<'static>, GitRbError> {
        match gix_config::File::from_git_dir(self.path().to_path_buf()) {
            Ok(git_config_file) => Ok(git_config_file),
            Err(e) => match gix_config::File::from_globals() {
                Ok(system_config) => Ok(system_config),
                Err(_) => Err(GitRbError::GixError(e.to_string())),
            },
        }
    }

    /// Get config value for a given key as a String.
    pub fn config_get_str(&self, key: &str) -> Result<Option<String>, GitRbError> {
        let git_config_file = self.get_git_config_file()?;
        Ok(git_config_file.string(key).map(|cow| cow.to_string()))
    }

    /// Config lookup where an unreadable config counts as "not set".
    /// Empty values are also treated as unset.
    pub fn config_value(&self, key: &str) -> Option<String> {
        match self.config_get_str(key) {
            Ok(value) => value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            Err(e) => {
                debug_log(&format!("config lookup for {} failed: {}", key, e));
                None
            }
        }
    }

    // Find a merge base between two commits
    pub fn merge_base(&self, one: &str, two: &str) -> Result<String, GitRbError> {
        Ok(self.git(&["merge-base", one, two])?.trim().to_string())
    }

    /// Resolve a revision to a full object id, or `None` when it does not exist.
    pub fn rev_parse_verify(&self, spec: &str) -> Option<String> {
        let spec = format!("{}^{{commit}}", spec);
        self.git_opt(&["rev-parse", "-q", "--verify", &spec])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Whether any remote-tracking branch contains `revision`.
    pub fn remote_branches_contain(&self, revision: &str) -> Result<bool, GitRbError> {
        let output = self.git(&["branch", "-r", "--contains", revision])?;
        Ok(!output.trim().is_empty())
    }

    /// Commits in `(ancestor, target]`, oldest first.
    pub fn rev_list_reverse(&self, ancestor: &str, target: &str) -> Option<Vec<String>> {
        let range = format!("{}..{}", ancestor, target);
        self.git_opt(&["rev-list", "--reverse", &range]).map(|out| {
            out.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

/// Locate the repository the current process (or `-C` global args) points into.
///
/// Working-tree repositories are normalized to their top level so every later
/// invocation runs from the root, regardless of where the caller started.
pub fn find_repository(global_args: &[String]) -> Result<Repository, GitRbError> {
    let mut rev_parse_args = global_args.to_owned();
    rev_parse_args.push("rev-parse".to_string());
    rev_parse_args.push("--is-bare-repository".to_string());
    rev_parse_args.push("--git-dir".to_string());

    let rev_parse_output = exec_git(&rev_parse_args).map_err(|e| {
        debug_log(&format!("not a git repository: {}", e));
        GitRbError::NoRepositoryFound
    })?;
    let rev_parse_stdout = String::from_utf8(rev_parse_output.stdout)?;
    let mut lines = rev_parse_stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let is_bare = match lines.next() {
        Some("true") => true,
        Some("false") => false,
        Some(other) => {
            return Err(GitRbError::Generic(format!(
                "Unexpected --is-bare-repository output: {}",
                other
            )));
        }
        None => {
            return Err(GitRbError::Generic(
                "Missing --is-bare-repository output from git rev-parse".to_string(),
            ));
        }
    };

    let git_dir_str = lines.next().ok_or_else(|| {
        GitRbError::Generic("Missing --git-dir output from git rev-parse".to_string())
    })?;
    let command_base_dir = resolve_command_base_dir(global_args)?;
    let git_dir = if Path::new(git_dir_str).is_relative() {
        command_base_dir.join(git_dir_str)
    } else {
        PathBuf::from(git_dir_str)
    };

    if !git_dir.is_dir() {
        return Err(GitRbError::NoRepositoryFound);
    }
    let git_dir = git_dir.canonicalize().unwrap_or(git_dir);

    let workdir = if is_bare {
        git_dir.clone()
    } else {
        let mut top_level_args = global_args.to_owned();
        top_level_args.push("rev-parse".to_string());
        top_level_args.push("--show-toplevel".to_string());
        match exec_git(&top_level_args) {
            Ok(output) => PathBuf::from(String::from_utf8(output.stdout)?.trim()),
            // Older gits can't answer --show-toplevel; the git dir is the best we have.
            Err(_) => git_dir.clone(),
        }
    };

    if !workdir.is_dir() {
        return Err(GitRbError::Generic(format!(
            "Work directory does not exist: {}",
            workdir.display()
        )));
    }

    let command_root = workdir.display().to_string();
    let mut normalized_global_args: Vec<String> = Vec::new();
    let mut idx = 0usize;
    while idx < global_args.len() {
        if global_args[idx] == "-C" {
            idx += 2;
            continue;
        }
        normalized_global_args.push(global_args[idx].clone());
        idx += 1;
    }
    normalized_global_args.insert(0, command_root);
    normalized_global_args.insert(0, "-C".to_string());

    Ok(Repository {
        global_args: normalized_global_args,
        git_dir,
        workdir,
        bare: is_bare,
    })
}

fn resolve_command_base_dir(global_args: &[String]) -> Result<PathBuf, GitRbError> {
    let mut base = std::env::current_dir().map_err(GitRbError::IoError)?;
    let mut idx = 0usize;

    while idx < global_args.len() {
        if global_args[idx] == "-C" {
            let path_arg = global_args.get(idx + 1).ok_or_else(|| {
                GitRbError::Generic("Missing path after -C in global git args".to_string())
            })?;

            let next_base = PathBuf::from(path_arg);
            base = if next_base.is_absolute() {
                next_base
            } else {
                base.join(next_base)
            };
            idx += 2;
            continue;
        }
        idx += 1;
    }

    Ok(base)
}

pub fn find_repository_in_path(path: &str) -> Result<Repository, GitRbError> {
    let global_args = vec!["-C".to_string(), path.to_string()];
    find_repository(&global_args)
}

/// Whether the configured git executable can be run at all.
pub fn git_is_available() -> bool {
    exec_git(&["--version".to_string()]).is_ok()
}

fn git_command(args: &[String]) -> Command {
    let mut cmd = Command::new(config::Config::get().git_cmd());
    cmd.args(args);

    #[cfg(windows)]
    {
        if !is_interactive_terminal() {
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
    }

    cmd
}

fn check_status(output: Output, args: &[String]) -> Result<Output, GitRbError> {
    if !output.status.success() {
        let code = output.status.code();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(GitRbError::GitCliError {
            code,
            stderr,
            args: args.to_vec(),
        });
    }

    Ok(output)
}

/// Helper to execute a git command
pub fn exec_git(args: &[String]) -> Result<Output, GitRbError> {
    debug_log(&format!("git {}", args.join(" ")));
    let output = git_command(args)
        .output()
        .map_err(GitRbError::IoError)?;
    check_status(output, args)
}

/// Helper to execute a git command with data provided on stdin
pub fn exec_git_stdin(args: &[String], stdin_data: &[u8]) -> Result<Output, GitRbError> {
    debug_log(&format!("git {} (stdin: {} bytes)", args.join(" "), stdin_data.len()));
    let mut cmd = git_command(args);
    cmd.stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());

    let mut child = cmd.spawn().map_err(GitRbError::IoError)?;

    if let Some(mut stdin) = child.stdin.take() {
        use std::io::Write;
        if let Err(e) = stdin.write_all(stdin_data) {
            return Err(GitRbError::IoError(e));
        }
    }

    let output = child.wait_with_output().map_err(GitRbError::IoError)?;
    check_status(output, args)
}

/// Parse a version triple out of output such as `git-svn version 2.39.3 (svn 1.14.2)`.
/// Returns None if the version cannot be parsed.
pub fn parse_version(version_str: &str) -> Option<(u32, u32, u32)> {
    let rest = version_str.split("version ").nth(1)?;
    let version_part = rest.split_whitespace().next()?;
    let mut parts = version_part.split('.');
    let major = parts.next()?.parse::<u32>().ok()?;
    let minor = parts.next()?.parse::<u32>().ok()?;
    let patch = parts
        .next()
        .and_then(|p| {
            let digits: String = p.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .unwrap_or(0);
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("git-svn version 2.39.3 (svn 1.14.2)"),
            Some((2, 39, 3))
        );
        assert_eq!(parse_version("git version 2.45.1.windows.1"), Some((2, 45, 1)));
        assert_eq!(parse_version("git-svn version 1.5.3"), Some((1, 5, 3)));
        assert_eq!(parse_version("git version 2.7"), Some((2, 7, 0)));
        assert_eq!(parse_version("no version here"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_find_repository_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        let result = find_repository_in_path(&dir.path().to_string_lossy());
        assert!(matches!(result, Err(GitRbError::NoRepositoryFound)));
    }
}
