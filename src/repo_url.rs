use url::Url;

const GITHUB_HOST: &str = "github.com";

/// Expand a repository URL into every equivalent spelling GitHub accepts.
///
/// Review servers match the registered repository path against whatever is
/// configured locally, so a GitHub URL in any of its forms (http, https, git://,
/// scp-like ssh, with or without `.git`) becomes the full set of spellings.
/// Anything else comes back unchanged as a single entry.
pub fn expand_repo_paths(url_str: &str) -> Vec<String> {
    match github_repo_path(url_str) {
        Some(repo) => vec![
            format!("http://github.com/{}", repo),
            format!("http://github.com/{}.git", repo),
            format!("https://github.com/{}", repo),
            format!("https://github.com/{}.git", repo),
            format!("git://github.com/{}", repo),
            format!("git://github.com/{}.git", repo),
            format!("git@github.com:{}", repo),
            format!("git@github.com:{}.git", repo),
        ],
        None => vec![url_str.to_string()],
    }
}

/// The `owner/name` part of a GitHub URL, without a trailing `.git`.
fn github_repo_path(url_str: &str) -> Option<String> {
    let url_str = url_str.trim();

    // ssh scp-like form only for the conventional git user
    if let Some(path) = url_str.strip_prefix("git@github.com:") {
        return non_empty_repo(path);
    }

    let url = Url::parse(url_str).ok()?;
    if url.host_str() != Some(GITHUB_HOST) || url.port().is_some() {
        return None;
    }
    match url.scheme() {
        // credentials are allowed on http(s)
        "http" | "https" => {}
        "git" if url.username().is_empty() && url.password().is_none() => {}
        _ => return None,
    }
    if url.query().is_some() || url.fragment().is_some() {
        return None;
    }
    non_empty_repo(url.path().trim_start_matches('/'))
}

fn non_empty_repo(path: &str) -> Option<String> {
    let repo = path.strip_suffix(".git").unwrap_or(path);
    if repo.is_empty() {
        None
    } else {
        Some(repo.to_string())
    }
}
