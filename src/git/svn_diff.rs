//! Rewrites `git diff` output into the dialect `svn diff` produces, so an SVN
//! diff parser on the review server can read diffs made from a git-svn checkout.

use crate::error::GitRbError;
use crate::git::repository::Repository;
use crate::git::svn_bridge;
use crate::utils::debug_log;

const INDEX_SEPARATOR_WIDTH: usize = 67;
const BINARY_MARKER: &str = "Cannot display: file marked as a binary type.\n";
const BINARY_MIME_TYPE: &str = "svn:mime-type = application/octet-stream\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingHeader,
    InFileSection { new_file: bool },
    /// Inside hunk bodies. Unlike a two-state classifier, lines starting with
    /// `---`/`+++` here are hunk content and pass through instead of being read as headers.
    InHunk,
}

/// Streaming translator: feed it native diff lines in order, then `finish`.
#[derive(Debug)]
pub struct SvnDiffTranslator {
    revision: String,
    state: State,
    current_filename: String,
    out: String,
}

impl SvnDiffTranslator {
    /// `revision` is the SVN revision the diff's `---` side is stamped with.
    pub fn new(revision: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            state: State::AwaitingHeader,
            current_filename: String::new(),
            out: String::new(),
        }
    }

    /// Process one line. `line` may include its trailing newline; pass-through
    /// lines are emitted byte for byte.
    pub fn feed_line(&mut self, line: &str) {
        let content = line.trim_end_matches(['\n', '\r']);

        if content.starts_with("diff ") {
            let path = content.split(' ').nth(2).unwrap_or("");
            self.out.push_str(&format!("Index: {}\n", path));
            self.out.push_str(&"=".repeat(INDEX_SEPARATOR_WIDTH));
            self.out.push('\n');
            self.state = State::InFileSection { new_file: false };
            return;
        }

        if self.state == State::InHunk {
            self.push_verbatim(line);
            return;
        }

        let new_file = matches!(self.state, State::InFileSection { new_file: true });

        if content.starts_with("index ") || content.starts_with("new file mode") {
            // dropped
        } else if content.trim() == "--- /dev/null" {
            self.state = State::InFileSection { new_file: true };
        } else if let Some(path) = content.strip_prefix("--- ") {
            self.state = State::InFileSection { new_file: false };
            self.out
                .push_str(&format!("--- {}\t(revision {})\n", path.trim(), self.revision));
        } else if let Some(path) = content.strip_prefix("+++ ") {
            self.current_filename = path.trim().to_string();
            if new_file {
                self.out
                    .push_str(&format!("--- {}\t(revision 0)\n", self.current_filename));
                self.out
                    .push_str(&format!("+++ {}\t(revision 0)\n", self.current_filename));
            } else {
                self.out
                    .push_str(&format!("+++ {}\t(working copy)\n", self.current_filename));
            }
        } else if content.starts_with("Binary files ") {
            self.out.push_str(BINARY_MARKER);
            self.out.push_str(BINARY_MIME_TYPE);
        } else {
            if content.starts_with("@@") {
                self.state = State::InHunk;
            }
            self.push_verbatim(line);
        }
    }

    fn push_verbatim(&mut self, line: &str) {
        self.out.push_str(line);
        if !line.ends_with('\n') {
            self.out.push('\n');
        }
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Translate a whole native diff for the given SVN revision.
pub fn translate(native_diff: &str, revision: &str) -> String {
    let mut translator = SvnDiffTranslator::new(revision);
    for line in native_diff.split_inclusive('\n') {
        translator.feed_line(line);
    }
    translator.finish()
}

/// Translate `native_diff`, stamping it with the SVN revision git-svn maps `ancestor` to.
///
/// Fails with `TranslationUnavailable` when `ancestor` has no SVN revision.
pub fn make_svn_diff(
    repo: &Repository,
    ancestor: &str,
    native_diff: &str,
) -> Result<String, GitRbError> {
    let Some(revision) = svn_bridge::find_rev(repo, ancestor) else {
        debug_log(&format!("no SVN revision for {}", ancestor));
        return Err(GitRbError::TranslationUnavailable(ancestor.to_string()));
    };
    Ok(translate(native_diff, &revision))
}
