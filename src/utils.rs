use std::io::IsTerminal;

/// Check if debug logging is enabled via environment variable
///
/// This is checked once at module initialization to avoid repeated environment variable lookups.
static DEBUG_ENABLED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
static IS_TERMINAL: std::sync::OnceLock<bool> = std::sync::OnceLock::new();

fn is_debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| {
        (cfg!(debug_assertions) || std::env::var("GIT_RB_DEBUG").unwrap_or_default() == "1")
            && std::env::var("GIT_RB_DEBUG").unwrap_or_default() != "0"
    })
}

/// Debug logging utility function
///
/// Prints debug messages with a colored prefix when debug assertions are enabled or when
/// the `GIT_RB_DEBUG` environment variable is set to "1".
pub fn debug_log(msg: &str) {
    if is_debug_enabled() {
        eprintln!("\x1b[1;33m[git-rb]\x1b[0m {}", msg);
    }
}

pub fn is_interactive_terminal() -> bool {
    *IS_TERMINAL.get_or_init(|| std::io::stdout().is_terminal())
}

/// Windows-specific flag to prevent console window creation
#[cfg(windows)]
pub const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Strip the `refs/heads/` prefix from a ref name, if present.
pub fn strip_heads_prefix(refname: &str) -> &str {
    refname.strip_prefix("refs/heads/").unwrap_or(refname)
}

/// Compare two (major, minor, patch) tuples.
pub fn is_valid_version(actual: (u32, u32, u32), expected: (u32, u32, u32)) -> bool {
    actual >= expected
}
