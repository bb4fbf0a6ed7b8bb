//! Logging with colored module prefixes.
//!
//! There is no global logger: a [`Logger`] handle travels inside the
//! [`RunContext`](crate::context::RunContext) and the macros take the
//! context explicitly.
//!
//! # Example
//!
//! ```ignore
//! log!(ctx; "store"; "loaded {} posts", store.len());
//! debug!(ctx; "classify"; "`{}` is a blog post", path);
//! log!(ctx; "warn"; "{reason}, issuing rebuild");
//! ```

use colored::{ColoredString, Colorize};
use crossterm::terminal::size;
use std::{
    io::{Write, stderr, stdout},
    sync::OnceLock,
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!(ctx; "module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($ctx:expr; $module:expr; $($arg:tt)*) => {{
        $ctx.logger().log($module, &format!($($arg)*))
    }};
}

/// Log a message only when verbose output is enabled.
#[macro_export]
macro_rules! debug {
    ($ctx:expr; $module:expr; $($arg:tt)*) => {{
        let logger = $ctx.logger();
        if logger.is_verbose() {
            logger.log_debug($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Logger
// ============================================================================

/// How much output a run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    #[default]
    Normal,
    /// Everything, including per-item debug lines.
    Verbose,
}

/// Logger handle passed through store, classifier and planner calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    verbosity: Verbosity,
}

impl Logger {
    pub const fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// A logger that prints nothing but warnings and errors.
    pub const fn quiet() -> Self {
        Self::new(Verbosity::Quiet)
    }

    #[inline]
    pub fn is_verbose(&self) -> bool {
        self.verbosity >= Verbosity::Verbose
    }

    /// Print a message. `warn` and `error` modules go to stderr and are
    /// never suppressed.
    pub fn log(&self, module: &str, message: &str) {
        let module_lower = module.to_ascii_lowercase();
        let is_problem = matches!(module_lower.as_str(), "warn" | "error");
        if !is_problem && self.verbosity == Verbosity::Quiet {
            return;
        }

        let prefix = colorize_prefix(module, &module_lower);
        if is_problem {
            let mut stderr = stderr().lock();
            writeln!(stderr, "{prefix} {message}").ok();
        } else {
            write_line(&prefix, module.len(), message);
        }
    }

    /// Print a dimmed debug message (callers check `is_verbose` first).
    pub fn log_debug(&self, module: &str, message: &str) {
        let prefix = format!("[{module}]").dimmed();
        write_line(&prefix, module.len(), message);
    }
}

/// Write one prefixed line to stdout, truncated to the terminal width.
fn write_line(prefix: &ColoredString, module_len: usize, message: &str) {
    let mut stdout = stdout().lock();

    if message.contains('\n') {
        writeln!(stdout, "{prefix} {message}").ok();
    } else {
        let width = get_terminal_width() as usize;
        let max_msg_len = width.saturating_sub(calc_prefix_len(module_len));
        writeln!(stdout, "{prefix} {}", truncate_str(message, max_msg_len)).ok();
    }

    stdout.flush().ok();
}

fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "update" | "rebuild" => prefix.bright_blue().bold(),
        "render" => prefix.bright_green().bold(),
        "delete" => prefix.bright_magenta().bold(),
        "warn" => prefix.yellow().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    // Find the last valid UTF-8 boundary within max_len
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
