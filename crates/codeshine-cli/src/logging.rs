// Logging and verbosity control

use tracing::Level;

/// Verbosity requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Errors only, no progress lines or preview
    Quiet,
    /// Level taken from configuration
    Normal,
    /// Debug output
    Verbose,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Whether progress lines and the live preview should be shown
    pub fn shows_progress(&self) -> bool {
        *self != VerbosityLevel::Quiet
    }
}

/// Parses a configured level name, defaulting to `INFO`
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Max tracing level for the given flags and configured level
pub fn effective_level(verbosity: VerbosityLevel, configured: &str) -> Level {
    match verbosity {
        VerbosityLevel::Quiet => Level::ERROR,
        VerbosityLevel::Verbose => Level::DEBUG,
        // INFO duplicates the progress lines
        VerbosityLevel::Normal => match parse_level(configured) {
            Level::INFO => Level::WARN,
            level => level,
        },
    }
}

/// Initialize logging based on CLI flags and configuration
///
/// Logs go to stderr; stdout carries only the command's result.
pub fn init_logging(verbosity: VerbosityLevel, configured: &str) {
    let level = effective_level(verbosity, configured);
    let verbose = verbosity == VerbosityLevel::Verbose;

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbose)
        .with_line_number(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}
