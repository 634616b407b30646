use std::io::Write;
use thiserror::Error;

/// The only text a user ever sees when something goes wrong.
///
/// Every error condition (invocation, parse, usage, resolution, launch,
/// fork) prints exactly this line to standard error. The detailed cause is
/// written to the log instead.
pub const DIAGNOSTIC: &str = "An error has occurred\n";

/// Everything that can go wrong while running a command line.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Bad command-line usage of the shell itself, or an unreadable batch file.
    #[error("invocation error: {0}")]
    Invocation(String),
    /// Malformed redirection clause.
    #[error("parse error: {0}")]
    Parse(String),
    /// Wrong number of arguments (or unknown flags) for a built-in.
    #[error("usage error: {0}")]
    Usage(String),
    /// A directory or program could not be found.
    #[error("resolution error: {0}")]
    Resolution(String),
    /// The redirection target could not be opened.
    #[error("launch error: {0}")]
    Launch(String),
    /// The child process could not be created.
    #[error("process creation error: {0}")]
    Fork(#[source] nix::Error),
}

impl ShellError {
    /// Fatal errors terminate the shell; all others only abandon the current command.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Invocation(_) | ShellError::Fork(_))
    }
}

/// Write the uniform diagnostic to standard error.
///
/// Also used from a forked child, so it takes no locks beyond the one
/// `Stderr` needs and ignores write failures.
pub fn report() {
    let _ = std::io::stderr().write_all(DIAGNOSTIC.as_bytes());
}
