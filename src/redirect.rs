//! Output redirection: the trailing `> file` clause of an external command.

use crate::error::ShellError;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// The redirection operator.
pub const REDIRECT_OUT: &str = ">";

/// Permission bits of a file created by redirection (owner read/write).
const TARGET_MODE: u32 = 0o600;

/// A resolved output redirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// The file standard output goes to, as typed by the user.
    pub target: String,
}

impl Redirect {
    /// Path of the target, relative paths taken from `current_dir`.
    pub fn path(&self, current_dir: &Path) -> PathBuf {
        current_dir.join(&self.target)
    }

    /// Opens (creating or truncating) the target for writing.
    pub fn open(&self, current_dir: &Path) -> Result<File, ShellError> {
        let path = self.path(current_dir);
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .mode(TARGET_MODE)
            .open(&path)
            .map_err(|e| ShellError::Launch(format!("{}: {}", path.display(), e)))
    }
}

/// Strips a trailing `> file` clause from `args`.
///
/// Only the first `>` counts. It must be followed by exactly one token;
/// anything else is a parse error and `args` is left untouched.
pub fn extract_redirect(args: &mut Vec<String>) -> Result<Option<Redirect>, ShellError> {
    let Some(pos) = args.iter().position(|arg| arg == REDIRECT_OUT) else {
        return Ok(None);
    };

    match args.len() - pos - 1 {
        0 => Err(ShellError::Parse(format!(
            "missing file after `{}`",
            REDIRECT_OUT
        ))),
        1 => {
            let target = args.pop().unwrap_or_default();
            args.truncate(pos);
            Ok(Some(Redirect { target }))
        }
        extra => Err(ShellError::Parse(format!(
            "{} tokens after `{}`, expected one file",
            extra, REDIRECT_OUT
        ))),
    }
}
