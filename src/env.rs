use std::env as stdenv;
use std::path::PathBuf;

/// Mutable state of one shell session.
///
/// The environment contains:
/// - `current_dir`: the working directory every child process starts in.
///   Only `cd` changes it.
/// - `search_path`: ordered directory prefixes used to resolve external
///   programs. Fixed for the life of the session.
/// - `should_exit`: set by `exit`; the loop checks it after every command.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The working directory for command execution.
    pub current_dir: PathBuf,
    /// Directory prefixes consulted, in order, for external programs.
    pub search_path: Vec<String>,
    /// When set to true, the loop terminates with status 0.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the process working directory into a new session.
    ///
    /// `current_dir` falls back to `.` when the process directory is gone.
    pub fn new(search_path: Vec<String>) -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            search_path,
            should_exit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use crate::test_support::lock_current_dir;
    use std::env as stdenv;

    #[test]
    fn test_env_starts_in_process_dir() {
        let _lock = lock_current_dir();
        let env = Environment::new(vec!["/bin/".to_string()]);
        assert_eq!(env.current_dir, stdenv::current_dir().unwrap());
        assert_eq!(env.search_path, vec!["/bin/".to_string()]);
        assert!(!env.should_exit);
    }
}
