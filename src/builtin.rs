use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use log::debug;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Commands the shell runs itself instead of forking.
///
/// Every token after the name is a plain positional argument; there are no
/// flags, so `--` or `-dir` reach the command as typed. Builtins print
/// nothing; every failure is a [`ShellError`] and surfaces as the uniform
/// diagnostic.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "exit" or "cd".
    fn name() -> &'static str;

    /// Builds the command from the tokens that followed its name.
    fn from_tokens(args: &[&str]) -> Self;

    /// Executes the command against the session state.
    fn execute(self, env: &mut Environment) -> Result<ExitCode, ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        T::execute(*self, env)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(Box::new(T::from_tokens(args)))
        } else {
            None
        }
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Exit the shell with status 0. Takes no arguments.
pub struct Exit {
    pub args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_tokens(args: &[&str]) -> Self {
        Self { args: owned(args) }
    }

    fn execute(self, env: &mut Environment) -> Result<ExitCode, ShellError> {
        if !self.args.is_empty() {
            return Err(ShellError::Usage(format!(
                "exit takes no arguments, got {:?}",
                self.args
            )));
        }
        env.should_exit = true;
        Ok(0)
    }
}

/// Change the current working directory.
/// Only the first argument is used; any further ones are ignored.
pub struct Cd {
    pub args: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_tokens(args: &[&str]) -> Self {
        Self { args: owned(args) }
    }

    fn execute(self, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let Some(target) = self.args.first() else {
            return Err(ShellError::Usage("cd needs a directory".to_string()));
        };
        if self.args.len() > 1 {
            debug!("cd: ignoring extra arguments {:?}", &self.args[1..]);
        }

        let target = PathBuf::from(target);
        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir).map_err(|e| {
            ShellError::Resolution(format!("cd: can't canonicalize {}: {}", new_dir.display(), e))
        })?;

        env::set_current_dir(&canonical).map_err(|e| {
            ShellError::Resolution(format!("cd: can't chdir to {}: {}", canonical.display(), e))
        })?;
        env.current_dir = canonical;
        Ok(0)
    }
}
