use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::interpreter::Factory;
use crate::redirect;
use log::{Level, debug, log_enabled};
use nix::libc;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{AccessFlags, ForkResult, access, chdir, execv, fork};
use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// Command that is not a builtin.
///
/// Always created: whether the program exists is only known inside the
/// child, which reports a failed lookup itself.
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: String, args: Vec<String>) -> Self {
        Self { name, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        Some(Box::new(ExternalCommand::new(
            name.to_string(),
            args.iter().map(|x| x.to_string()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let ExternalCommand { name, mut args } = *self;

        let stdout = match redirect::extract_redirect(&mut args)? {
            Some(target) => {
                debug!("redirecting {} to {}", name, target.path(&env.current_dir).display());
                Some(target.open(&env.current_dir)?)
            }
            None => None,
        };

        if log_enabled!(Level::Debug) {
            debug!("{} resolves to {:?}", name, find_command_path(&env.search_path, &name));
        }
        let launch = Launch::prepare(&name, &args, &env.search_path, &env.current_dir)?;
        launch.spawn(stdout)
    }
}

/// Everything the child needs, converted before forking so the child
/// itself does no fallible conversions.
struct Launch {
    name: String,
    candidates: Vec<CString>,
    argv: Vec<CString>,
    current_dir: CString,
}

impl Launch {
    fn prepare(
        name: &str,
        args: &[String],
        search_path: &[String],
        current_dir: &Path,
    ) -> Result<Self, ShellError> {
        let nul = |what: &str| ShellError::Resolution(format!("{} contains a NUL byte", what));

        let candidates = search_candidates(search_path, name).map_err(|_| nul("program name"))?;
        let argv = std::iter::once(name)
            .chain(args.iter().map(String::as_str))
            .map(CString::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| nul("argument"))?;
        let current_dir = CString::new(current_dir.as_os_str().as_bytes())
            .map_err(|_| nul("working directory"))?;

        Ok(Self {
            name: name.to_string(),
            candidates,
            argv,
            current_dir,
        })
    }

    /// Forks, runs the program in the child and waits for it.
    fn spawn(self, stdout: Option<File>) -> Result<ExitCode, ShellError> {
        // Anything still buffered would otherwise be written twice.
        let _ = std::io::stdout().flush();

        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                drop(stdout);
                debug!("started {} as pid {}", self.name, child);
                match waitpid(child, None) {
                    Ok(status) => {
                        let code = exit_code(status);
                        debug!("pid {} finished with status {}", child, code);
                        Ok(code)
                    }
                    Err(e) => {
                        debug!("waitpid({}) failed: {}", child, e);
                        Ok(-1)
                    }
                }
            }
            Ok(ForkResult::Child) => self.exec_child(stdout),
            Err(e) => Err(ShellError::Fork(e)),
        }
    }

    /// Runs in the forked child; never returns.
    fn exec_child(self, stdout: Option<File>) -> ! {
        if let Some(file) = stdout {
            if unsafe { libc::dup2(file.as_raw_fd(), libc::STDOUT_FILENO) } == -1 {
                child_fail();
            }
            drop(file);
        }

        if chdir(self.current_dir.as_c_str()).is_err() {
            child_fail();
        }

        if let Some(path) = find_executable(&self.candidates) {
            // Only returns on failure.
            let _ = execv(path, &self.argv);
        }
        child_fail()
    }
}

/// Reports the uniform diagnostic from the child and exits non-zero.
fn child_fail() -> ! {
    error::report();
    unsafe { libc::_exit(1) }
}

/// Builds `prefix + name` for every search-path entry, in order.
fn search_candidates(search_path: &[String], name: &str) -> Result<Vec<CString>, std::ffi::NulError> {
    search_path
        .iter()
        .map(|prefix| CString::new(format!("{}{}", prefix, name)))
        .collect()
}

/// First candidate that exists and is executable by the caller.
fn find_executable(candidates: &[CString]) -> Option<&CStr> {
    candidates
        .iter()
        .map(CString::as_c_str)
        .find(|path| access(*path, AccessFlags::X_OK).is_ok())
}

/// Resolve a command path the way this shell does: plain concatenation of
/// each search-path prefix with `name`, first executable match wins.
///
/// Relative prefixes (like `./`) are taken relative to the process
/// working directory.
pub fn find_command_path(search_path: &[String], name: &str) -> Option<String> {
    let candidates = search_candidates(search_path, name).ok()?;
    find_executable(&candidates).map(|path| path.to_string_lossy().into_owned())
}

fn exit_code(status: WaitStatus) -> ExitCode {
    match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => terminated_by_signal(signal as i32),
        _ => -1,
    }
}

fn terminated_by_signal(signal: i32) -> i32 {
    128 + signal
}
