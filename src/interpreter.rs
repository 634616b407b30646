use crate::command::{CommandFactory, ExitCode};
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::input::LineSource;
use crate::lexer;
use log::{debug, warn};

/// Zero-sized factory for one of this crate's command types
/// (a builtin or `ExternalCommand`).
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// How lines are framed: prompted from a terminal, or read silently from a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Batch,
}

/// The shell: session state plus an ordered dispatch table.
///
/// Each line's first token is offered to the [`CommandFactory`] list in order;
/// the first factory that accepts it builds the command, which then runs
/// against the session's [`Environment`]. Builtins come first and the
/// external launcher last, so it catches every other name.
///
/// Example
/// ```
/// use msh::Interpreter;
/// let mut sh = Interpreter::default();
/// sh.execute_line("exit").unwrap();
/// assert!(sh.env().should_exit);
/// ```
pub struct Interpreter {
    env: Environment,
    config: ShellConfig,
    commands: Vec<Box<dyn CommandFactory>>,
    commands_read: usize,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(config: ShellConfig, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(config.search_path.clone()),
            config,
            commands,
            commands_read: 0,
        }
    }

    /// Create an interpreter with the default commands and a custom configuration.
    pub fn with_config(config: ShellConfig) -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(
            config,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    /// Session state: working directory, search path, exit flag.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Number of non-empty lines read so far.
    pub fn commands_read(&self) -> usize {
        self.commands_read
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code or the error that abandoned it.
    pub fn run(&mut self, name: &str, args: &[&str]) -> Result<ExitCode, ShellError> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(&mut self.env);
            }
        }
        Err(ShellError::Resolution(format!("command not found: {}", name)))
    }

    /// Tokenize one line and dispatch it.
    ///
    /// Returns `Ok(None)` for a blank line, which does not count as a command.
    pub fn execute_line(&mut self, line: &str) -> Result<Option<ExitCode>, ShellError> {
        let tokens =
            lexer::split_into_tokens(line, self.config.max_tokens, self.config.max_token_len);
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(None);
        };
        self.commands_read += 1;
        debug!("command #{}: {:?}", self.commands_read, tokens);

        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.run(name, &args).map(Some)
    }

    /// Read, tokenize and dispatch lines until `exit` or end of input.
    ///
    /// Returns the shell's exit status. Non-fatal errors are reported with the
    /// uniform diagnostic and the loop goes on; fatal ones are returned.
    pub fn run_loop(&mut self, source: &mut dyn LineSource, mode: Mode) -> anyhow::Result<i32> {
        loop {
            let prompt = match mode {
                Mode::Interactive => Some(self.config.prompt.as_str()),
                Mode::Batch => None,
            };
            let Some(line) = source.read_line(prompt)? else {
                return Ok(self.end_of_input_status(mode));
            };

            match self.execute_line(&line) {
                Ok(Some(code)) => debug!("exit code {}", code),
                Ok(None) => {}
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => {
                    warn!("{}", err);
                    error::report();
                }
            }

            if self.env.should_exit {
                return Ok(0);
            }
        }
    }

    fn end_of_input_status(&self, mode: Mode) -> i32 {
        match mode {
            Mode::Batch if self.commands_read == 0 => 1,
            Mode::Batch | Mode::Interactive => 0,
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `cd`
    /// - external command launcher
    fn default() -> Self {
        Self::with_config(ShellConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ExecutableCommand;
    use crate::input::LineReader;
    use crate::test_support::{lock_current_dir, make_unique_temp_dir};
    use std::cell::RefCell;
    use std::env as stdenv;
    use std::fs;
    use std::io::{self, Cursor};
    use std::rc::Rc;

    /// Records every name it is asked to run instead of launching anything.
    struct Recorder {
        seen: Rc<RefCell<Vec<String>>>,
    }

    struct Recorded;

    impl ExecutableCommand for Recorded {
        fn execute(self: Box<Self>, _env: &mut Environment) -> Result<ExitCode, ShellError> {
            Ok(7)
        }
    }

    impl CommandFactory for Recorder {
        fn try_create(
            &self,
            _env: &Environment,
            name: &str,
            args: &[&str],
        ) -> Option<Box<dyn ExecutableCommand>> {
            let mut line = vec![name.to_string()];
            line.extend(args.iter().map(|a| a.to_string()));
            self.seen.borrow_mut().push(line.join(" "));
            Some(Box::new(Recorded))
        }
    }

    fn recording_interpreter() -> (Interpreter, Rc<RefCell<Vec<String>>>) {
        use crate::builtin::{Cd, Exit};
        let seen = Rc::new(RefCell::new(Vec::new()));
        let interp = Interpreter::new(
            ShellConfig::default(),
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Recorder { seen: seen.clone() }),
            ],
        );
        (interp, seen)
    }

    fn batch(text: &str) -> LineReader<Cursor<Vec<u8>>, io::Sink> {
        LineReader::new(Cursor::new(text.as_bytes().to_vec()), io::sink(), 255)
    }

    #[test]
    fn test_blank_line_is_noop() {
        let (mut interp, seen) = recording_interpreter();
        assert_eq!(interp.execute_line("   \t").unwrap(), None);
        assert_eq!(interp.commands_read(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_external_commands_reach_last_factory() {
        let (mut interp, seen) = recording_interpreter();
        assert_eq!(interp.execute_line("  ls   -l \t\n").unwrap(), Some(7));
        assert_eq!(*seen.borrow(), vec!["ls -l".to_string()]);
        assert_eq!(interp.commands_read(), 1);
    }

    #[test]
    fn test_builtins_are_not_external() {
        let (mut interp, seen) = recording_interpreter();
        assert!(matches!(interp.execute_line("exit now"), Err(ShellError::Usage(_))));
        assert!(matches!(interp.execute_line("cd"), Err(ShellError::Usage(_))));
        assert!(seen.borrow().is_empty());
        assert_eq!(interp.commands_read(), 2);
    }

    #[test]
    fn test_exit_double_dash_keeps_loop_running() {
        crate::test_support::init_logging();
        let (mut interp, seen) = recording_interpreter();
        let mut src = batch("exit --\nafter\n");
        assert_eq!(interp.run_loop(&mut src, Mode::Batch).unwrap(), 0);
        assert!(!interp.env().should_exit);
        assert_eq!(*seen.borrow(), vec!["after".to_string()]);
    }

    #[test]
    fn test_no_factory_is_resolution_error() {
        let mut interp = Interpreter::new(ShellConfig::default(), Vec::new());
        assert!(matches!(interp.run("ls", &[]), Err(ShellError::Resolution(_))));
    }

    #[test]
    fn test_exit_stops_loop_with_zero() {
        let (mut interp, seen) = recording_interpreter();
        let mut src = batch("first\nexit\nsecond\n");
        assert_eq!(interp.run_loop(&mut src, Mode::Batch).unwrap(), 0);
        assert_eq!(*seen.borrow(), vec!["first".to_string()]);
    }

    #[test]
    fn test_errors_do_not_stop_loop() {
        let (mut interp, seen) = recording_interpreter();
        let mut src = batch("exit now\ncd\nafter\n");
        assert_eq!(interp.run_loop(&mut src, Mode::Batch).unwrap(), 0);
        assert_eq!(*seen.borrow(), vec!["after".to_string()]);
        assert_eq!(interp.commands_read(), 3);
    }

    #[test]
    fn test_empty_batch_exits_one() {
        let (mut interp, _) = recording_interpreter();
        let mut src = batch("\n   \n\t\n");
        assert_eq!(interp.run_loop(&mut src, Mode::Batch).unwrap(), 1);
    }

    #[test]
    fn test_batch_with_commands_exits_zero_at_eof() {
        let (mut interp, _) = recording_interpreter();
        let mut src = batch("one\ntwo");
        assert_eq!(interp.run_loop(&mut src, Mode::Batch).unwrap(), 0);
        assert_eq!(interp.commands_read(), 2);
    }

    #[test]
    fn test_interactive_eof_exits_zero_even_without_commands() {
        let (mut interp, _) = recording_interpreter();
        let mut src = batch("");
        assert_eq!(interp.run_loop(&mut src, Mode::Interactive).unwrap(), 0);
    }

    #[test]
    fn test_prompt_only_in_interactive_mode() {
        let (mut interp, _) = recording_interpreter();
        let mut out = Vec::new();
        {
            let mut src = LineReader::new(Cursor::new("a\nb\n"), &mut out, 255);
            interp.run_loop(&mut src, Mode::Interactive).unwrap();
        }
        // One prompt per read, including the one that hits end of input.
        assert_eq!(String::from_utf8(out).unwrap(), "msh> msh> msh> ");

        let (mut interp, _) = recording_interpreter();
        let mut out = Vec::new();
        {
            let mut src = LineReader::new(Cursor::new("a\nb\n"), &mut out, 255);
            interp.run_loop(&mut src, Mode::Batch).unwrap();
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_failed_cd_keeps_session_dir() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let (mut interp, _) = recording_interpreter();
        let before = interp.env().current_dir.clone();

        let res = interp.execute_line("cd /path/does/not/exist");
        assert!(matches!(res, Err(ShellError::Resolution(_))));
        assert_eq!(interp.env().current_dir, before);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cd_then_relative_program_runs_there() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let dir = make_unique_temp_dir("interp_cd");
        let canonical = fs::canonicalize(&dir).unwrap();
        let prog = canonical.join("prog");
        fs::write(&prog, "#!/bin/sh\necho ran\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&prog, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let mut interp = Interpreter::with_config(ShellConfig::with_search_path(["./"]));
        interp
            .execute_line(&format!("cd {}", canonical.display()))
            .unwrap();
        let code = interp.execute_line("./prog > out.txt").unwrap();
        assert_eq!(code, Some(0));
        assert_eq!(fs::read_to_string(canonical.join("out.txt")).unwrap(), "ran\n");

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(dir);
    }
}
