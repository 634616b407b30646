use argh::{EarlyExit, FromArgs};
use log::{info, warn};
use msh::input::{Editor, LineReader};
use msh::{Interpreter, Mode, ShellConfig, ShellError, error, logging};
use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitCode;

#[derive(FromArgs)]
/// A minimal command-line shell.
/// Without arguments, reads commands interactively; otherwise runs the given batch file.
struct Args {
    #[argh(positional)]
    /// file to read commands from instead of standard input.
    batch: Option<String>,
}

/// `Ok(None)` when `--help` was answered and there is nothing to run.
fn parse_args() -> Result<Option<Args>, ShellError> {
    let argv: Vec<String> = std::env::args().collect();
    let cmd = argv.first().map(String::as_str).unwrap_or("msh");
    let rest: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();

    match Args::from_args(&[cmd], &rest) {
        Ok(args) => Ok(Some(args)),
        Err(EarlyExit { output, status }) => match status {
            Ok(()) => {
                println!("{}", output);
                Ok(None)
            }
            Err(()) => Err(ShellError::Invocation(output.trim_end().to_string())),
        },
    }
}

fn run() -> anyhow::Result<i32> {
    let Some(args) = parse_args()? else {
        return Ok(0);
    };
    let config = ShellConfig::default();
    let max_len = config.max_line_len;
    let mut shell = Interpreter::with_config(config);

    match args.batch {
        Some(path) => {
            info!("batch mode: {}", path);
            let mut source = LineReader::open_batch(Path::new(&path), max_len)?;
            shell.run_loop(&mut source, Mode::Batch)
        }
        None if io::stdin().is_terminal() => {
            info!("interactive mode");
            let mut source = Editor::new(max_len)?;
            shell.run_loop(&mut source, Mode::Interactive)
        }
        None => {
            info!("interactive mode, standard input is not a terminal");
            let mut source = LineReader::stdin(max_len);
            shell.run_loop(&mut source, Mode::Interactive)
        }
    }
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(status) => ExitCode::from(status as u8),
        Err(err) => {
            warn!("{:#}", err);
            error::report();
            ExitCode::FAILURE
        }
    }
}
