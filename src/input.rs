//! Where command lines come from.

use crate::error::ShellError;
use crate::lexer::truncate_chars;
use anyhow::{Context, Result};
use log::warn;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, StdinLock, Stdout, Write};
use std::path::Path;

/// A source of command lines.
pub trait LineSource {
    /// Reads the next line, without its trailing newline.
    ///
    /// `prompt` is shown first when given. Returns `Ok(None)` at end of input.
    fn read_line(&mut self, prompt: Option<&str>) -> Result<Option<String>>;
}

/// Line source over any buffered reader, e.g. a batch file or a pipe.
///
/// Prompts go to `prompt_out`. Lines longer than `max_len` characters are
/// truncated; the rest of that line is discarded.
pub struct LineReader<R, W> {
    reader: R,
    prompt_out: W,
    max_len: usize,
}

impl<R: BufRead, W: Write> LineReader<R, W> {
    pub fn new(reader: R, prompt_out: W, max_len: usize) -> Self {
        Self {
            reader,
            prompt_out,
            max_len,
        }
    }
}

impl LineReader<BufReader<File>, io::Sink> {
    /// Opens a batch file. Failure is an invocation error.
    pub fn open_batch(path: &Path, max_len: usize) -> Result<Self, ShellError> {
        let file = File::open(path)
            .map_err(|e| ShellError::Invocation(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(BufReader::new(file), io::sink(), max_len))
    }
}

impl LineReader<StdinLock<'static>, Stdout> {
    /// Reads standard input, prompting on standard output. Used for
    /// interactive mode when standard input is not a terminal.
    pub fn stdin(max_len: usize) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), max_len)
    }
}

impl<R: BufRead, W: Write> LineSource for LineReader<R, W> {
    fn read_line(&mut self, prompt: Option<&str>) -> Result<Option<String>> {
        if let Some(prompt) = prompt {
            self.prompt_out
                .write_all(prompt.as_bytes())
                .and_then(|_| self.prompt_out.flush())
                .context("failed to write prompt")?;
        }

        let mut buf = Vec::new();
        let n = self
            .reader
            .read_until(b'\n', &mut buf)
            .context("failed to read command line")?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(Some(bounded(&String::from_utf8_lossy(&buf), self.max_len)))
    }
}

/// Interactive line source backed by `rustyline`.
pub struct Editor {
    editor: DefaultEditor,
    max_len: usize,
}

impl Editor {
    pub fn new(max_len: usize) -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialise line editor")?;
        Ok(Self { editor, max_len })
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: Option<&str>) -> Result<Option<String>> {
        match self.editor.readline(prompt.unwrap_or("")) {
            Ok(line) => {
                let editor = &mut self.editor;
                Ok(Some(accept_line(&line, self.max_len, |l| {
                    editor.add_history_entry(l)
                })))
            }
            // Ctrl-C abandons the current line only.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("failed to read command line"),
        }
    }
}

/// Records a non-blank line in history and bounds it. A history failure is
/// only logged; the line is still returned.
fn accept_line<F>(line: &str, max_len: usize, record: F) -> String
where
    F: FnOnce(&str) -> rustyline::Result<bool>,
{
    if !line.trim().is_empty() {
        if let Err(err) = record(line) {
            warn!("failed to record history: {}", err);
        }
    }
    bounded(line, max_len)
}

fn bounded(line: &str, max_len: usize) -> String {
    truncate_chars(line, max_len).to_string()
}
