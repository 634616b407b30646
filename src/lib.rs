//! A minimal command-line shell.
//!
//! This crate reads command lines (interactively or from a batch file), splits
//! them into argument vectors, runs the `exit` and `cd` built-ins in-process
//! and launches everything else as a child process found on a fixed search
//! path, with optional `> file` output redirection.
//!
//! The main entry point is [`Interpreter`], which owns the session state and
//! drives the read, tokenize, dispatch loop over a [`LineSource`]. The public
//! modules [`command`] and [`env`] expose traits and types for implementing
//! your own commands and for inspecting the session.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
pub mod input;
mod interpreter;
pub mod lexer;
pub mod logging;
pub mod redirect;

pub use config::ShellConfig;
pub use error::ShellError;
pub use input::LineSource;
pub use interpreter::{Interpreter, Mode};
