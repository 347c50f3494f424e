//! Line-oriented edit shell driving one [`EditSession`].
//!
//! Each input line is one command:
//!
//! ```text
//! load <path>        save [path]        apply <op>   (or just <op>)
//! undo               redo               reset
//! dims               history            help         quit
//! ```
//!
//! Blank lines and lines starting with `#` are ignored, so a script of
//! commands can be piped in. A failing command prints `error: ...` and the
//! shell keeps reading; the session is left as it was before the command.
//!
//! Parsing ([`parse_command`]) and execution ([`Shell::run_line`]) are
//! separate from the read loop ([`Shell::run`]) so both can be tested
//! without a terminal.

use crate::imaging::{ImageCodec, Operator, OperatorDefaults, ParamError, RustCodec};
use crate::output;
use crate::session::{EditError, EditSession};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Unknown command '{0}' (type 'help' for a list)")]
    UnknownCommand(String),
    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("'{0}' takes no argument")]
    UnexpectedArgument(&'static str),
    #[error(transparent)]
    Operator(#[from] ParamError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Load(PathBuf),
    /// `None` saves back to the file the image was loaded from.
    Save(Option<PathBuf>),
    Apply(Operator),
    Undo,
    Redo,
    Reset,
    Dims,
    History,
    Help,
    Quit,
}

/// What the read loop should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue(Vec<String>),
    Quit,
}

/// Parse one input line. Returns `Ok(None)` for blank lines and comments.
///
/// A line whose first word is not a command is tried as operator text, so
/// `rotate:90` and `apply rotate:90` are the same.
pub fn parse_command(
    line: &str,
    defaults: &OperatorDefaults,
) -> Result<Option<ShellCommand>, ShellError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let no_arg = |command: &'static str, cmd: ShellCommand| {
        if rest.is_empty() {
            Ok(Some(cmd))
        } else {
            Err(ShellError::UnexpectedArgument(command))
        }
    };

    match word.to_ascii_lowercase().as_str() {
        "load" | "open" => {
            if rest.is_empty() {
                return Err(ShellError::MissingArgument {
                    command: "load",
                    expected: "a file path",
                });
            }
            Ok(Some(ShellCommand::Load(PathBuf::from(rest))))
        }
        "save" => Ok(Some(ShellCommand::Save(
            (!rest.is_empty()).then(|| PathBuf::from(rest)),
        ))),
        "apply" => {
            if rest.is_empty() {
                return Err(ShellError::MissingArgument {
                    command: "apply",
                    expected: "an operator such as 'rotate:90'",
                });
            }
            let op = Operator::parse_with(rest, defaults)?;
            Ok(Some(ShellCommand::Apply(op)))
        }
        "undo" => no_arg("undo", ShellCommand::Undo),
        "redo" => no_arg("redo", ShellCommand::Redo),
        "reset" => no_arg("reset", ShellCommand::Reset),
        "dims" | "size" => no_arg("dims", ShellCommand::Dims),
        "history" => no_arg("history", ShellCommand::History),
        "help" | "?" => no_arg("help", ShellCommand::Help),
        "quit" | "exit" => no_arg("quit", ShellCommand::Quit),
        _ => {
            let name = word.split(':').next().unwrap_or(word);
            if !rest.is_empty() || !Operator::is_known(name) {
                return Err(ShellError::UnknownCommand(word.to_string()));
            }
            let op = Operator::parse_with(word, defaults)?;
            Ok(Some(ShellCommand::Apply(op)))
        }
    }
}

/// An [`EditSession`] plus the operator defaults used to parse its input.
pub struct Shell<C: ImageCodec = RustCodec> {
    session: EditSession<C>,
    defaults: OperatorDefaults,
}

impl<C: ImageCodec> Shell<C> {
    pub fn new(session: EditSession<C>, defaults: OperatorDefaults) -> Self {
        Self { session, defaults }
    }

    pub fn session(&self) -> &EditSession<C> {
        &self.session
    }

    /// Parse and execute one line.
    pub fn run_line(&mut self, line: &str) -> Result<Outcome, ShellError> {
        match parse_command(line, &self.defaults)? {
            Some(command) => self.execute(command),
            None => Ok(Outcome::Continue(Vec::new())),
        }
    }

    pub fn execute(&mut self, command: ShellCommand) -> Result<Outcome, ShellError> {
        let session = &mut self.session;
        let lines = match command {
            ShellCommand::Load(path) => {
                let dims = session.load(&path)?;
                vec![output::format_loaded(&path, dims)]
            }
            ShellCommand::Save(Some(path)) => {
                session.save(&path)?;
                vec![output::format_saved(&path)]
            }
            ShellCommand::Save(None) => {
                session.save_to_source()?;
                let path = session.source_path().map(|p| p.to_path_buf()).unwrap_or_default();
                vec![output::format_saved(&path)]
            }
            ShellCommand::Apply(op) => {
                session.apply(&op)?;
                vec![output::format_step(&op.to_string(), session.dimensions())]
            }
            ShellCommand::Undo => {
                session.undo()?;
                vec![output::format_step("undo", session.dimensions())]
            }
            ShellCommand::Redo => {
                session.redo()?;
                vec![output::format_step("redo", session.dimensions())]
            }
            ShellCommand::Reset => {
                session.reset()?;
                vec![output::format_step("reset", session.dimensions())]
            }
            ShellCommand::Dims => vec![output::format_dimensions(session.dimensions())],
            ShellCommand::History => output::format_history(session.history()),
            ShellCommand::Help => output::format_help(),
            ShellCommand::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Continue(lines))
    }

    /// Read commands from `input` until end of input or `quit`, writing
    /// replies and errors to `out`. When `prompt` is set, `> ` is written
    /// before each line is read.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut out: W,
        prompt: bool,
    ) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            match self.run_line(&line?) {
                Ok(Outcome::Continue(reply)) => {
                    for l in reply {
                        writeln!(out, "{}", l)?;
                    }
                }
                Ok(Outcome::Quit) => break,
                Err(e) => {
                    log::debug!("Shell command failed: {e:?}");
                    writeln!(out, "error: {}", e)?;
                }
            }
        }
        Ok(())
    }
}
