//! Reading command lines and turning them into commands.
use std::io::{self, Read};

use crate::{
    common::{Command, Error},
    cutils::was_interrupted,
    system::interface::ProcessId,
};

/// The most words a single command line may have.
pub(crate) const MAX_ARGUMENTS: usize = 512;

const COMMENT_MARKER: char = '#';
const PID_VARIABLE: &str = "$$";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Line(String),
    /// A signal arrived while waiting for input; nothing was consumed.
    Interrupted,
    Eof,
}

/// Reads lines from `R` one at a time, without hiding interrupted reads.
///
/// The standard buffered readers retry a read that a signal interrupted, which would leave the
/// prompt that the signal's notice scrolled away unwritten. This one reports it instead.
pub(crate) struct LineReader<R> {
    source: R,
    pending: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub(crate) fn new(source: R) -> Self {
        Self {
            source,
            pending: Vec::new(),
        }
    }

    pub(crate) fn read_line(&mut self) -> io::Result<Input> {
        let mut chunk = [0; 1024];

        loop {
            if let Some(end) = self.pending.iter().position(|&byte| byte == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=end).collect();
                return Ok(Input::Line(
                    String::from_utf8_lossy(&line[..end]).into_owned(),
                ));
            }

            match self.source.read(&mut chunk) {
                Ok(0) if self.pending.is_empty() => return Ok(Input::Eof),
                // the last line was not terminated
                Ok(0) => {
                    let line = std::mem::take(&mut self.pending);
                    return Ok(Input::Line(String::from_utf8_lossy(&line).into_owned()));
                }
                Ok(read) => self.pending.extend_from_slice(&chunk[..read]),
                Err(err) if was_interrupted(&err) => return Ok(Input::Interrupted),
                Err(err) => return Err(err),
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Parsed {
    /// A comment or an empty line.
    Skip,
    Command(Command),
}

/// Expand `$$` to `pid` and split `line` into words.
pub(crate) fn parse_line(line: &str, pid: ProcessId) -> Result<Parsed, Error> {
    if line.starts_with(COMMENT_MARKER) || line.trim().is_empty() {
        return Ok(Parsed::Skip);
    }

    let expanded = line.replace(PID_VARIABLE, &pid.to_string());

    let words: Vec<&str> = expanded.split_whitespace().collect();
    if words.len() > MAX_ARGUMENTS {
        return Err(Error::TooManyArguments(MAX_ARGUMENTS));
    }

    Ok(Parsed::Command(words.into_iter().collect()))
}
