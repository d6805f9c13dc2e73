use std::{
    fmt, fs, io,
    os::fd::RawFd,
    path::{Path, PathBuf},
};

use crate::{
    common::Command,
    cutils::retry_while_interrupted,
    system::{dup2, NULL_DEVICE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Input,
    Output,
}

impl Direction {
    fn from_operator(word: &str) -> Option<Self> {
        match word {
            "<" => Some(Self::Input),
            ">" => Some(Self::Output),
            _ => None,
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Direction::Input => "<",
            Direction::Output => ">",
        }
    }

    fn stream(self) -> RawFd {
        match self {
            Direction::Input => libc::STDIN_FILENO,
            Direction::Output => libc::STDOUT_FILENO,
        }
    }

    fn open(self, path: &Path) -> io::Result<fs::File> {
        match self {
            Direction::Input => fs::File::open(path),
            Direction::Output => fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Input => "input",
            Direction::Output => "output",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    File(PathBuf),
    NullDevice,
}

impl Target {
    fn path(&self) -> &Path {
        match self {
            Target::File(path) => path,
            Target::NullDevice => Path::new(NULL_DEVICE),
        }
    }
}

/// A standard stream to rebind, and what to rebind it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) direction: Direction,
    pub(crate) target: Target,
}

#[derive(Debug)]
pub(crate) enum RedirectError {
    /// An operator was the last word of a foreground command.
    MissingTarget(Direction),
    Open {
        path: PathBuf,
        direction: Direction,
        error: io::Error,
    },
}

impl fmt::Display for RedirectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectError::MissingTarget(direction) => {
                write!(f, "missing file name after '{}'", direction.operator())
            }
            RedirectError::Open {
                path,
                direction,
                error,
            } => write!(f, "cannot open {} for {direction}: {error}", path.display()),
        }
    }
}

/// A command with its redirection operators taken out, and the bindings they asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Redirections {
    pub(crate) command: Command,
    pub(crate) bindings: Vec<Binding>,
}

impl Redirections {
    /// Split `command` into the words the program should see and the redirections around it.
    ///
    /// An operator consumes the word right after it as its file name. When there is no such
    /// word a background command reads from or writes to the null device instead; for a
    /// foreground command that is an error.
    pub(crate) fn resolve(command: &Command, background: bool) -> Result<Self, RedirectError> {
        let mut words = Vec::with_capacity(command.words().len());
        let mut bindings = Vec::new();

        let mut iter = command.words().iter().peekable();
        while let Some(word) = iter.next() {
            let Some(direction) = Direction::from_operator(word) else {
                words.push(word.clone());
                continue;
            };

            let target = match iter.next_if(|next| Direction::from_operator(next).is_none()) {
                Some(path) => Target::File(path.into()),
                None if background => Target::NullDevice,
                None => return Err(RedirectError::MissingTarget(direction)),
            };

            bindings.push(Binding { direction, target });
        }

        Ok(Self {
            command: Command::new(words),
            bindings,
        })
    }

    /// Rebind the standard streams of the current process, in the order the operators appeared.
    ///
    /// Only ever called in a forked child: the interpreter's own streams stay untouched.
    pub(crate) fn apply(&self) -> Result<(), RedirectError> {
        for Binding { direction, target } in &self.bindings {
            let path = target.path();
            let open_error = |error| RedirectError::Open {
                path: path.to_path_buf(),
                direction: *direction,
                error,
            };

            // opening a FIFO blocks and may be interrupted
            let file = retry_while_interrupted(|| direction.open(path)).map_err(open_error)?;
            dup2(&file, direction.stream()).map_err(open_error)?;
        }

        Ok(())
    }
}
