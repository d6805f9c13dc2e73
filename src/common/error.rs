use std::{fmt, io, path::PathBuf};

/// Errors the interpreter reports and then carries on from.
///
/// Failures inside a spawned child never show up here: the child reports them itself and exits.
#[derive(Debug)]
pub enum Error {
    /// Creating the child process failed.
    Spawn(io::Error),
    /// Blocking the toggle signal around a launch failed; no process was created.
    SignalMask(io::Error),
    ChangeDirectory {
        path: PathBuf,
        error: io::Error,
    },
    HomeNotSet,
    /// A built-in got more arguments than it accepts.
    BuiltinArguments(&'static str),
    /// A command line had more words than the interpreter accepts.
    TooManyArguments(usize),
    Options(String),
    /// Writing to the interpreter's own output stream failed. Reading on is pointless.
    Output(io::Error),
    Io(io::Error),
}

impl Error {
    /// Whether the interpreter cannot carry on after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Output(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spawn(e) => write!(f, "cannot create process: {e}"),
            Error::SignalMask(e) => write!(f, "cannot block signals: {e}"),
            Error::ChangeDirectory { path, error } => {
                write!(f, "cd: {}: {error}", path.display())
            }
            Error::HomeNotSet => f.write_str("cd: HOME not set"),
            Error::BuiltinArguments(name) => write!(f, "{name}: too many arguments"),
            Error::TooManyArguments(max) => write!(f, "too many arguments (max {max})"),
            Error::Options(e) => write!(f, "{e}"),
            Error::Output(e) => write!(f, "cannot write output: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
