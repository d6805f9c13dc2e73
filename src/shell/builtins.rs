use std::{env, path::PathBuf};

use crate::{common::Error, log::dev_info};

/// Commands the interpreter runs itself instead of in a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Exit,
    Status,
    ChangeDirectory,
}

impl Builtin {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "exit" => Some(Self::Exit),
            "status" => Some(Self::Status),
            "cd" => Some(Self::ChangeDirectory),
            _ => None,
        }
    }
}

/// Change the working directory of the interpreter, and so of every child started after.
///
/// Without an argument this goes to the directory named by `HOME`.
pub(crate) fn change_directory(arguments: &[String]) -> Result<(), Error> {
    let path = match arguments {
        [] => env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .ok_or(Error::HomeNotSet)?,
        [path] => PathBuf::from(path),
        _ => return Err(Error::BuiltinArguments("cd")),
    };

    env::set_current_dir(&path).map_err(|error| Error::ChangeDirectory {
        path: path.clone(),
        error,
    })?;
    dev_info!("changed directory to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{change_directory, Builtin};
    use crate::common::Error;

    #[test]
    fn recognizes_builtin_names() {
        assert_eq!(Builtin::from_name("exit"), Some(Builtin::Exit));
        assert_eq!(Builtin::from_name("status"), Some(Builtin::Status));
        assert_eq!(Builtin::from_name("cd"), Some(Builtin::ChangeDirectory));
        assert_eq!(Builtin::from_name("ls"), None);
        assert_eq!(Builtin::from_name("Exit"), None);
    }

    // the working directory is process-wide, so only failing changes are tested here

    #[test]
    fn cd_rejects_extra_arguments() {
        let err = change_directory(&["/".into(), "/tmp".into()]).unwrap_err();
        assert!(matches!(err, Error::BuiltinArguments("cd")));
        assert_eq!(err.to_string(), "cd: too many arguments");
    }

    #[test]
    fn cd_to_missing_directory_fails() {
        let missing = std::env::temp_dir().join("smallsh-no-such-directory");
        let err = change_directory(&[missing.display().to_string()]).unwrap_err();

        assert!(matches!(err, Error::ChangeDirectory { .. }));
        assert_eq!(
            err.to_string(),
            format!(
                "cd: {}: No such file or directory (os error 2)",
                missing.display()
            )
        );
    }
}
