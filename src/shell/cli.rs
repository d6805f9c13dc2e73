use crate::common::Error;

pub(crate) const DEFAULT_PROMPT: &str = ": ";

#[derive(Debug, PartialEq)]
pub(crate) struct ShellOptions {
    /// Written before every read; `None` writes nothing.
    pub(crate) prompt: Option<String>,
    pub(crate) action: ShellAction,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            prompt: Some(DEFAULT_PROMPT.to_string()),
            action: ShellAction::Run,
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum ShellAction {
    Help,
    Version,
    Run,
}

type OptionSetter = fn(&mut ShellOptions, Option<String>) -> Result<(), String>;

struct ShellOption {
    short: char,
    long: &'static str,
    takes_argument: bool,
    set: OptionSetter,
}

impl ShellOptions {
    const SHELL_OPTIONS: &'static [ShellOption] = &[
        ShellOption {
            short: 'h',
            long: "help",
            takes_argument: false,
            set: |options, _| {
                options.action = ShellAction::Help;
                Ok(())
            },
        },
        ShellOption {
            short: 'p',
            long: "prompt",
            takes_argument: true,
            set: |options, argument| {
                options.prompt = Some(argument.ok_or("option requires an argument -- 'p'")?);
                Ok(())
            },
        },
        ShellOption {
            short: 'q',
            long: "no-prompt",
            takes_argument: false,
            set: |options, _| {
                options.prompt = None;
                Ok(())
            },
        },
        ShellOption {
            short: 'V',
            long: "version",
            takes_argument: false,
            set: |options, _| {
                options.action = ShellAction::Version;
                Ok(())
            },
        },
    ];

    pub(crate) fn from_env() -> Result<ShellOptions, Error> {
        let args = std::env::args().collect();

        Self::parse_arguments(args)
    }

    /// parse the interpreter's own arguments; the first one is the program name
    pub(crate) fn parse_arguments(arguments: Vec<String>) -> Result<ShellOptions, Error> {
        Self::parse(arguments).map_err(Error::Options)
    }

    fn parse(arguments: Vec<String>) -> Result<ShellOptions, String> {
        let mut options = ShellOptions::default();
        let mut arg_iter = arguments.into_iter().skip(1);

        while let Some(arg) = arg_iter.next() {
            if let Some(name) = arg.strip_prefix("--") {
                // parse assignments like '--prompt=> '
                if let Some((key, value)) = name.split_once('=') {
                    let option = Self::find_long(key).ok_or_else(|| unrecognized(&arg))?;
                    if !option.takes_argument {
                        return Err(format!("'--{}' does not take any arguments", option.long));
                    }
                    (option.set)(&mut options, Some(value.to_string()))?;
                } else {
                    let option = Self::find_long(name).ok_or_else(|| unrecognized(&arg))?;
                    let argument = if option.takes_argument {
                        arg_iter.next()
                    } else {
                        None
                    };
                    (option.set)(&mut options, argument)?;
                }
            } else if let Some(flags) = arg.strip_prefix('-').filter(|flags| !flags.is_empty()) {
                // flags can be grouped, so we loop over the characters
                for (n, flag) in flags.char_indices() {
                    let option = Self::SHELL_OPTIONS
                        .iter()
                        .find(|o| o.short == flag)
                        .ok_or_else(|| unrecognized(&flag.to_string()))?;

                    if option.takes_argument {
                        // the argument is either the rest of this group or the next argument
                        let rest = &flags[n + flag.len_utf8()..];
                        let argument = if rest.is_empty() {
                            arg_iter.next()
                        } else {
                            Some(rest.to_string())
                        };
                        (option.set)(&mut options, argument)?;
                        break;
                    }

                    (option.set)(&mut options, None)?;
                }
            } else {
                return Err(format!("unexpected argument '{arg}'"));
            }
        }

        Ok(options)
    }

    fn find_long(name: &str) -> Option<&'static ShellOption> {
        Self::SHELL_OPTIONS.iter().find(|o| o.long == name)
    }
}

fn unrecognized(option: &str) -> String {
    format!("unrecognized option '{option}'")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ShellAction, ShellOptions};

    fn parse(args: &[&str]) -> Result<ShellOptions, String> {
        let mut arguments = vec!["smallsh".to_string()];
        arguments.extend(args.iter().map(|arg| arg.to_string()));
        ShellOptions::parse_arguments(arguments).map_err(|err| err.to_string())
    }

    #[test]
    fn no_arguments_runs_with_default_prompt() {
        assert_eq!(parse(&[]).unwrap(), ShellOptions::default());
        assert_eq!(parse(&[]).unwrap().prompt.as_deref(), Some(": "));
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["-h"]).unwrap().action, ShellAction::Help);
        assert_eq!(parse(&["--help"]).unwrap().action, ShellAction::Help);
        assert_eq!(parse(&["-V"]).unwrap().action, ShellAction::Version);
        assert_eq!(parse(&["--version"]).unwrap().action, ShellAction::Version);
    }

    #[test]
    fn prompt_forms() {
        for args in [
            &["-p", "$ "][..],
            &["-p$ "][..],
            &["--prompt", "$ "][..],
            &["--prompt=$ "][..],
        ] {
            assert_eq!(parse(args).unwrap().prompt.as_deref(), Some("$ "), "{args:?}");
        }

        assert_eq!(parse(&["-q"]).unwrap().prompt, None);
        assert_eq!(parse(&["--no-prompt"]).unwrap().prompt, None);
        // later options win
        assert_eq!(parse(&["-q", "-p", "> "]).unwrap().prompt.as_deref(), Some("> "));
    }

    #[test]
    fn grouped_flags() {
        let options = parse(&["-qV"]).unwrap();
        assert_eq!(options.prompt, None);
        assert_eq!(options.action, ShellAction::Version);

        assert_eq!(parse(&["-qp>"]).unwrap().prompt.as_deref(), Some(">"));
    }

    #[test]
    fn invalid_arguments() {
        assert_eq!(parse(&["-x"]).unwrap_err(), "unrecognized option 'x'");
        assert_eq!(parse(&["--frobnicate"]).unwrap_err(), "unrecognized option '--frobnicate'");
        assert_eq!(
            parse(&["--help=yes"]).unwrap_err(),
            "'--help' does not take any arguments"
        );
        assert_eq!(parse(&["-p"]).unwrap_err(), "option requires an argument -- 'p'");
        assert_eq!(parse(&["script.sh"]).unwrap_err(), "unexpected argument 'script.sh'");
        assert_eq!(parse(&["-"]).unwrap_err(), "unexpected argument '-'");
    }
}
