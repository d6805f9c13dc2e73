pub(crate) const USAGE_MSG: &str = "usage: smallsh [-hqV] [-p prompt]";

const DESCRIPTOR: &str = "smallsh - run commands in the foreground or background";

const HELP_MSG: &str = "Options:
  -h, --help               display help message and exit
  -p, --prompt=prompt      write prompt before reading each command line
  -q, --no-prompt          do not write a prompt
  -V, --version            display version information and exit

Commands are read from standard input, one per line. A trailing '&' runs a
command in the background; '<' and '>' redirect its standard input and
output. The built-ins are 'cd', 'status' and 'exit'.
";

pub(crate) fn long_help_message() -> String {
    format!("{USAGE_MSG}\n\n{DESCRIPTOR}\n\n{HELP_MSG}")
}
