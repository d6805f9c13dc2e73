use std::{
    fmt,
    io::{self, Read, Write},
    process,
};

use crate::{
    common::{Command, Error},
    exec::{
        launch,
        signal_policy::{foreground_only, ForegroundOnly, SignalPolicy},
        ExitReason, Launched,
    },
    jobs::JobTable,
    log::{dev_info, user_error, ShellLogger},
    system::{interface::ProcessId, signal::consts::SIGTERM, Process},
};

use builtins::{change_directory, Builtin};
use cli::{ShellAction, ShellOptions};
use help::{long_help_message, USAGE_MSG};
use input::{parse_line, Input, LineReader, Parsed};

mod builtins;
mod cli;
mod help;
mod input;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether the interpreter should read another command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// The interpreter state that outlives a single command line.
pub(crate) struct Shell<W: Write> {
    out: W,
    jobs: JobTable,
    /// Outcome of the last foreground command, if one has run.
    last_status: Option<ExitReason>,
    pid: ProcessId,
    prompt: Option<String>,
    mode: &'static ForegroundOnly,
}

impl<W: Write> Shell<W> {
    pub(crate) fn new(options: ShellOptions, out: W) -> Self {
        Self {
            out,
            jobs: JobTable::new(),
            last_status: None,
            pid: Process::process_id(),
            prompt: options.prompt,
            mode: foreground_only(),
        }
    }

    pub(crate) fn last_status(&self) -> ExitReason {
        self.last_status.unwrap_or(ExitReason::Code(0))
    }

    /// Read and execute command lines until `exit` or the end of input.
    ///
    /// Errors of a single command are reported and the next line is read. Failing to read input
    /// or to write output ends the loop with that error.
    pub(crate) fn run<R: Read>(&mut self, input: &mut LineReader<R>) -> Result<(), Error> {
        let result = self.read_and_execute(input);
        // however the loop ended, no background job outlives the interpreter
        self.exit();
        result
    }

    fn read_and_execute<R: Read>(&mut self, input: &mut LineReader<R>) -> Result<(), Error> {
        loop {
            self.report_finished_jobs()?;
            self.write_prompt()?;

            let line = match input.read_line()? {
                Input::Line(line) => line,
                // a handled signal cut the read short, ask again
                Input::Interrupted => continue,
                Input::Eof => return Ok(()),
            };

            match self.execute(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => user_error!("{err}"),
            }
        }
    }

    /// Execute a single command line.
    pub(crate) fn execute(&mut self, line: &str) -> Result<Flow, Error> {
        let command = match parse_line(line, self.pid)? {
            Parsed::Skip => return Ok(Flow::Continue),
            Parsed::Command(command) => command,
        };

        if let Some(builtin) = command.name().and_then(Builtin::from_name) {
            // built-ins always run in the interpreter, a trailing '&' changes nothing
            let (command, _) = command.split_background(true);
            return self.run_builtin(builtin, &command);
        }

        let (command, background) = command.split_background(self.mode.is_active());
        if command.is_empty() {
            return Ok(Flow::Continue);
        }

        // anything still buffered must not show up after the child's output
        self.out.flush().map_err(Error::Output)?;

        match launch(command, background, &mut self.jobs)? {
            Launched::Background(pid) => self.write_line(format_args!("background pid is {pid}"))?,
            Launched::Foreground(reason) => {
                self.last_status = Some(reason);
                if let ExitReason::Signal(_) = reason {
                    self.write_line(reason)?;
                }
            }
        }

        Ok(Flow::Continue)
    }

    fn run_builtin(&mut self, builtin: Builtin, command: &Command) -> Result<Flow, Error> {
        match builtin {
            Builtin::Exit => {
                self.exit();
                return Ok(Flow::Exit);
            }
            Builtin::Status => self.write_line(self.last_status())?,
            Builtin::ChangeDirectory => change_directory(command.arguments())?,
        }

        Ok(Flow::Continue)
    }

    fn exit(&mut self) {
        if !self.jobs.is_empty() {
            dev_info!("terminating {} background jobs", self.jobs.len());
        }
        self.jobs.terminate_all(SIGTERM);
    }

    fn report_finished_jobs(&mut self) -> Result<(), Error> {
        for report in self.jobs.reconcile() {
            self.write_line(report)?;
        }

        Ok(())
    }

    fn write_prompt(&mut self) -> Result<(), Error> {
        if let Some(prompt) = &self.prompt {
            self.out
                .write_all(prompt.as_bytes())
                .map_err(Error::Output)?;
        }
        self.out.flush().map_err(Error::Output)
    }

    fn write_line(&mut self, line: impl fmt::Display) -> Result<(), Error> {
        writeln!(self.out, "{line}").map_err(Error::Output)
    }
}

pub fn main() {
    ShellLogger::new("smallsh: ").into_global_logger();

    dev_info!("development logs are enabled");

    let options = match ShellOptions::from_env() {
        Ok(options) => options,
        Err(error) => {
            eprintln_ignore_io_error!("smallsh: {error}\n{USAGE_MSG}");
            process::exit(1);
        }
    };

    match options.action {
        ShellAction::Help => {
            println_ignore_io_error!("{}", long_help_message());
            process::exit(0);
        }
        ShellAction::Version => {
            println_ignore_io_error!("smallsh version {VERSION}");
            process::exit(0);
        }
        ShellAction::Run => {}
    }

    let _policy = match SignalPolicy::install() {
        Ok(policy) => policy,
        Err(error) => {
            user_error!("cannot install signal handlers: {error}");
            process::exit(1);
        }
    };

    let mut shell = Shell::new(options, io::stdout());
    let mut input = LineReader::new(io::stdin());

    let code = match shell.run(&mut input) {
        Ok(()) => 0,
        Err(error) => {
            user_error!("{error}");
            1
        }
    };

    drop(shell);
    process::exit(code);
}
