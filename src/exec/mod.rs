mod redirect;
pub(crate) mod signal_policy;

use std::{io, os::unix::process::CommandExt};

use crate::{
    common::{Command, Error},
    cutils::retry_while_interrupted,
    jobs::JobTable,
    log::{dev_info, dev_warn, user_error},
    system::{_exit, fork, interface::ProcessId, signal::signal_fmt, ForkResult},
};

pub(crate) use crate::system::wait::ExitReason;

use self::{
    redirect::{RedirectError, Redirections},
    signal_policy::{set_child_dispositions, DeferredToggle},
};

/// What the interpreter is left with once a command has been launched.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Launched {
    /// The command runs in the background and is tracked by the job table.
    Background(ProcessId),
    /// The command ran in the foreground and has been reaped.
    Foreground(ExitReason),
}

/// Run `command` in a new process.
///
/// A background child is registered with `jobs` and left running. For a foreground child this
/// blocks until that child, and only that child, has terminated.
///
/// Only a failure to create the process is returned; anything that goes wrong inside the child
/// is reported by the child and shows up as its exit status.
pub(crate) fn launch(
    command: Command,
    background: bool,
    jobs: &mut JobTable,
) -> Result<Launched, Error> {
    let redirections = Redirections::resolve(&command, background);

    let toggle = DeferredToggle::hold().map_err(Error::SignalMask)?;

    let ForkResult::Parent(child_pid) = fork().map_err(|err| {
        dev_warn!("unable to fork command process: {err}");
        Error::Spawn(err)
    })?
    else {
        exec_child(redirections, background, toggle)
    };

    dev_info!(
        "started {} '{command}' with pid {child_pid}",
        if background { "background" } else { "foreground" }
    );

    if background {
        drop(toggle);
        jobs.register(child_pid, command);
        return Ok(Launched::Background(child_pid));
    }

    let reason = wait_for(child_pid);
    drop(toggle);

    Ok(Launched::Foreground(reason?))
}

/// The child side of [`launch`]: set up signals and streams, then become the program.
fn exec_child(
    redirections: Result<Redirections, RedirectError>,
    background: bool,
    toggle: DeferredToggle,
) -> ! {
    if let Err(err) = set_child_dispositions(background) {
        user_error!("cannot set up signal handling: {err}");
        _exit(1);
    }

    if let Err(err) = toggle.release() {
        dev_warn!("cannot restore signal mask: {err}");
    }

    let redirections = match redirections.and_then(|r| r.apply().map(|()| r)) {
        Ok(redirections) => redirections,
        Err(err) => {
            user_error!("{err}");
            _exit(1);
        }
    };

    let Some(name) = redirections.command.name() else {
        // only redirections were given; they have been performed
        _exit(0);
    };

    let err = std::process::Command::new(name)
        .args(redirections.command.arguments())
        .exec();

    dev_warn!("failed to execute '{name}': {err}");
    if err.kind() == io::ErrorKind::NotFound {
        eprintln_ignore_io_error!("{name}: no such file or directory");
    } else {
        eprintln_ignore_io_error!("{name}: {err}");
    }

    _exit(1)
}

fn wait_for(child_pid: ProcessId) -> Result<ExitReason, Error> {
    let reason = retry_while_interrupted(|| child_pid.wait()).map_err(|err| {
        dev_warn!("cannot wait for {child_pid}: {err}");
        Error::Io(err)
    })?;

    if let ExitReason::Signal(signal) = reason {
        dev_info!("{child_pid} was terminated by {}", signal_fmt(signal));
    }

    Ok(reason)
}
