//! Reaping children and decoding how they ended.
use std::{fmt, io};

use libc::{c_int, WEXITSTATUS, WIFSIGNALED, WNOHANG, WTERMSIG};

use crate::{
    cutils::cerr,
    system::{interface::ProcessId, signal::SignalNumber},
};

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitReason {
    Code(i32),
    Signal(SignalNumber),
}

impl ExitReason {
    // Neither `WUNTRACED` nor `WCONTINUED` is ever passed, so every status reported by
    // `waitpid` belongs to a child that has terminated one way or the other.
    fn decode(status: c_int) -> Self {
        if WIFSIGNALED(status) {
            ExitReason::Signal(WTERMSIG(status))
        } else {
            ExitReason::Code(WEXITSTATUS(status))
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Code(code) => write!(f, "exit value {code}"),
            ExitReason::Signal(signal) => write!(f, "terminated by signal {signal}"),
        }
    }
}

impl ProcessId {
    /// Block until this child has terminated and reap it.
    ///
    /// Fails with `EINTR` when a caught signal arrives first; the child is then still there.
    pub(crate) fn wait(self) -> io::Result<ExitReason> {
        let mut status: c_int = 0;
        cerr(unsafe { libc::waitpid(self.get(), &mut status, 0) })?;

        Ok(ExitReason::decode(status))
    }

    /// Reap this child if it has terminated, without blocking.
    pub(crate) fn try_wait(self) -> io::Result<Option<ExitReason>> {
        let mut status: c_int = 0;
        let pid = cerr(unsafe { libc::waitpid(self.get(), &mut status, WNOHANG) })?;

        Ok((pid != 0).then(|| ExitReason::decode(status)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::ExitReason;
    use crate::system::{interface::ProcessId, kill, signal::consts::*};

    fn spawn(script: &str) -> ProcessId {
        let child = std::process::Command::new("sh")
            .args(["-c", script])
            .spawn()
            .unwrap();
        ProcessId::new(child.id() as i32)
    }

    #[test]
    fn exit_codes_are_decoded() {
        for code in [0, 1, 42, 255] {
            let pid = spawn(&format!("exit {code}"));
            assert_eq!(pid.wait().unwrap(), ExitReason::Code(code));
        }
    }

    #[test]
    fn terminating_signal_is_decoded() {
        let pid = spawn("sleep 10");
        kill(pid, SIGTERM).unwrap();

        let reason = pid.wait().unwrap();
        assert_eq!(reason, ExitReason::Signal(SIGTERM));
        assert_eq!(reason.to_string(), "terminated by signal 15");
    }

    #[test]
    fn a_child_is_reaped_only_once() {
        let pid = spawn("exit 3");
        assert_eq!(pid.wait().unwrap(), ExitReason::Code(3));

        let err = pid.wait().unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ECHILD));
        let err = pid.try_wait().unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ECHILD));
    }

    #[test]
    fn try_wait_does_not_block_on_running_child() {
        let pid = spawn("sleep 0.2; exit 7");
        assert_eq!(pid.try_wait().unwrap(), None);

        let mut polls = 0;
        let reason = loop {
            if let Some(reason) = pid.try_wait().unwrap() {
                break reason;
            }
            polls += 1;
            std::thread::sleep(Duration::from_millis(10));
        };

        assert_eq!(reason, ExitReason::Code(7));
        assert!(polls > 0);
    }

    #[test]
    fn messages() {
        assert_eq!(ExitReason::Code(0).to_string(), "exit value 0");
        assert_eq!(ExitReason::Code(1).to_string(), "exit value 1");
        assert_eq!(ExitReason::Signal(SIGINT).to_string(), "terminated by signal 2");
    }
}
