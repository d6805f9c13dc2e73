use std::{
    io,
    os::fd::{AsRawFd, RawFd},
};

use crate::cutils::cerr;
use interface::ProcessId;

use self::signal::SignalNumber;

// generalized traits for when we want to hide implementations
pub mod interface;

pub mod signal;

pub mod wait;

/// Path of the device every byte written to is discarded and every read from is end-of-file.
pub(crate) const NULL_DEVICE: &str = "/dev/null";

pub(crate) fn _exit(status: libc::c_int) -> ! {
    unsafe { libc::_exit(status) }
}

pub(crate) enum ForkResult {
    // Parent process branch with the child process' PID.
    Parent(ProcessId),
    // Child process branch.
    Child,
}

/// Create a new process.
///
/// The interpreter never spawns threads, so the child is free to allocate and take locks until
/// it replaces its image.
pub(crate) fn fork() -> io::Result<ForkResult> {
    let pid = cerr(unsafe { libc::fork() })?;
    if pid == 0 {
        Ok(ForkResult::Child)
    } else {
        Ok(ForkResult::Parent(ProcessId::new(pid)))
    }
}

/// Send a signal to a process with the specified ID.
pub(crate) fn kill(pid: ProcessId, signal: SignalNumber) -> io::Result<()> {
    // SAFETY: This function cannot cause UB even if `pid` is not a valid process ID or if
    // `signal` is not a valid signal code.
    cerr(unsafe { libc::kill(pid.get(), signal) }).map(|_| ())
}

/// Make `target` refer to the same open file description as `fd`.
///
/// The previous file behind `target` is closed by the kernel as part of the call.
pub(crate) fn dup2<F: AsRawFd>(fd: &F, target: RawFd) -> io::Result<()> {
    cerr(unsafe { libc::dup2(fd.as_raw_fd(), target) }).map(|_| ())
}

pub(crate) struct Process;

impl Process {
    /// Return the process identifier for the current process
    pub(crate) fn process_id() -> ProcessId {
        // NOTE libstd casts the `i32` that `libc::getpid` returns into `u32`
        // here we cast it back into `i32` (`ProcessId`)
        ProcessId::new(std::process::id() as libc::pid_t)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        os::unix::net::UnixStream,
    };

    use libc::SIGKILL;

    use super::{_exit, dup2, fork, interface::ProcessId, wait::ExitReason, ForkResult, Process};

    #[test]
    fn fork_reports_child_exit_code() {
        let ForkResult::Parent(child_pid) = fork().unwrap() else {
            _exit(7);
        };

        assert_eq!(child_pid.wait().unwrap(), ExitReason::Code(7));
    }

    #[test]
    fn kill_test() {
        let mut child = std::process::Command::new("/bin/sleep")
            .arg("1")
            .spawn()
            .unwrap();
        super::kill(ProcessId::new(child.id() as i32), SIGKILL).unwrap();
        assert!(!child.wait().unwrap().success());
    }

    #[test]
    fn dup2_rebinds_stdout_in_child() {
        let (mut rx, tx) = UnixStream::pair().unwrap();

        let ForkResult::Parent(child_pid) = fork().unwrap() else {
            if dup2(&tx, libc::STDOUT_FILENO).is_err() {
                _exit(1);
            }
            let mut stdout = std::io::stdout();
            let ok = stdout.write_all(b"rebound").and_then(|_| stdout.flush());
            _exit(if ok.is_ok() { 0 } else { 1 });
        };

        drop(tx);

        assert_eq!(child_pid.wait().unwrap(), ExitReason::Code(0));

        let mut received = String::new();
        rx.read_to_string(&mut received).unwrap();
        assert_eq!(received, "rebound");
    }

    #[test]
    fn process_id_matches_std() {
        assert_eq!(Process::process_id().get() as u32, std::process::id());
    }
}
