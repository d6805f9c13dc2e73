//! Bookkeeping for commands running in the background.
use std::{collections::BTreeMap, fmt};

use crate::{
    common::Command,
    cutils::retry_while_interrupted,
    exec::ExitReason,
    log::{dev_debug, dev_info, dev_warn},
    system::{
        interface::ProcessId,
        kill,
        signal::{signal_fmt, SignalNumber},
    },
};

/// A background job that has terminated, as found by [`JobTable::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobReport {
    pub(crate) pid: ProcessId,
    pub(crate) reason: ExitReason,
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "background pid {} is done: {}", self.pid, self.reason)
    }
}

enum Poll {
    Running,
    Done(ExitReason),
    // not (or no longer) a child we can wait for
    Gone,
}

/// The background children that have been started and not yet reaped.
///
/// Nothing else waits on these process IDs. Entries are removed once they are reaped, so the
/// table only ever holds jobs that are still outstanding.
#[derive(Default)]
pub(crate) struct JobTable {
    jobs: BTreeMap<ProcessId, Command>,
}

impl JobTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start tracking a background child.
    pub(crate) fn register(&mut self, pid: ProcessId, command: Command) {
        if self.contains(pid) {
            dev_warn!("process id {pid} was reused while still tracked");
        }
        dev_debug!("tracking background job {pid} '{command}'");
        self.jobs.insert(pid, command);
    }

    /// Reap every tracked job that has terminated, without blocking.
    ///
    /// Each terminated job is reported exactly once and dropped from the table.
    pub(crate) fn reconcile(&mut self) -> Vec<JobReport> {
        let mut reports = Vec::new();

        self.jobs.retain(|&pid, command| match poll(pid) {
            Poll::Running => true,
            Poll::Done(reason) => {
                dev_info!("background job {pid} '{command}' finished: {reason}");
                reports.push(JobReport { pid, reason });
                false
            }
            Poll::Gone => false,
        });

        reports
    }

    /// Send `signal` to every job still in the table and stop tracking them.
    pub(crate) fn terminate_all(&mut self, signal: SignalNumber) {
        for pid in std::mem::take(&mut self.jobs).into_keys() {
            dev_info!("sending {} to background job {pid}", signal_fmt(signal));
            if let Err(err) = kill(pid, signal) {
                dev_warn!("cannot send {} to {pid}: {err}", signal_fmt(signal));
            }
        }
    }

    pub(crate) fn contains(&self, pid: ProcessId) -> bool {
        self.jobs.contains_key(&pid)
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn poll(pid: ProcessId) -> Poll {
    match retry_while_interrupted(|| pid.try_wait()) {
        Ok(None) => Poll::Running,
        Ok(Some(reason)) => Poll::Done(reason),
        Err(err) => {
            dev_warn!("cannot wait for background job {pid}: {err}");
            Poll::Gone
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::{JobReport, JobTable};
    use crate::{
        common::Command,
        exec::ExitReason,
        system::{interface::ProcessId, kill, signal::consts::*},
    };

    fn spawn(script: &str) -> ProcessId {
        let child = std::process::Command::new("sh")
            .args(["-c", script])
            .spawn()
            .unwrap();
        ProcessId::new(child.id() as i32)
    }

    fn reconcile_until_report(jobs: &mut JobTable) -> Vec<JobReport> {
        for _ in 0..500 {
            let reports = jobs.reconcile();
            if !reports.is_empty() {
                return reports;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("no background job finished in time");
    }

    #[test]
    fn reconcile_on_empty_table() {
        let mut jobs = JobTable::new();
        assert!(jobs.reconcile().is_empty());
        assert!(jobs.is_empty());
    }

    #[test]
    fn finished_job_is_reported_exactly_once() {
        let mut jobs = JobTable::new();
        let pid = spawn("exit 3");
        jobs.register(pid, Command::new(vec!["exit".into(), "3".into()]));
        assert_eq!(jobs.len(), 1);

        let reports = reconcile_until_report(&mut jobs);
        assert_eq!(
            reports,
            vec![JobReport {
                pid,
                reason: ExitReason::Code(3),
            }]
        );
        assert_eq!(
            reports[0].to_string(),
            format!("background pid {pid} is done: exit value 3")
        );

        assert!(jobs.is_empty());
        assert!(jobs.reconcile().is_empty());
    }

    #[test]
    fn signaled_job_reports_signal() {
        let mut jobs = JobTable::new();
        let pid = spawn("sleep 10");
        jobs.register(pid, Command::default());

        kill(pid, SIGKILL).unwrap();

        let reports = reconcile_until_report(&mut jobs);
        assert_eq!(
            reports[0].to_string(),
            format!("background pid {pid} is done: terminated by signal 9")
        );
        assert!(!jobs.contains(pid));
    }

    #[test]
    fn running_jobs_stay_until_terminated() {
        let mut jobs = JobTable::new();
        let first = spawn("sleep 10");
        let second = spawn("sleep 10");
        jobs.register(first, Command::default());
        jobs.register(second, Command::default());

        assert!(jobs.reconcile().is_empty());
        assert_eq!(jobs.len(), 2);
        assert!(jobs.contains(first) && jobs.contains(second));

        jobs.terminate_all(SIGTERM);
        assert!(jobs.is_empty());

        for pid in [first, second] {
            assert_eq!(pid.wait().unwrap(), ExitReason::Signal(SIGTERM));
        }

        // nothing is left to signal a second time
        jobs.terminate_all(SIGTERM);
        assert!(jobs.reconcile().is_empty());
    }

    #[test]
    fn job_reaped_elsewhere_is_dropped_silently() {
        let mut jobs = JobTable::new();
        let pid = spawn("exit 0");
        jobs.register(pid, Command::default());

        assert_eq!(pid.wait().unwrap(), ExitReason::Code(0));

        assert!(jobs.reconcile().is_empty());
        assert!(!jobs.contains(pid));
    }
}
