//! Utilities to handle signals.
#![warn(unused)]
mod handler;
mod set;

pub(crate) use handler::{SignalHandler, SignalHandlerBehavior};
pub(crate) use set::SignalSet;

pub(crate) type SignalNumber = libc::c_int;

macro_rules! define_consts {
    ($($signal:ident,)*) => {
        pub(crate) mod consts {
            pub(crate) use libc::{$($signal,)*};
        }

        pub(crate) fn signal_name(signal: SignalNumber) -> Option<&'static str> {
            match signal {
                $(consts::$signal => Some(stringify!($signal)),)*
                _ => None,
            }
        }
    };
}

define_consts! {
    SIGINT,
    SIGQUIT,
    SIGTSTP,
    SIGTERM,
    SIGHUP,
    SIGALRM,
    SIGPIPE,
    SIGUSR1,
    SIGUSR2,
    SIGCHLD,
    SIGCONT,
    SIGKILL,
    SIGSTOP,
}

/// Format a signal for diagnostics, falling back to its number when it has no known name.
pub(crate) fn signal_fmt(signal: SignalNumber) -> String {
    signal_name(signal)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("unknown signal #{signal}"))
}
