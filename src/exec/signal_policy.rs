//! Signal dispositions of the interpreter and of every child it spawns.
//!
//! The interpreter ignores interrupts and catches the suspend signal (`SIGTSTP`) to toggle
//! foreground-only mode. A child ignores `SIGTSTP`; it keeps interrupts ignored when it runs in
//! the background and restores their default action when it runs in the foreground.
use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    log::{dev_debug, dev_warn},
    system::signal::{consts::*, SignalHandler, SignalHandlerBehavior, SignalNumber, SignalSet},
};

const ENTERING_NOTICE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXITING_NOTICE: &[u8] = b"\nExiting foreground-only mode\n";

/// Whether a trailing `&` is currently ignored.
///
/// This is the only state shared with signal context: the handler flips it, the interpreter
/// reads it when deciding where a command runs.
pub(crate) struct ForegroundOnly(AtomicBool);

impl ForegroundOnly {
    pub(crate) const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Flip the mode and return whether it is active afterwards.
    pub(crate) fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::SeqCst)
    }
}

static FOREGROUND_ONLY: ForegroundOnly = ForegroundOnly::new();

/// The interpreter-wide foreground-only mode.
pub(crate) fn foreground_only() -> &'static ForegroundOnly {
    &FOREGROUND_ONLY
}

// Runs in signal context: one atomic flip and one raw write, nothing buffered or allocating.
extern "C" fn toggle_foreground_only(_signal: SignalNumber) {
    let notice = if FOREGROUND_ONLY.toggle() {
        ENTERING_NOTICE
    } else {
        EXITING_NOTICE
    };

    // SAFETY: `write` is async-signal-safe and `notice` points to a static buffer.
    unsafe { libc::write(libc::STDOUT_FILENO, notice.as_ptr().cast(), notice.len()) };
}

/// The interpreter's own signal dispositions.
///
/// Dropping this value restores whatever dispositions were in place before [`SignalPolicy::install`].
pub(crate) struct SignalPolicy {
    _handlers: [SignalHandler; 2],
}

impl SignalPolicy {
    pub(crate) fn install() -> io::Result<Self> {
        let interrupt = SignalHandler::register(SIGINT, SignalHandlerBehavior::Ignore)?;
        let toggle = SignalHandler::register(
            SIGTSTP,
            SignalHandlerBehavior::Catch(toggle_foreground_only),
        )?;

        Ok(Self {
            _handlers: [interrupt, toggle],
        })
    }
}

/// Set the dispositions of a freshly forked child.
///
/// Must run in the child before anything else, in particular before the toggle signal is
/// unblocked again.
pub(crate) fn set_child_dispositions(background: bool) -> io::Result<()> {
    SignalHandler::register(SIGTSTP, SignalHandlerBehavior::Ignore)?.forget();

    let interrupt = if background {
        SignalHandlerBehavior::Ignore
    } else {
        SignalHandlerBehavior::Default
    };
    SignalHandler::register(SIGINT, interrupt)?.forget();

    Ok(())
}

/// Keeps the toggle signal blocked while it is alive.
///
/// The launcher holds one from just before forking until the child no longer needs waiting for,
/// so a toggle that arrives in the meantime is delivered, and its notice printed, only afterwards.
/// A forked child inherits the blocked mask and releases it once its own dispositions are set.
pub(crate) struct DeferredToggle {
    original: Option<SignalSet>,
}

impl DeferredToggle {
    pub(crate) fn hold() -> io::Result<Self> {
        let original = SignalSet::only(SIGTSTP)?.block()?;
        if original.contains(SIGTSTP) {
            dev_debug!("toggle signal was already blocked");
        }

        Ok(Self {
            original: Some(original),
        })
    }

    /// Restore the signal mask that was in place before [`DeferredToggle::hold`].
    pub(crate) fn release(mut self) -> io::Result<()> {
        match self.original.take() {
            Some(original) => original.set_mask().map(drop),
            None => Ok(()),
        }
    }
}

impl Drop for DeferredToggle {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            if let Err(err) = original.set_mask() {
                dev_warn!("cannot restore signal mask: {err}");
            }
        }
    }
}
