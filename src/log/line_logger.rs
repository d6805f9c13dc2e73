use std::{
    fmt,
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

#[cfg(feature = "dev")]
use std::{fs::File, path::Path};

use super::Log;

/// Writes each record as a single prefixed line.
///
/// Children inherit the interpreter's standard error, so a record is assembled first and handed
/// to the sink in one write; it cannot end up interleaved with a child's output mid-line.
pub struct LineLogger<W> {
    sink: Mutex<W>,
    prefix: &'static str,
}

impl<W: Write> LineLogger<W> {
    fn new(sink: W, prefix: &'static str) -> Self {
        Self {
            sink: Mutex::new(sink),
            prefix,
        }
    }
}

impl LineLogger<io::Stderr> {
    pub fn stderr(prefix: &'static str) -> Self {
        Self::new(io::stderr(), prefix)
    }
}

#[cfg(feature = "dev")]
impl LineLogger<File> {
    pub fn append_to(path: impl AsRef<Path>, prefix: &'static str) -> io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)?;

        Ok(Self::new(file, prefix))
    }
}

impl<W: Write + Send> Log for LineLogger<W> {
    fn log(&self, _level: log::Level, args: &fmt::Arguments<'_>) {
        let line = format!("{}{args}\n", self.prefix);
        // a panic elsewhere while holding the lock leaves the sink itself intact
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        // nowhere left to report a failing diagnostic stream
        let _ = sink.write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use pretty_assertions::assert_eq;

    use super::LineLogger;
    use crate::log::Log;

    /// Counts the writes it receives.
    #[derive(Default)]
    struct Sink {
        text: Vec<u8>,
        writes: usize,
        flushes: usize,
    }

    impl io::Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.text.extend_from_slice(buf);
            self.writes += 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct Closed;

    impl io::Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(libc::EBADF))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from_raw_os_error(libc::EBADF))
        }
    }

    #[test]
    fn records_become_prefixed_lines() {
        let logger = LineLogger::new(Sink::default(), "smallsh: ");

        logger.log(log::Level::Error, &format_args!("cd: {}: not found", "/nowhere"));
        logger.log(log::Level::Warn, &format_args!("too many arguments (max {})", 512));
        logger.flush();

        let sink = logger.sink.into_inner().unwrap();
        assert_eq!(
            String::from_utf8(sink.text).unwrap(),
            "smallsh: cd: /nowhere: not found\nsmallsh: too many arguments (max 512)\n"
        );
        // one write per record, however many pieces it was formatted from
        assert_eq!(sink.writes, 2);
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn closed_sink_is_ignored() {
        let logger = LineLogger::new(Closed, "");

        logger.log(log::Level::Error, &format_args!("lost"));
        logger.flush();
    }
}
