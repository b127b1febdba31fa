//! Append-only operation log kept beside the backup files.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use log::warn;
use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use crate::runtime::Runtime;

pub struct OperationLog<W: Write> {
    writer: W,
}

impl OperationLog<Box<dyn Write + Send>> {
    /// Open (or create) the log file at `path` for appending.
    #[tracing::instrument(skip(runtime))]
    pub fn open<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let writer = runtime
            .open_append(path)
            .with_context(|| format!("Failed to open operation log {}", path.display()))?;
        Ok(Self { writer })
    }
}

impl<W: Write> OperationLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Append one timestamped line and flush it.
    pub fn record(&mut self, message: impl Display) -> Result<()> {
        let line = format_line(&Local::now(), message);
        writeln!(self.writer, "{}", line).context("Failed to write operation log")?;
        self.writer.flush().context("Failed to flush operation log")?;
        Ok(())
    }

    /// Like [`record`](Self::record), but a failed write is only warned about and handed back.
    /// For events that must not interrupt the operation being logged.
    pub fn try_record(&mut self, message: impl Display) -> Option<anyhow::Error> {
        self.record(message)
            .err()
            .inspect(|e| warn!("Operation log entry lost: {:#}", e))
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.writer
    }
}

/// `[YYYY-MM-DD HH:MM:SS] message`
fn format_line<Tz: TimeZone>(at: &DateTime<Tz>, message: impl Display) -> String
where
    Tz::Offset: Display,
{
    format!("[{}] {}", at.format("%Y-%m-%d %H:%M:%S"), message)
}
