//! `log` backend that prints through an [`OutputFormatter`].
//!
//! Library code reports diagnostics with `log::warn!` and `log::debug!`. The
//! CLI installs this logger so those records look like the rest of its
//! output: warnings and errors always, everything else only with `--verbose`.

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::error::{PageMergeError, Result};
use crate::output::formatter::OutputFormatter;

/// Logger forwarding records to an [`OutputFormatter`].
#[derive(Debug, Clone)]
pub struct FormatterLogger {
    formatter: OutputFormatter,
}

impl FormatterLogger {
    /// Create a logger for the given formatter.
    pub fn new(formatter: OutputFormatter) -> Self {
        Self { formatter }
    }

    /// Most detailed level this logger prints.
    pub fn max_level(&self) -> LevelFilter {
        if self.formatter.is_verbose() {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }

    /// Install as the global logger.
    ///
    /// # Errors
    ///
    /// Fails if a logger was already installed.
    pub fn install(self) -> Result<()> {
        let level = self.max_level();
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| PageMergeError::other(format!("Failed to install logger: {e}")))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for FormatterLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Third-party crates only get through with warnings.
        metadata.level() <= self.max_level()
            && (metadata.level() <= Level::Warn || metadata.target().starts_with(crate::NAME))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = record.args().to_string();
        match record.level() {
            Level::Error => self.formatter.error(&message),
            Level::Warn => self.formatter.warning(&message),
            Level::Info | Level::Debug | Level::Trace => self.formatter.debug(&message),
        }
    }

    fn flush(&self) {}
}
