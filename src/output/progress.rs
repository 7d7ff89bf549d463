//! Progress bar for rasterization and merging.
//!
//! The bar draws on stderr and only when stderr is a terminal, so piping
//! the output of `pagemerge layout` stays clean.
//!
//! # Examples
//!
//! ```
//! use pagemerge::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(40, ProgressStyle::Bar);
//! progress.set_message("Rendering thumbnails");
//! for done in (10..=40).step_by(10) {
//!     progress.update(done);
//! }
//! progress.finish();
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 40;

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Classic progress bar: `[=====>    ]`
    Bar,
    /// Simple counter: `42/100`
    Counter,
}

/// Progress indicator for a known number of items.
#[derive(Debug)]
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    last_update: Option<Instant>,
    update_interval: Duration,
    enabled: bool,
}

impl ProgressBar {
    /// Create a progress bar, enabled when stderr is a terminal.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_update: None,
            update_interval: Duration::from_millis(100),
            enabled: io::stderr().is_terminal(),
        }
    }

    /// Create a disabled progress bar (no output).
    pub fn disabled() -> Self {
        let mut pb = Self::new(0, ProgressStyle::Counter);
        pb.enabled = false;
        pb
    }

    /// Bar style for the given total, or disabled in quiet mode.
    pub fn for_task(total: usize, quiet: bool) -> Self {
        if quiet {
            let mut pb = Self::disabled();
            pb.total = total;
            pb
        } else {
            Self::new(total, ProgressStyle::Bar)
        }
    }

    /// Set the message shown before the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Update the progress to `current` items.
    ///
    /// Redraws are throttled, except for the final update.
    pub fn update(&mut self, current: usize) {
        self.current = current;

        let due = self
            .last_update
            .is_none_or(|last| last.elapsed() >= self.update_interval);
        if !due && current < self.total {
            return;
        }

        self.last_update = Some(Instant::now());
        self.render();
    }

    /// Mark the task as finished.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled {
            self.render();
            eprintln!();
        }
    }

    /// Fraction done, as a percentage.
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Time since the bar was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn render(&self) {
        if !self.enabled {
            return;
        }

        let line = match self.style {
            ProgressStyle::Bar => self.render_bar(),
            ProgressStyle::Counter => self.render_counter(),
        };

        let mut stderr = io::stderr();
        write!(stderr, "\r\x1b[K{line}").ok();
        stderr.flush().ok();
    }

    fn render_bar(&self) -> String {
        let filled = (BAR_WIDTH * self.current) / self.total.max(1);
        let filled = filled.min(BAR_WIDTH);
        let head = if filled > 0 { ">" } else { "" };
        let bar = format!(
            "[{}{head}{}]",
            "=".repeat(filled.saturating_sub(1)),
            " ".repeat(BAR_WIDTH - filled)
        );

        let mut parts = vec![
            bar,
            format!("{:.0}%", self.percent()),
            format!("{}/{}", self.current, self.total),
            format_duration(self.elapsed()),
        ];
        if let Some(msg) = &self.message {
            parts.insert(0, msg.clone());
        }
        parts.join(" ")
    }

    fn render_counter(&self) -> String {
        let mut parts = vec![
            format!("{}/{}", self.current, self.total),
            format_duration(self.elapsed()),
        ];
        if let Some(msg) = &self.message {
            parts.insert(0, msg.clone());
        }
        parts.join(" ")
    }
}

/// Format a duration as a human-readable string.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
