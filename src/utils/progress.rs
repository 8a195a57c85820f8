//! Terminal progress indication.
//!
//! A single spinner is shown while a resolution runs. It is hidden when stderr is not a
//! terminal, when `--no-progress` or `--quiet` is given, or when `GOPM_NO_PROGRESS` is set, so
//! that logs and scripted output stay clean.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Environment variable disabling progress output.
pub const NO_PROGRESS_ENV: &str = "GOPM_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some() || !std::io::stderr().is_terminal()
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
}

/// A spinner for operations of unknown length.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// A ticking spinner, or a hidden one when progress is disabled.
    pub fn new_spinner() -> Self {
        Self::spinner_unless(false)
    }

    /// Like [`new_spinner`](Self::new_spinner), hidden when `disabled` is set.
    pub fn spinner_unless(disabled: bool) -> Self {
        let bar = if disabled || is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Replaces the message next to the spinner.
    pub fn set_message(&self, message: impl Into<String>) {
        self.inner.set_message(message.into());
    }

    /// Whether nothing is drawn.
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    /// Removes the spinner from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Stops the spinner, leaving `message` in its place.
    pub fn finish_with_message(&self, message: impl Into<String>) {
        self.inner.finish_with_message(message.into());
    }
}
