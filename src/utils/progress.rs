//! Progress indicators for the bulk tooling.
//!
//! Thin wrapper over `indicatif` with consistent styling. Bars become hidden
//! no-ops when progress output is disabled, so callers never need to branch.
//!
//! # Environment Variables
//!
//! - `PUNKS_NO_PROGRESS`: Set to any value to disable all progress indicators
//!
//! # Examples
//!
//! ```rust
//! use punks_cli::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::new(10);
//! progress.set_prefix("Resolving");
//! for _ in 0..10 {
//!     progress.inc(1);
//! }
//! progress.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

/// Environment variable that disables progress output.
pub const NO_PROGRESS_ENV: &str = "PUNKS_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// A progress bar with consistent styling.
///
/// Cloning is cheap; clones drive the same bar, which lets concurrently
/// dispatched batch members report into one display.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Creates a new progress bar with a specified total length.
    pub fn new(len: u64) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(default_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Creates a bar that never draws.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    /// Sets the prefix displayed before the bar.
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    /// Increments the bar by `delta` units.
    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    /// Current position of the bar.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Finishes the bar and removes it from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn default_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .map(|style| style.progress_chars("━╸━"))
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
}
