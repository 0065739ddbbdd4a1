//! Utility modules.
//!
//! - [`fs`] - Atomic writes and JSON file helpers
//! - [`progress`] - Progress bars for the bulk tooling

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use progress::ProgressBar;
