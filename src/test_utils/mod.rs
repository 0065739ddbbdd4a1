//! Test utilities for punks
//!
//! This module provides helpers shared by the unit tests and the integration
//! test target:
//! - [`MockProvider`], a scripted [`MetadataProvider`](crate::provider::MetadataProvider)
//!   that records every call
//! - [`DatasetFixture`], sample datasets and mapping files in a temp directory
//! - [`init_test_logging`], opt-in tracing output for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use punks_cli::core::PunkId;
//! use punks_cli::test_utils::{MockOutcome, MockProvider};
//!
//! let provider = MockProvider::new()
//!     .with_url(PunkId::new(1), "https://cdn.example/1.svg")
//!     .with_outcome(PunkId::new(2), MockOutcome::Status(500));
//! assert_eq!(provider.calls(), 0);
//! ```

pub mod fixtures;
pub mod mock_provider;

pub use fixtures::DatasetFixture;
pub use mock_provider::{MockOutcome, MockProvider};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without log output.
///
/// ```bash
/// RUST_LOG=punks_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
