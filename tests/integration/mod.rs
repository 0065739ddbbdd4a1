//! Integration test suite for punks
//!
//! End-to-end tests across the public API and the `punks` binary. Network
//! traffic only ever reaches the loopback [`StubServer`](common::StubServer).
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **alchemy_provider**: Alchemy client request shape and response handling
//! - **batch_update**: bulk resolution with checkpoints
//! - **cli_commands**: the `punks` binary against fixture data directories
//! - **png_conversion**: SVG to PNG rewriting with HTTP reachability checks
//! - **resolver_pipeline**: mapping, retries, rate limiting and fallback together

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod alchemy_provider;
mod batch_update;
mod cli_commands;
mod png_conversion;
mod resolver_pipeline;
