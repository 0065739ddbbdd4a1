//! punks - CryptoPunks metadata and image URL tooling
//!
//! Serves punk records from the static `cryptoPunkData.json` dataset and
//! resolves a canonical image URL for each punk, either from a fixed URL
//! template or through a cached, rate-limited, retrying pipeline backed by the
//! Alchemy NFT API.
//!
//! # Architecture Overview
//!
//! Resolving an id through the pipeline goes:
//!
//! 1. **Mapping store** - durable `id -> URL` map (`openseaCdnMapping.json`);
//!    a hit returns immediately and never reaches the provider
//! 2. **Rate limiter** - process-wide minimum spacing between provider calls
//! 3. **Retry policy** - bounded attempts, each with a timeout, exponential
//!    backoff in between
//! 4. **Provider** - Alchemy `getNFTMetadata`, yielding the cached image URL
//! 5. **Fallback** - the cryptopunks.app PNG URL when every attempt failed;
//!    fallbacks are served but never persisted
//!
//! Successful fetches are written back to the mapping store, so each id is
//! fetched at most once across runs.
//!
//! # Core Modules
//!
//! - [`core`] - punk ids, URL templates, error types
//! - [`config`] - `punks.toml` settings and image source selection
//! - [`cache`] - the durable mapping store
//! - [`provider`] - metadata provider abstraction and the Alchemy client
//! - [`resolver`] - rate limiting, retries, single and batch resolution
//! - [`catalog`] - dataset queries and the consolidated snapshot
//! - [`repair`] - SVG to PNG rewriting of mapped URLs
//! - [`cli`] - the `punks` command-line interface
//! - [`utils`] - JSON file helpers, atomic writes, progress bars
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Fill the mapping for every punk still missing
//! punks update
//!
//! # Regenerate cryptoPunkData-Alchemy.json from dataset + mapping
//! punks snapshot
//!
//! # Query the catalog
//! punks show 7804
//! punks filter alien "cap,earring" --limit 3
//! ```
//!
//! # Configuration
//!
//! ```toml
//! # punks.toml
//! image_source = "alchemy"
//! data_dir = "data"
//! rate_limit_ms = 100
//! batch_size = 50
//! max_retries = 3
//! ```
//!
//! The API key is read from `ALCHEMY_API_KEY`; see
//! [`PunksConfig`](config::PunksConfig) for every setting and its environment
//! override.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod provider;
pub mod repair;
pub mod resolver;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
