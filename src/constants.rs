//! Global constants used throughout the punks codebase.
//!
//! This module contains timeouts, retry parameters, provider endpoints and
//! file names shared across modules. Defining them centrally keeps the
//! defaults of [`PunksConfig`](crate::config::PunksConfig) and the tests in
//! agreement.

use std::time::Duration;

/// Minimum spacing between two provider calls (100ms, i.e. 10 requests/second).
pub const DEFAULT_RATE_LIMIT_MS: u64 = 100;

/// Maximum number of provider attempts for a single resolution.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Per-attempt timeout for provider calls (10 seconds).
///
/// A timed-out attempt is cancelled and counts as a failed attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Starting delay for retry backoff (1 second).
///
/// The delay doubles on each further attempt: 1s, 2s, 4s...
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Cap for retry backoff delays (5 seconds).
pub const RETRY_MAX_DELAY_MS: u64 = 5000;

/// Number of ids resolved per batch by the bulk updater.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Pause between two batches of the bulk updater (2 seconds).
pub const DEFAULT_BATCH_DELAY_MS: u64 = 2000;

/// Pause between two ids of a sequentially dispatched batch.
pub const DEFAULT_ITEM_DELAY_MS: u64 = 50;

/// Default number of punks returned by the filter query.
pub const DEFAULT_FILTER_LIMIT: usize = 10;

/// Alchemy mainnet API host.
pub const ALCHEMY_BASE_URL: &str = "https://eth-mainnet.g.alchemy.com";

/// CryptoPunks contract on Ethereum mainnet.
pub const PUNKS_CONTRACT_ADDRESS: &str = "0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb";

/// Browser-like user agent; the provider rejects some default client agents.
pub const PROVIDER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Cloudinary prefix serving Alchemy renders converted to PNG.
pub const CLOUDINARY_PNG_PREFIX: &str =
    "https://res.cloudinary.com/alchemyapi/image/upload/convert-png/eth-mainnet/";

/// Host fragment identifying Alchemy CDN (SVG) URLs.
pub const ALCHEMY_CDN_HOST: &str = "nft-cdn.alchemy.com";

/// Static dataset with type and accessories per punk.
pub const DATASET_FILE: &str = "cryptoPunkData.json";

/// Durable id to image URL mapping.
pub const MAPPING_FILE: &str = "openseaCdnMapping.json";

/// Consolidated dataset regenerated from the dataset and the mapping.
pub const SNAPSHOT_FILE: &str = "cryptoPunkData-Alchemy.json";

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "punks.toml";
