//! The punk catalog.
//!
//! - [`dataset`] - the static `cryptoPunkData.json` and its queries
//! - [`service`] - [`PunkService`], records with served image URLs
//! - [`snapshot`] - the consolidated `cryptoPunkData-Alchemy.json`

pub mod dataset;
pub mod service;
pub mod snapshot;

pub use dataset::{BasePunk, Dataset, FilterQuery};
pub use service::{ImageStrategy, Punk, PunkService};
pub use snapshot::{SnapshotEntry, SnapshotSummary};
