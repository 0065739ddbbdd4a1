//! Local caches.
//!
//! Currently a single cache: the durable [`MappingStore`] of resolved image
//! URLs, which lets repeated lookups skip the metadata provider entirely.

pub mod mapping_store;

pub use mapping_store::MappingStore;
