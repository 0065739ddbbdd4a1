//! Configuration management for punks
//!
//! - [`settings`] - [`PunksConfig`], loaded from `punks.toml` with environment
//!   overrides
//! - [`image_source`] - [`ImageSource`], the closed set of image URL sources
//!
//! Configuration is read once at startup; the resulting values are passed
//! into the pipeline explicitly rather than read from globals.

pub mod image_source;
pub mod settings;

pub use image_source::ImageSource;
pub use settings::PunksConfig;
