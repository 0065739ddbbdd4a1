//! Core types and error handling.
//!
//! - [`error`] - [`PunksError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`punk_id`] - [`PunkId`], the numerically ordered identifier
//! - [`image_url`] - Deterministic URL templates and the fallback URL

pub mod error;
pub mod image_url;
pub mod punk_id;

pub use error::{ErrorContext, PunksError, user_friendly_error};
pub use image_url::{ImageKind, UrlTemplate, fallback_url};
pub use punk_id::PunkId;
