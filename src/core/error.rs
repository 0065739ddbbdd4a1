//! Error handling for punks
//!
//! This module provides the error types and user-friendly error reporting used
//! across the crate. The error system is built around two ideas:
//! 1. **Strongly-typed errors** for precise handling inside the library
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`PunksError`] - Enumerated error types for application failures
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! Failures of individual provider attempts are *not* represented here: they
//! live in [`FetchError`](crate::provider::FetchError) and never escape the
//! resolver. Only persistence problems and setup errors (configuration,
//! dataset, mapping file) surface as [`PunksError`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use punks_cli::core::{PunksError, user_friendly_error};
//!
//! let error = PunksError::MissingApiKey;
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // colored error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for punks operations.
///
/// # Error Categories
///
/// ## Configuration
/// - [`ConfigError`](PunksError::ConfigError) - Invalid configuration values
/// - [`MissingApiKey`](PunksError::MissingApiKey) - Provider credential not supplied
/// - [`InvalidImageSource`](PunksError::InvalidImageSource) - Unknown `image_source`
///
/// ## Data files
/// - [`DatasetNotFound`](PunksError::DatasetNotFound) / [`DatasetParseError`](PunksError::DatasetParseError)
/// - [`MappingParseError`](PunksError::MappingParseError) - Mapping file is not a flat JSON object
/// - [`PersistenceFailed`](PunksError::PersistenceFailed) - Durable write of the mapping failed
///
/// ## Lookups
/// - [`PunkNotFound`](PunksError::PunkNotFound) - Id not present in the dataset
/// - [`InvalidPunkId`](PunksError::InvalidPunkId) - Id is not a decimal number
#[derive(Error, Debug)]
pub enum PunksError {
    /// Configuration value is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// The Alchemy API key was not provided.
    #[error("ALCHEMY_API_KEY is required for resolver-backed image sources")]
    MissingApiKey,

    /// Unknown image source name.
    #[error("Unknown image source: {name}")]
    InvalidImageSource {
        /// The rejected name
        name: String,
    },

    /// The static dataset file does not exist.
    #[error("Dataset file not found: {path}")]
    DatasetNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The static dataset could not be parsed.
    #[error("Invalid dataset file {path}: {reason}")]
    DatasetParseError {
        /// Path of the dataset
        path: String,
        /// Parser message
        reason: String,
    },

    /// The mapping file could not be parsed.
    #[error("Invalid mapping file {path}: {reason}")]
    MappingParseError {
        /// Path of the mapping file
        path: String,
        /// Parser message
        reason: String,
    },

    /// Writing the mapping file failed. The in-memory entry is kept.
    #[error("Failed to persist mapping to {path}: {reason}")]
    PersistenceFailed {
        /// Path of the mapping file
        path: String,
        /// Underlying error message
        reason: String,
    },

    /// Id not present in the dataset.
    #[error("Punk '{id}' not found")]
    PunkNotFound {
        /// The requested id
        id: String,
    },

    /// Id is not a valid decimal identifier.
    #[error("Invalid punk id: '{id}'")]
    InvalidPunkId {
        /// The rejected input
        id: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Generic error with a message
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error with user-facing details and a suggestion.
///
/// ```rust,no_run
/// use punks_cli::core::{ErrorContext, PunksError};
///
/// let context = ErrorContext::new(PunksError::MissingApiKey)
///     .with_suggestion("export ALCHEMY_API_KEY=...")
///     .with_details("The alchemy image source fetches URLs from the Alchemy NFT API");
/// println!("{context}");
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: PunksError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without details or suggestion.
    #[must_use]
    pub const fn new(error: PunksError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognizes [`PunksError`] variants anywhere in the `anyhow` chain and
/// [`std::io::Error`] kinds; everything else is rendered with its full cause
/// chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(punks_error) = error.chain().find_map(|e| e.downcast_ref::<PunksError>()) {
        return create_error_context(punks_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(PunksError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check ownership and permissions of the data directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(PunksError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file exists or pass --data-dir");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(PunksError::Other {
        message,
    })
}

fn create_error_context(error: &PunksError) -> ErrorContext {
    // PunksError wraps non-Clone sources, so the context carries a rendered copy.
    let rendered = |e: &PunksError| PunksError::Other {
        message: e.to_string(),
    };

    match error {
        PunksError::MissingApiKey => ErrorContext::new(PunksError::MissingApiKey)
            .with_suggestion("Set ALCHEMY_API_KEY in the environment or api_key in punks.toml")
            .with_details("Resolver-backed image sources fetch URLs from the Alchemy NFT API"),
        PunksError::InvalidImageSource {
            name,
        } => ErrorContext::new(PunksError::InvalidImageSource {
            name: name.clone(),
        })
        .with_suggestion(
            "Use one of: cryptopunks.app, larvalabs, opensea, opensea-cdn, alchemy",
        ),
        PunksError::DatasetNotFound {
            path,
        } => ErrorContext::new(PunksError::DatasetNotFound {
            path: path.clone(),
        })
        .with_suggestion("Pass --data-dir pointing at the directory holding cryptoPunkData.json"),
        PunksError::MappingParseError {
            ..
        } => ErrorContext::new(rendered(error))
            .with_suggestion("The mapping must be a flat JSON object of id to URL")
            .with_details("Restore the file from a backup or delete it to start from scratch"),
        PunksError::PunkNotFound {
            ..
        }
        | PunksError::InvalidPunkId {
            ..
        } => ErrorContext::new(rendered(error))
            .with_suggestion("Punk ids are decimal numbers present in the dataset, e.g. 42"),
        PunksError::ConfigError {
            ..
        }
        | PunksError::TomlError(_) => ErrorContext::new(rendered(error))
            .with_suggestion("Check punks.toml or the file passed with --config"),
        _ => ErrorContext::new(rendered(error)),
    }
}
