//! File system utilities.
//!
//! Every write in this crate goes through [`atomic_write`]: the mapping file
//! and the consolidated snapshot are replaced as a whole, so a crash mid-write
//! leaves the previous content intact instead of a truncated JSON document.
//!
//! # Examples
//!
//! ```rust,no_run
//! use punks_cli::utils::fs::{read_json_file, write_json_file};
//! use std::collections::BTreeMap;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut mapping = BTreeMap::new();
//! mapping.insert("1".to_string(), "https://cdn.example/a.svg".to_string());
//! write_json_file(Path::new("openseaCdnMapping.json"), &mapping, true)?;
//!
//! let loaded: BTreeMap<String, String> = read_json_file(Path::new("openseaCdnMapping.json"))?;
//! assert_eq!(loaded, mapping);
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod formats;

pub use atomic::{atomic_write, ensure_dir, safe_write};
pub use formats::{read_json_file, read_text_file, write_json_file};
