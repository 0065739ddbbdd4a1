//! Atomic file write operations using temp-and-rename strategy.
//!
//! This module provides safe, atomic file writing that prevents corruption
//! from interrupted writes.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Returns
///
/// - `Ok(())` if the directory exists or was successfully created
/// - `Err` if the path exists but is not a directory, or creation fails
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Safely writes a string to a file using atomic operations.
///
/// Convenience wrapper around [`atomic_write`]. The file either contains the
/// new content or the old content, never a partial write.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Writes content to a sibling temporary file (`<name>.tmp`)
/// 2. Syncs the temporary file to disk
/// 3. Renames the temporary file over the target path
///
/// Parent directories are created when missing.
///
/// # Examples
///
/// ```rust,no_run
/// use punks_cli::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new("openseaCdnMapping.json"), b"{}")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let temp_path = temp_path_for(path);

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        // Leave no stray temp file behind when the target cannot be replaced.
        let _ = fs::remove_file(&temp_path);
        return Err(e)
            .with_context(|| format!("Failed to rename temp file to: {}", path.display()));
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
