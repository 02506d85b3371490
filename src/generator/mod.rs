//! Archive generators for assembled volumes.
//!
//! This module contains the common interface for archive writers and the CBZ
//! implementation used for finished volumes.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub mod cbz;

/// Common interface for volume archive writers.
///
/// A generator is created for one output file, fed files one at a time, and
/// finalized with [`Generator::save`]. Entries are written in the order they
/// are added.
#[async_trait]
pub trait Generator {
    /// Creates a new generator instance.
    ///
    /// # Parameters
    /// * `output_dir` - Directory where the archive will be saved
    /// * `base_filename` - Name of the archive without extension (e.g., "Volume 1")
    ///
    /// An existing archive with the same name is truncated.
    fn new(output_dir: &Path, base_filename: &str) -> Result<Self>
    where
        Self: Sized;

    /// Full path of the archive being written.
    fn output_path(&self) -> &Path;

    /// Adds a file under the given entry name (`/`-separated).
    async fn add_file(&mut self, file_path: &Path, entry_name: &str) -> Result<&mut Self>
    where
        Self: Sized;

    /// Finalizes the archive and writes its central directory.
    ///
    /// Returns the number of entries written.
    async fn save(self) -> Result<usize>;
}
