//! Source directory collection and classification.
//!
//! The collector lists the source directory once, in lexicographic order, and
//! sorts its files into three groups:
//! - chapter archives (`*.cbz`), parsed into [`ParsedChapter`]s
//! - an optional cover image (`<cover_stem>.jpg|.jpeg`)
//! - supplementary pages (`<extra_prefix>*.jpg|.jpeg`)
//!
//! Chapter archives whose names cannot be parsed are recorded as
//! [`SkippedChapter`]s and left out of the inventory. Anything else in the
//! directory is ignored.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use tokio::fs::{ReadDir, read_dir};

use crate::error::{Error, Result};
use crate::path_utils::{get_file_name_lossy, is_chapter_archive, is_hidden_file, is_jpeg};
use crate::types::{ParsedChapter, SkippedChapter, SourceInventory};

/// Scans a source directory for chapter archives, cover and extra pages.
#[derive(Debug)]
pub struct Collector<'a> {
    base_directory: &'a Path,
    cover_regex: Regex,
    extra_page_regex: Regex,
}

impl<'a> Collector<'a> {
    /// Creates a new Collector for the specified directory.
    ///
    /// # Arguments
    ///
    /// * `base_directory` - Directory holding the chapter archives
    /// * `cover_stem` - File stem that marks the cover image (matched case-insensitively)
    /// * `extra_page_prefix` - File-name prefix that marks supplementary pages
    pub fn new(base_directory: &'a Path, cover_stem: &str, extra_page_prefix: &str) -> Result<Self> {
        let cover_regex = RegexBuilder::new(&format!(r"^{}\.jpe?g$", regex::escape(cover_stem)))
            .case_insensitive(true)
            .build()?;
        let extra_page_regex =
            RegexBuilder::new(&format!(r"^{}.*\.jpe?g$", regex::escape(extra_page_prefix)))
                .case_insensitive(true)
                .build()?;

        Ok(Self {
            base_directory,
            cover_regex,
            extra_page_regex,
        })
    }

    /// Lists, classifies and parses everything in the base directory.
    pub async fn collect(&self) -> Result<SourceInventory> {
        let files = Self::collect_files(self.base_directory).await?;
        let mut inventory = SourceInventory::default();

        for path in files {
            let name = get_file_name_lossy(&path);

            if is_chapter_archive(&path) {
                match ParsedChapter::from_path(&path) {
                    Ok(chapter) => {
                        debug!("Chapter '{}' -> {}", name, chapter.number);
                        inventory.chapters.push(chapter);
                    }
                    Err(Error::MalformedChapterName { name, reason }) => {
                        warn!("Skipping chapter archive '{}': {}", name, reason);
                        inventory.skipped.push(SkippedChapter {
                            file_name: name,
                            reason,
                        });
                    }
                    Err(e) => return Err(e),
                }
            } else if self.is_cover(&name) {
                if let Some(existing) = &inventory.cover {
                    warn!(
                        "Ignoring second cover '{}', already using '{}'",
                        name,
                        get_file_name_lossy(existing)
                    );
                } else {
                    inventory.cover = Some(path);
                }
            } else if self.is_extra_page(&name) {
                inventory.extra_pages.push(path);
            } else {
                debug!("Ignoring '{}'", name);
            }
        }

        Ok(inventory)
    }

    pub fn is_cover(&self, file_name: &str) -> bool {
        self.cover_regex.is_match(file_name)
    }

    pub fn is_extra_page(&self, file_name: &str) -> bool {
        !self.is_cover(file_name) && self.extra_page_regex.is_match(file_name)
    }

    /// Collects the non-hidden regular files directly inside `directory`,
    /// sorted lexicographically by file name.
    pub async fn collect_files(directory: &Path) -> Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = Vec::new();

        let mut paths: ReadDir = read_dir(directory).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read source directory '{}': {}", directory.display(), e),
            ))
        })?;

        while let Some(entry) = paths.next_entry().await? {
            let path = entry.path();

            if is_hidden_file(&path) || !entry.file_type().await?.is_file() {
                continue;
            }

            entries.push(path);
        }

        entries.par_sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(entries)
    }
}

/// Whether `path` looks like a page image a collector would pick up.
pub fn is_page_image(path: &Path) -> bool {
    !is_hidden_file(path) && is_jpeg(path)
}
