//! Core data types and reports for the Tankobon volume pipeline.
//!
//! This module defines the data that flows between pipeline stages:
//! - Chapter identity (`ChapterFile`, `ChapterNumber`, `ParsedChapter`, `SequencedChapter`)
//! - Series-level metadata (`VolumeMetadata`)
//! - Collection output (`SourceInventory`, `SkippedChapter`)
//! - Run reporting (`ChapterSummary`, `VolumeReport`)

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A chapter archive as found in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterFile {
    /// File name on disk, extension included (e.g. `"Series 12.5.cbz"`).
    pub name: String,
    pub path: PathBuf,
    /// The raw chapter token taken from the name (e.g. `"12.5"`).
    pub token: String,
}

/// Largest chapter number magnitude accepted. Keeps slot probing far from
/// the `i64` limits.
pub const MAX_CHAPTER_NUMBER: f64 = 1_000_000_000.0;

/// Parsed chapter number. Only ever used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ChapterNumber(f64);

impl ChapterNumber {
    /// Wraps a finite value within `MAX_CHAPTER_NUMBER`. Anything else
    /// yields `None`.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value.abs() <= MAX_CHAPTER_NUMBER).then_some(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// The candidate slot for this chapter: the ceiling of its number.
    pub fn candidate_slot(&self) -> i64 {
        self.0.ceil() as i64
    }
}

impl fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chapter file whose name parsed successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChapter {
    pub file: ChapterFile,
    pub number: ChapterNumber,
}

/// A chapter with its final position in the volume.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedChapter {
    pub file: ChapterFile,
    pub number: ChapterNumber,
    /// Collision-resolved sequencing key. Unique within a run.
    pub slot: i64,
    /// 1-based, contiguous position used for the working folder name.
    pub display_index: usize,
}

impl SequencedChapter {
    /// Name of the extraction folder for this chapter.
    pub fn folder_name(&self) -> String {
        format!("Chapter {}", self.display_index)
    }
}

/// Series-level metadata embedded in every volume of a series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetadata {
    pub series: String,
    pub writer: Option<String>,
}

impl VolumeMetadata {
    pub fn new(series: impl Into<String>, writer: Option<String>) -> Self {
        Self {
            series: series.into(),
            writer: writer.filter(|w| !w.trim().is_empty()),
        }
    }
}

/// A chapter file that was excluded from the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedChapter {
    pub file_name: String,
    pub reason: String,
}

/// Everything the collector found in a source directory.
///
/// All lists are in lexicographic file-name order.
#[derive(Debug, Clone, Default)]
pub struct SourceInventory {
    pub chapters: Vec<ParsedChapter>,
    pub skipped: Vec<SkippedChapter>,
    pub cover: Option<PathBuf>,
    pub extra_pages: Vec<PathBuf>,
}

impl SourceInventory {
    /// Source files that feed pages into the volume.
    pub fn processed_files(&self) -> Vec<&Path> {
        self.cover
            .iter()
            .map(PathBuf::as_path)
            .chain(self.extra_pages.iter().map(PathBuf::as_path))
            .chain(self.chapters.iter().map(|c| c.file.path.as_path()))
            .collect()
    }
}

/// Per-chapter line of a [`VolumeReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub file_name: String,
    pub chapter_number: f64,
    pub slot: i64,
    pub display_index: usize,
    pub page_count: usize,
    /// Output page number of the chapter's first page, if it had any.
    pub first_page: Option<usize>,
}

/// Outcome of a completed volume run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeReport {
    pub volume_number: u32,
    pub page_count: usize,
    pub had_cover: bool,
    pub extra_page_count: usize,
    pub chapters: Vec<ChapterSummary>,
    pub skipped: Vec<SkippedChapter>,
    pub descriptor_path: PathBuf,
    pub archive_path: PathBuf,
    pub archive_entries: usize,
    /// Originals moved to the holding area, at their new location.
    pub held: Vec<PathBuf>,
}
