//! Tankobon - Chapter-to-Volume CBZ Assembly
//!
//! This crate turns a directory of per-chapter CBZ archives into one volume:
//! a flat, gap-free page sequence (`001.jpg`, `002.jpg`, ...), a
//! `ComicInfo.xml` descriptor and a single `Volume {n}.cbz` archive.
//!
//! # Getting Started
//!
//! Describe the series with a `VolumeMetadata`, configure the run through the
//! `VolumeConfig` builder and call `assemble`.
//!
//! ```rust,no_run
//! use tankobon::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> tankobon::error::Result<()> {
//!     // Source holds e.g. "Blame! 1.cbz", "Blame! 2.cbz", "Blame! 2.5.cbz", "cover.jpg"
//!     let config = VolumeConfig::builder()
//!         .metadata(VolumeMetadata::new("Blame!", None))
//!         .volume_number(1u32)
//!         .source_path(PathBuf::from("./cbz"))
//!         .target_path(PathBuf::from("./Volume 1"))
//!         .work_path(PathBuf::from("./temp"))
//!         .build()?;
//!
//!     // Optional: fail early, before anything is written
//!     config.preflight_check()?;
//!
//!     let report = config.assemble().await?;
//!     println!("{} pages -> {:?}", report.page_count, report.archive_path);
//!     for skipped in &report.skipped {
//!         println!("skipped {}: {}", skipped.file_name, skipped.reason);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The individual stages (`chapter`, `sequencer`, `flattener`, `comic_info`,
//! `generator`) are public and can be driven on their own.

pub mod chapter;
pub mod collector;
pub mod comic_info;
pub mod config;
pub mod error;
pub mod flattener;
pub mod generator;
pub mod path_utils;
pub mod sequencer;
pub mod types;
pub mod volume;

pub use volume::{VolumeConfig, VolumeConfigBuilder};

pub use types::{
    ChapterFile, ChapterNumber, ChapterSummary, ParsedChapter, SequencedChapter, SkippedChapter,
    SourceInventory, VolumeMetadata, VolumeReport,
};

/// Prelude module for convenient imports.
///
/// Re-exports the most commonly used types, so `use tankobon::prelude::*;`
/// is enough for typical use.
pub mod prelude {
    pub use super::{
        ChapterFile, ChapterNumber, ChapterSummary, ParsedChapter, SequencedChapter,
        SkippedChapter, SourceInventory, VolumeConfig, VolumeConfigBuilder, VolumeMetadata,
        VolumeReport, error, generator, types,
    };
    pub use crate::chapter::parse_chapter_name;
    pub use crate::collector::Collector;
    pub use crate::comic_info::VolumeDescriptor;
    pub use crate::config::SeriesConfig;
    pub use crate::flattener::{PageFlattener, PageSequence};
    pub use crate::sequencer::sequence_chapters;
    pub use std::path::{Path, PathBuf};
}
