use std::path::{Path, PathBuf};

use log::{info, warn};
use tokio::fs;

use crate::collector::Collector;
use crate::comic_info::VolumeDescriptor;
use crate::error::{Error, Result};
use crate::flattener::{FlattenedPages, PageFlattener};
use crate::generator::cbz::{ArchiveSummary, pack_directory};
use crate::path_utils::move_into;
use crate::sequencer::sequence_chapters;
use crate::types::{
    ChapterSummary, SequencedChapter, SkippedChapter, SourceInventory, VolumeMetadata,
    VolumeReport,
};

/// Configuration for assembling one volume, built declaratively with the builder pattern.
///
/// A run moves through five stages, each one consuming the previous:
///
/// [`collect`](VolumeConfig::collect) → [`CollectedSource::sequence`] →
/// [`SequencedSource::flatten`] → [`FlattenedVolume::describe`] →
/// [`DescribedVolume::archive`]
///
/// so the descriptor can only be written once the page count is final, and the
/// archive only once the descriptor exists. [`assemble`](VolumeConfig::assemble)
/// runs all of them in order.
///
/// ## Re-running
///
/// Runs are **not idempotent**. Pages are written to `001.jpg`, `002.jpg`, ...
/// in the target directory without looking at what is already there, so a
/// second run over the same target overwrites earlier pages, and any extra
/// pages from the earlier run are kept and archived too. Clear the target
/// (and the work directory) before retrying a failed run.
///
/// ## Builder Pattern
///
/// ```rust,no_run
/// # use tankobon::prelude::*;
/// # #[tokio::main]
/// # async fn main() -> tankobon::error::Result<()> {
/// let report = VolumeConfig::builder()
///     .metadata(VolumeMetadata::new("Blame!", Some("Tsutomu Nihei".to_string())))
///     .volume_number(1u32)
///     .source_path(PathBuf::from("./cbz"))
///     .target_path(PathBuf::from("./Volume 1"))
///     .work_path(PathBuf::from("./temp"))
///     .build()?
///     .assemble()
///     .await?;
///
/// println!("{} pages", report.page_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct VolumeConfig {
    /// Series name and optional writer, embedded in `ComicInfo.xml`.
    pub metadata: VolumeMetadata,

    /// Volume number; also names the archive (`Volume {n}.cbz`). Must be positive.
    pub volume_number: u32,

    /// Directory holding the chapter archives, cover and extra pages.
    pub source_path: PathBuf,

    /// Directory receiving the flat pages, the descriptor and the archive.
    pub target_path: PathBuf,

    /// Where chapter archives are extracted. Defaults to `target_path`, in
    /// which case leftover non-image entries end up in the archive as well.
    #[builder(default)]
    pub work_path: Option<PathBuf>,

    /// When set, processed originals are moved here after a successful run.
    #[builder(default)]
    pub hold_path: Option<PathBuf>,

    /// File stem of the cover image in the source directory.
    #[builder(default = "\"cover\".to_string()")]
    pub cover_stem: String,

    /// File-name prefix of supplementary pages in the source directory.
    #[builder(default = "\"extra\".to_string()")]
    pub extra_page_prefix: String,

    /// Create `target_path` (and `work_path`) when missing. When `false`,
    /// a missing target is an error.
    #[builder(default = "true")]
    pub create_output_directory: bool,
}

impl VolumeConfig {
    pub fn builder() -> VolumeConfigBuilder {
        VolumeConfigBuilder::default()
    }

    /// Title of the volume, also the archive's base name.
    pub fn title(&self) -> String {
        format!("Volume {}", self.volume_number)
    }

    pub fn work_dir(&self) -> &Path {
        self.work_path.as_deref().unwrap_or(self.target_path.as_path())
    }

    /// Checks everything that can be checked without touching the disk.
    ///
    /// Nothing is created or modified; `assemble` calls this first.
    pub fn preflight_check(&self) -> Result<&Self> {
        if self.metadata.series.trim().is_empty() {
            return Err(Error::InvalidConfig("series name is required".to_string()));
        }
        if self.volume_number == 0 {
            return Err(Error::InvalidConfig(
                "volume number must be a positive integer".to_string(),
            ));
        }
        if self.target_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("target path is required".to_string()));
        }
        if !self.source_path.exists() {
            return Err(Error::NotFound(format!(
                "Source path does not exist: {:?}",
                self.source_path
            )));
        }
        if !self.source_path.is_dir() {
            return Err(Error::InvalidPath(
                self.source_path.clone(),
                "Source path is not a directory.".to_string(),
            ));
        }
        if !self.create_output_directory && !self.target_path.is_dir() {
            return Err(Error::NotFound(format!(
                "Target directory does not exist: {:?}",
                self.target_path
            )));
        }
        Ok(self)
    }

    /// Stage 1: lists and classifies the source directory.
    pub async fn collect(&self) -> Result<CollectedSource<'_>> {
        self.preflight_check()?;

        let collector = Collector::new(&self.source_path, &self.cover_stem, &self.extra_page_prefix)?;
        let inventory = collector.collect().await?;

        info!(
            "Found {} chapter(s), {} skipped, cover: {}, {} extra page(s)",
            inventory.chapters.len(),
            inventory.skipped.len(),
            if inventory.cover.is_some() { "yes" } else { "no" },
            inventory.extra_pages.len()
        );

        Ok(CollectedSource {
            config: self,
            inventory,
        })
    }

    /// Runs every stage and, if configured, moves the originals to the holding area.
    pub async fn assemble(&self) -> Result<VolumeReport> {
        let archived = self
            .collect()
            .await?
            .sequence()
            .flatten()
            .await?
            .describe()
            .await?
            .archive()
            .await?;

        archived.hold_originals().await
    }

    async fn prepare_directories(&self) -> Result<()> {
        for dir in [self.target_path.as_path(), self.work_dir()] {
            if !dir.exists() {
                if !self.create_output_directory {
                    return Err(Error::NotFound(format!(
                        "Directory does not exist: {:?}",
                        dir
                    )));
                }
                fs::create_dir_all(dir).await?;
            }
        }
        Ok(())
    }
}

impl VolumeConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(metadata) = &self.metadata {
            if metadata.series.trim().is_empty() {
                return Err("Series name must not be empty.".to_string());
            }
        }
        if let Some(0) = self.volume_number {
            return Err("Volume number must be a positive integer.".to_string());
        }
        if let Some(stem) = &self.cover_stem {
            if stem.is_empty() {
                return Err("Cover stem must not be empty.".to_string());
            }
        }
        if let Some(prefix) = &self.extra_page_prefix {
            if prefix.is_empty() {
                return Err("Extra page prefix must not be empty.".to_string());
            }
        }
        Ok(())
    }
}

/// Stage 1 output: the classified source directory.
#[derive(Debug)]
pub struct CollectedSource<'a> {
    config: &'a VolumeConfig,
    inventory: SourceInventory,
}

impl<'a> CollectedSource<'a> {
    pub fn inventory(&self) -> &SourceInventory {
        &self.inventory
    }

    /// Stage 2: orders the parsed chapters.
    pub fn sequence(self) -> SequencedSource<'a> {
        let SourceInventory {
            chapters,
            skipped,
            cover,
            extra_pages,
        } = self.inventory;

        SequencedSource {
            config: self.config,
            chapters: sequence_chapters(chapters),
            skipped,
            cover,
            extra_pages,
        }
    }
}

/// Stage 2 output: chapters in their final order.
#[derive(Debug)]
pub struct SequencedSource<'a> {
    config: &'a VolumeConfig,
    chapters: Vec<SequencedChapter>,
    skipped: Vec<SkippedChapter>,
    cover: Option<PathBuf>,
    extra_pages: Vec<PathBuf>,
}

impl<'a> SequencedSource<'a> {
    pub fn chapters(&self) -> &[SequencedChapter] {
        &self.chapters
    }

    /// Stage 3: emits every page into the target directory.
    pub async fn flatten(self) -> Result<FlattenedVolume<'a>> {
        let config = self.config;
        config.prepare_directories().await?;

        let mut flattener = PageFlattener::new(&config.target_path, config.work_dir());
        if let Some(cover) = &self.cover {
            flattener.seed_cover(cover).await?;
        }
        flattener.seed_extra_pages(&self.extra_pages).await?;
        for chapter in &self.chapters {
            flattener.flatten_chapter(chapter).await?;
        }
        let pages = flattener.finish();

        if pages.page_count == 0 {
            warn!("Volume {} has no pages", config.volume_number);
        }

        Ok(FlattenedVolume {
            config,
            pages,
            skipped: self.skipped,
            source_cover: self.cover,
            source_extra_pages: self.extra_pages,
        })
    }
}

/// Stage 3 output: pages are final.
#[derive(Debug)]
pub struct FlattenedVolume<'a> {
    config: &'a VolumeConfig,
    pages: FlattenedPages,
    skipped: Vec<SkippedChapter>,
    source_cover: Option<PathBuf>,
    source_extra_pages: Vec<PathBuf>,
}

impl<'a> FlattenedVolume<'a> {
    pub fn page_count(&self) -> usize {
        self.pages.page_count
    }

    /// Stage 4: writes `ComicInfo.xml` with the final page count.
    pub async fn describe(self) -> Result<DescribedVolume<'a>> {
        let descriptor = VolumeDescriptor::new(
            &self.config.metadata,
            self.config.volume_number,
            self.pages.page_count,
        );
        let descriptor_path = descriptor.write_to(&self.config.target_path).await?;

        Ok(DescribedVolume {
            flattened: self,
            descriptor,
            descriptor_path,
        })
    }
}

/// Stage 4 output: the descriptor is on disk.
#[derive(Debug)]
pub struct DescribedVolume<'a> {
    flattened: FlattenedVolume<'a>,
    descriptor: VolumeDescriptor,
    descriptor_path: PathBuf,
}

impl<'a> DescribedVolume<'a> {
    pub fn descriptor(&self) -> &VolumeDescriptor {
        &self.descriptor
    }

    /// Stage 5: packs the target directory into `Volume {n}.cbz`.
    pub async fn archive(self) -> Result<ArchivedVolume<'a>> {
        let config = self.flattened.config;
        let archive = pack_directory(&config.target_path, &config.target_path, &config.title()).await?;

        Ok(ArchivedVolume {
            described: self,
            archive,
        })
    }
}

/// Stage 5 output: the volume archive exists.
#[derive(Debug)]
pub struct ArchivedVolume<'a> {
    described: DescribedVolume<'a>,
    archive: ArchiveSummary,
}

impl ArchivedVolume<'_> {
    pub fn archive(&self) -> &ArchiveSummary {
        &self.archive
    }

    /// Moves processed originals to the holding area, when one is configured,
    /// and produces the run report.
    ///
    /// Skipped chapter archives stay in the source directory.
    pub async fn hold_originals(self) -> Result<VolumeReport> {
        let flattened = &self.described.flattened;
        let config = flattened.config;

        let held = match &config.hold_path {
            Some(hold_dir) => {
                let originals: Vec<&Path> = flattened
                    .source_cover
                    .iter()
                    .chain(flattened.source_extra_pages.iter())
                    .map(PathBuf::as_path)
                    .chain(flattened.pages.chapters.iter().map(|c| c.chapter.file.path.as_path()))
                    .collect();
                let moved = move_into(&originals, hold_dir).await?;
                info!("Moved {} original(s) to '{}'", moved.len(), hold_dir.display());
                moved
            }
            None => Vec::new(),
        };

        Ok(self.into_report(held))
    }

    fn into_report(self, held: Vec<PathBuf>) -> VolumeReport {
        let DescribedVolume {
            flattened,
            descriptor,
            descriptor_path,
        } = self.described;

        let chapters = flattened
            .pages
            .chapters
            .iter()
            .map(|c| ChapterSummary {
                file_name: c.chapter.file.name.clone(),
                chapter_number: c.chapter.number.value(),
                slot: c.chapter.slot,
                display_index: c.chapter.display_index,
                page_count: c.pages.len(),
                first_page: c.first_page,
            })
            .collect();

        VolumeReport {
            volume_number: descriptor.volume,
            page_count: descriptor.page_count,
            had_cover: flattened.pages.cover.is_some(),
            extra_page_count: flattened.pages.extra_pages.len(),
            chapters,
            skipped: flattened.skipped,
            descriptor_path,
            archive_entries: self.archive.entries.len(),
            archive_path: self.archive.archive_path,
            held,
        }
    }
}
