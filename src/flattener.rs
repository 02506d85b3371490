//! Page flattening: one continuous, zero-padded page sequence per volume.
//!
//! A [`PageFlattener`] owns the [`PageSequence`] for a single run. Pages are
//! emitted in this order:
//! 1. the cover, copied to `001.jpg` (optional)
//! 2. supplementary pages, copied in file-name order (optional)
//! 3. every chapter in sequencer order, each extracted to
//!    `<work>/Chapter {display_index}` and its JPEG entries moved out in
//!    lexicographic order of their path inside the archive
//!
//! Non-image entries stay behind in the chapter's working folder, and working
//! folders are never removed here. A chapter archive that is not a readable
//! ZIP aborts the run with [`Error::InvalidArchive`]; pages already emitted
//! stay where they are.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;
use tokio::fs;
use tokio::task::spawn_blocking;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::collector::is_page_image;
use crate::error::{Error, Result};
use crate::path_utils::{get_file_name_lossy, move_file, zip_entry_name};
use crate::types::SequencedChapter;

/// Extension used for every emitted page, whatever the source spelling.
pub const PAGE_EXTENSION: &str = "jpg";

/// Run-scoped page counter. Starts at 1 and only moves forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSequence {
    next: usize,
}

impl Default for PageSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// The number the next emitted page will get.
    pub fn peek(&self) -> usize {
        self.next
    }

    /// Claims the current number and moves the counter forward.
    pub fn advance(&mut self) -> usize {
        let current = self.next;
        self.next += 1;
        current
    }

    /// Pages emitted so far.
    pub fn emitted(&self) -> usize {
        self.next - 1
    }

    /// `001.jpg`, `002.jpg`, ... Numbers past 999 simply grow wider.
    pub fn file_name(number: usize) -> String {
        format!("{:03}.{}", number, PAGE_EXTENSION)
    }
}

/// Pages emitted for one chapter.
#[derive(Debug, Clone)]
pub struct ChapterPages {
    pub chapter: SequencedChapter,
    pub work_folder: PathBuf,
    pub pages: Vec<PathBuf>,
    pub first_page: Option<usize>,
}

/// Final state of a flattening run.
#[derive(Debug, Clone)]
pub struct FlattenedPages {
    pub page_count: usize,
    pub cover: Option<PathBuf>,
    pub extra_pages: Vec<PathBuf>,
    pub chapters: Vec<ChapterPages>,
}

/// Renumbers cover, extra and chapter pages into a flat output directory.
#[derive(Debug)]
pub struct PageFlattener<'a> {
    output_dir: &'a Path,
    work_dir: &'a Path,
    sequence: PageSequence,
    cover: Option<PathBuf>,
    extra_pages: Vec<PathBuf>,
    chapters: Vec<ChapterPages>,
}

impl<'a> PageFlattener<'a> {
    /// Both directories must already exist.
    pub fn new(output_dir: &'a Path, work_dir: &'a Path) -> Self {
        Self {
            output_dir,
            work_dir,
            sequence: PageSequence::new(),
            cover: None,
            extra_pages: Vec::new(),
            chapters: Vec::new(),
        }
    }

    pub fn sequence(&self) -> &PageSequence {
        &self.sequence
    }

    fn next_page_path(&mut self) -> (usize, PathBuf) {
        let number = self.sequence.advance();
        (number, self.output_dir.join(PageSequence::file_name(number)))
    }

    /// Copies the cover to page `001`. Must run before any other page.
    pub async fn seed_cover(&mut self, cover: &Path) -> Result<PathBuf> {
        if self.sequence.emitted() > 0 {
            return Err(Error::Other(format!(
                "Cover '{}' must be the first page, but {} page(s) were already emitted",
                cover.display(),
                self.sequence.emitted()
            )));
        }

        let (_, destination) = self.next_page_path();
        fs::copy(cover, &destination).await?;
        info!("Cover '{}' -> '{}'", get_file_name_lossy(cover), get_file_name_lossy(&destination));

        self.cover = Some(destination.clone());
        Ok(destination)
    }

    /// Copies supplementary pages, in the given order, after the cover.
    pub async fn seed_extra_pages(&mut self, pages: &[PathBuf]) -> Result<usize> {
        for page in pages {
            let (_, destination) = self.next_page_path();
            fs::copy(page, &destination).await?;
            debug!("Extra page '{}' -> '{}'", get_file_name_lossy(page), get_file_name_lossy(&destination));
            self.extra_pages.push(destination);
        }
        if !pages.is_empty() {
            info!("Added {} supplementary page(s)", pages.len());
        }
        Ok(pages.len())
    }

    /// Extracts one chapter and moves its images into the page sequence.
    ///
    /// Returns the number of pages the chapter contributed.
    pub async fn flatten_chapter(&mut self, chapter: &SequencedChapter) -> Result<usize> {
        let work_folder = self.work_dir.join(chapter.folder_name());
        fs::create_dir_all(&work_folder).await?;

        extract_archive(&chapter.file.path, &work_folder).await?;
        let images = list_images(&work_folder).await?;

        let mut pages = Vec::with_capacity(images.len());
        let mut first_page = None;
        for image in images {
            let (number, destination) = self.next_page_path();
            first_page.get_or_insert(number);
            move_file(&image, &destination).await?;
            debug!("'{}' -> '{}'", image.display(), destination.display());
            pages.push(destination);
        }

        info!(
            "Chapter {} ('{}'): {} page(s)",
            chapter.display_index,
            chapter.file.name,
            pages.len()
        );

        let page_count = pages.len();
        self.chapters.push(ChapterPages {
            chapter: chapter.clone(),
            work_folder,
            pages,
            first_page,
        });
        Ok(page_count)
    }

    pub fn finish(self) -> FlattenedPages {
        FlattenedPages {
            page_count: self.sequence.emitted(),
            cover: self.cover,
            extra_pages: self.extra_pages,
            chapters: self.chapters,
        }
    }
}

/// Unpacks a chapter archive into `destination`.
pub async fn extract_archive(archive: &Path, destination: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let destination = destination.to_path_buf();

    spawn_blocking(move || -> Result<()> {
        let file = File::open(&archive)?;
        let mut zip =
            ZipArchive::new(file).map_err(|e| Error::InvalidArchive(archive.clone(), e))?;
        zip.extract(&destination)
            .map_err(|e| Error::InvalidArchive(archive.clone(), e))?;
        Ok(())
    })
    .await?
}

/// Lists JPEG files below `folder`, sorted byte-wise by their `/`-joined
/// path relative to it (`scan.jpg` before `scan/c.jpg`).
pub async fn list_images(folder: &Path) -> Result<Vec<PathBuf>> {
    let folder = folder.to_path_buf();

    spawn_blocking(move || -> Result<Vec<PathBuf>> {
        let mut images = Vec::new();
        for entry in WalkDir::new(&folder).min_depth(1) {
            let entry = entry.map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "Failed to list '{}': {}",
                    folder.display(),
                    e
                )))
            })?;
            if entry.file_type().is_file() && is_page_image(entry.path()) {
                let name = zip_entry_name(&folder, entry.path())?;
                images.push((name, entry.into_path()));
            }
        }
        images.par_sort_by(|a, b| a.0.cmp(&b.0));
        Ok(images.into_iter().map(|(_, path)| path).collect())
    })
    .await?
}
