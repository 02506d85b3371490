use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::path_utils::{ARCHIVE_EXTENSION, zip_entry_name};
use async_trait::async_trait;
use log::{debug, info};
use memmap2::MmapOptions;
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A generator for CBZ (Comic Book ZIP) volume archives.
pub struct Cbz {
    zip: Option<ZipWriter<File>>,
    options: SimpleFileOptions,
    output_path: PathBuf,
    entry_count: usize,
}

/// What [`pack_directory`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub archive_path: PathBuf,
    pub entries: Vec<String>,
}

#[async_trait]
impl Generator for Cbz {
    fn new(output_dir: &Path, base_filename: &str) -> Result<Self> {
        let options: SimpleFileOptions = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir)?;
        }

        let output_path = output_dir.join(format!("{}.{}", base_filename, ARCHIVE_EXTENSION));
        let file = File::create(&output_path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create archive '{}': {}", output_path.display(), e),
            ))
        })?;

        Ok(Cbz {
            zip: Some(ZipWriter::new(file)),
            options,
            output_path,
            entry_count: 0,
        })
    }

    fn output_path(&self) -> &Path {
        &self.output_path
    }

    async fn add_file(&mut self, file_path: &Path, entry_name: &str) -> Result<&mut Self> {
        let file = File::open(file_path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open '{}': {}", file_path.display(), e),
            ))
        })?;
        let empty = file.metadata()?.len() == 0;

        let zip = match self.zip.as_mut() {
            Some(z) => z,
            None => {
                return Err(Error::Other("Zip writer not available".to_string()));
            }
        };

        zip.start_file(entry_name, self.options)?;

        // Zero-length files cannot be mapped.
        if !empty {
            let mmap = spawn_blocking(move || unsafe { MmapOptions::new().map(&file) })
                .await??;
            zip.write_all(&mmap[..])?;
        }

        self.entry_count += 1;
        debug!("Archived '{}'", entry_name);
        Ok(self)
    }

    async fn save(mut self) -> Result<usize> {
        let zip = match self.zip.take() {
            Some(z) => z,
            None => {
                return Err(Error::Other("Zip writer not available".to_string()));
            }
        };

        spawn_blocking(move || zip.finish().map_err(Error::Zip))
            .await??;

        Ok(self.entry_count)
    }
}

/// Lists every file below `root` except `exclude`, as `(path, entry name)`
/// pairs sorted by entry name.
pub fn collect_entries(root: &Path, exclude: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| {
            Error::Io(std::io::Error::other(format!(
                "Failed to read '{}': {}",
                root.display(),
                e
            )))
        })?;
        if !entry.file_type().is_file() || entry.path() == exclude {
            continue;
        }
        let name = zip_entry_name(root, entry.path())?;
        entries.push((entry.into_path(), name));
    }

    entries.par_sort_by(|a, b| a.1.cmp(&b.1));
    Ok(entries)
}

/// Packs the whole tree under `source_dir` into `<archive_dir>/<base_filename>.cbz`.
///
/// Entries keep their path relative to `source_dir` and are written in
/// lexicographic order. When the archive lives inside `source_dir` it is
/// left out of its own contents. An existing archive at that path is
/// overwritten.
pub async fn pack_directory(
    source_dir: &Path,
    archive_dir: &Path,
    base_filename: &str,
) -> Result<ArchiveSummary> {
    let mut generator = Cbz::new(archive_dir, base_filename)?;
    let archive_path = generator.output_path().to_path_buf();

    let root = source_dir.to_path_buf();
    let exclude = archive_path.clone();
    let entries = spawn_blocking(move || collect_entries(&root, &exclude))
        .await??;

    for (path, name) in &entries {
        generator.add_file(path, name).await?;
    }
    let written = generator.save().await?;

    info!("Packed {} file(s) into '{}'", written, archive_path.display());
    Ok(ArchiveSummary {
        archive_path,
        entries: entries.into_iter().map(|(_, name)| name).collect(),
    })
}
