//! Path utilities shared by the collector, flattener and archiver.
//!
//! File-name classification is case-insensitive throughout, and all
//! conversions from `OsStr` fall back to lossy UTF-8 rather than failing.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{Error, Result};

/// Extensions accepted as page images.
const JPEG_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Extension of chapter and volume archives.
pub const ARCHIVE_EXTENSION: &str = "cbz";

/// Gets the file name from a path with fallback to lossy conversion.
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Checks if a filename starts with a dot (hidden file).
pub fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// True for `.jpg` / `.jpeg` files, in any letter case.
pub fn is_jpeg(path: &Path) -> bool {
    has_extension_in(path, &JPEG_EXTENSIONS)
}

/// True for `.cbz` files, in any letter case.
pub fn is_chapter_archive(path: &Path) -> bool {
    has_extension_in(path, &[ARCHIVE_EXTENSION])
}

/// Builds a ZIP entry name from a path relative to the archive root.
///
/// Components are joined with `/` regardless of platform.
pub fn zip_entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        Error::InvalidPath(
            path.to_path_buf(),
            format!("Not inside archive root {:?}", root),
        )
    })?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Moves a file, falling back to copy-and-delete when a rename is not
/// possible (e.g. across filesystems). An existing destination is replaced.
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    fs::copy(from, to).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to move '{}' to '{}': {}", from.display(), to.display(), e),
        ))
    })?;
    fs::remove_file(from).await?;
    Ok(())
}

/// Moves `files` into `directory`, keeping their file names.
///
/// Returns the new locations in input order.
pub async fn move_into(files: &[&Path], directory: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(directory).await?;

    let mut moved = Vec::with_capacity(files.len());
    for file in files {
        let Some(name) = file.file_name() else {
            return Err(Error::InvalidPath(
                file.to_path_buf(),
                "Path has no file name".to_string(),
            ));
        };
        let destination = directory.join(name);
        move_file(file, &destination).await?;
        moved.push(destination);
    }
    Ok(moved)
}
