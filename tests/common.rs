//! Common test utilities for the Tankobon crate.
//!
//! Provides unique per-test directories, dummy JPEG pages, chapter archive
//! fixtures and helpers for inspecting the produced volume.

use image::{Rgb, RgbImage};
use rand::{Rng, distributions::Alphanumeric};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tankobon::error::Result;
use tokio::fs;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";
#[allow(dead_code)]
pub const LONG_TEST_TIMEOUT: Duration = Duration::from_secs(120);

#[allow(dead_code)]
pub struct TestDirs {
    pub test_dir: PathBuf,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub work_dir: PathBuf,
}

/// Creates a fresh `tests/tmp/<name>-<random>` tree with `source/` only.
/// `target/` and `work/` are left for the pipeline to create.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let test_dir = PathBuf::from(TEST_TMP_DIR).join(format!("{}-{}", sub_path, rand_string));
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).await.unwrap();
    }
    let source_dir = test_dir.join("source");
    fs::create_dir_all(&source_dir).await.unwrap();

    TestDirs {
        target_dir: test_dir.join("target"),
        work_dir: test_dir.join("work"),
        source_dir,
        test_dir,
    }
}

/// Encodes a small solid-color JPEG.
#[allow(dead_code)]
pub fn dummy_jpeg(color: Rgb<u8>) -> Vec<u8> {
    let img = RgbImage::from_pixel(16, 16, color);
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Jpeg).unwrap();
    bytes.into_inner()
}

/// A distinguishable JPEG per index, so pages can be told apart by bytes.
#[allow(dead_code)]
pub fn numbered_jpeg(n: u8) -> Vec<u8> {
    dummy_jpeg(Rgb([n.wrapping_mul(37), n.wrapping_mul(91), n]))
}

/// Writes a dummy JPEG file at `path`.
#[allow(dead_code)]
pub async fn create_dummy_image(path: &Path, color: Rgb<u8>) -> Result<Vec<u8>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let bytes = dummy_jpeg(color);
    fs::write(path, &bytes).await?;
    Ok(bytes)
}

/// Writes a CBZ at `path` with the given `(entry name, bytes)` pairs.
#[allow(dead_code)]
pub fn create_chapter_archive(path: &Path, entries: &[(&str, Vec<u8>)]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut zip = ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default())?;
        zip.write_all(bytes)?;
    }
    zip.finish()?;
    Ok(())
}

/// Writes a chapter archive holding `pages` distinct JPEGs named
/// `p01.jpg`, `p02.jpg`, ... Returns the page bytes in order.
#[allow(dead_code)]
pub fn create_simple_chapter(dir: &Path, name: &str, pages: u8, seed: u8) -> Result<Vec<Vec<u8>>> {
    let images: Vec<Vec<u8>> = (0..pages).map(|i| numbered_jpeg(seed.wrapping_add(i))).collect();
    let names: Vec<String> = (1..=pages).map(|i| format!("p{:02}.jpg", i)).collect();
    let entries: Vec<(&str, Vec<u8>)> = names
        .iter()
        .map(String::as_str)
        .zip(images.iter().cloned())
        .collect();
    create_chapter_archive(&dir.join(name), &entries)?;
    Ok(images)
}

/// Sorted names of `NNN.jpg` files directly inside `dir`.
#[allow(dead_code)]
pub fn list_page_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.ends_with(".jpg"))
        .collect();
    names.sort();
    names
}

/// `["001.jpg", ..., "NNN.jpg"]`
#[allow(dead_code)]
pub fn expected_pages(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{:03}.jpg", n)).collect()
}

/// Entry names of a ZIP archive, in stored order.
#[allow(dead_code)]
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Reads one entry of a ZIP archive.
#[allow(dead_code)]
pub fn read_zip_entry(path: &Path, name: &str) -> Vec<u8> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}
