//! `ComicInfo.xml` descriptor for an assembled volume.
//!
//! The document has a fixed schema: Title, Series, Volume, PageCount and an
//! optional Writer. Writer is left out entirely when no writer is known.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::info;
use quick_xml::escape::escape;
use regex::{Captures, Regex};
use tokio::fs;

use crate::error::{Error, Result};
use crate::types::VolumeMetadata;

/// File name of the descriptor inside the volume.
pub const DESCRIPTOR_FILE_NAME: &str = "ComicInfo.xml";

const TEMPLATE: &str = include_str!("../templates/ComicInfo.xml");

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"%(title|series|volume|pagecount|writer)%").unwrap();
}

/// Metadata describing one finished volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeDescriptor {
    pub title: String,
    pub series: String,
    pub volume: u32,
    pub page_count: usize,
    pub writer: Option<String>,
}

impl VolumeDescriptor {
    /// Builds the descriptor for volume `volume` of a series.
    ///
    /// The title is always `"Volume {volume}"`. A blank writer counts as none.
    pub fn new(metadata: &VolumeMetadata, volume: u32, page_count: usize) -> Self {
        Self {
            title: format!("Volume {}", volume),
            series: metadata.series.clone(),
            volume,
            page_count,
            writer: metadata
                .writer
                .as_ref()
                .filter(|w| !w.trim().is_empty())
                .cloned(),
        }
    }

    /// Renders the descriptor document.
    pub fn to_xml(&self) -> String {
        let writer = self
            .writer
            .as_deref()
            .map(|w| format!("  <Writer>{}</Writer>\n", escape(w)))
            .unwrap_or_default();

        // Single pass: substituted text is never scanned for placeholders again.
        PLACEHOLDER_REGEX
            .replace_all(TEMPLATE, |caps: &Captures| match &caps[1] {
                "title" => escape(self.title.as_str()).into_owned(),
                "series" => escape(self.series.as_str()).into_owned(),
                "volume" => self.volume.to_string(),
                "pagecount" => self.page_count.to_string(),
                _ => writer.clone(),
            })
            .into_owned()
    }

    /// Writes `ComicInfo.xml` into `directory`, replacing any existing file.
    pub async fn write_to(&self, directory: &Path) -> Result<PathBuf> {
        let path = directory.join(DESCRIPTOR_FILE_NAME);
        fs::write(&path, self.to_xml()).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write '{}': {}", path.display(), e),
            ))
        })?;

        info!(
            "Wrote {} ({} pages, volume {})",
            DESCRIPTOR_FILE_NAME, self.page_count, self.volume
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(writer: Option<&str>) -> VolumeMetadata {
        VolumeMetadata {
            series: "Blame!".to_string(),
            writer: writer.map(str::to_string),
        }
    }

    #[test]
    fn test_fixed_fields() {
        let xml = VolumeDescriptor::new(&metadata(None), 3, 187).to_xml();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<Title>Volume 3</Title>"));
        assert!(xml.contains("<Series>Blame!</Series>"));
        assert!(xml.contains("<Volume>3</Volume>"));
        assert!(xml.contains("<PageCount>187</PageCount>"));
        assert!(xml.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
        assert!(xml.trim_end().ends_with("</ComicInfo>"));
    }

    #[test]
    fn test_writer_is_omitted_when_absent() {
        let xml = VolumeDescriptor::new(&metadata(None), 1, 6).to_xml();
        assert!(!xml.contains("Writer"));

        let xml = VolumeDescriptor::new(&metadata(Some("  ")), 1, 6).to_xml();
        assert!(!xml.contains("Writer"));
    }

    #[test]
    fn test_writer_is_emitted_when_present() {
        let xml = VolumeDescriptor::new(&metadata(Some("Tsutomu Nihei")), 1, 6).to_xml();
        assert!(xml.contains("  <Writer>Tsutomu Nihei</Writer>\n</ComicInfo>"));
    }

    #[test]
    fn test_placeholder_text_in_values_is_kept_literally() {
        let meta = VolumeMetadata {
            series: "Ranking %pagecount% %writer%".to_string(),
            writer: Some("W %title%".to_string()),
        };
        let xml = VolumeDescriptor::new(&meta, 1, 6).to_xml();
        assert!(xml.contains("<Series>Ranking %pagecount% %writer%</Series>"));
        assert!(xml.contains("<Writer>W %title%</Writer>"));
        assert_eq!(xml.matches("<Writer>").count(), 1);
        assert!(xml.contains("<PageCount>6</PageCount>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let meta = VolumeMetadata {
            series: "Tom & Jerry <Remix>".to_string(),
            writer: Some("O'Neil".to_string()),
        };
        let xml = VolumeDescriptor::new(&meta, 2, 10).to_xml();
        assert!(xml.contains("<Series>Tom &amp; Jerry &lt;Remix&gt;</Series>"));
        assert!(xml.contains("<Writer>O&apos;Neil</Writer>"));
    }
}
