//! Persisted series settings (`config.xml`).
//!
//! ```xml
//! <config>
//!   <series_name>Blame!</series_name>
//!   <writer_name>Tsutomu Nihei</writer_name>
//! </config>
//! ```
//!
//! `writer_name` may be empty or missing; both load as no writer.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Error, Result};
use crate::types::VolumeMetadata;

/// Default location of the settings file, relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "config.xml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "config")]
pub struct SeriesConfig {
    pub series_name: String,
    #[serde(default)]
    pub writer_name: String,
}

impl SeriesConfig {
    pub fn new(series_name: impl Into<String>, writer_name: Option<String>) -> Self {
        Self {
            series_name: series_name.into(),
            writer_name: writer_name.unwrap_or_default(),
        }
    }

    /// Loads settings from `path`.
    ///
    /// A missing file is [`Error::MissingConfig`]; an empty series name is
    /// [`Error::InvalidConfig`].
    pub async fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingConfig(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let config: SeriesConfig = quick_xml::de::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes settings to `path`, replacing any existing file.
    pub async fn save(&self, path: &Path) -> Result<PathBuf> {
        self.validate()?;
        let xml = quick_xml::se::to_string(self)?;
        fs::write(path, xml).await?;
        info!("Configuration saved to '{}'", path.display());
        Ok(path.to_path_buf())
    }

    fn validate(&self) -> Result<()> {
        if self.series_name.trim().is_empty() {
            return Err(Error::InvalidConfig("series name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn writer(&self) -> Option<&str> {
        let writer = self.writer_name.trim();
        (!writer.is_empty()).then_some(writer)
    }

    pub fn to_metadata(&self) -> VolumeMetadata {
        VolumeMetadata::new(self.series_name.trim(), self.writer().map(str::to_string))
    }
}
