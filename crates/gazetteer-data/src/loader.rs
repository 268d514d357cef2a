//! Dataset loading. The dataset is read exactly once at startup and treated
//! as immutable afterwards.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use tracing::info;

use super::{Result, embedded, records::Dataset};

/// Where the reference dataset comes from.
#[derive(Debug, Clone, Default)]
pub enum DatasetSource {
    /// The asset bundled into the crate.
    #[default]
    Embedded,
    /// A caller-supplied JSON file in the same document shape.
    Path(PathBuf),
}

impl DatasetSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

impl Dataset {
    /// Load and validate a dataset from the given source.
    pub fn load(source: &DatasetSource) -> Result<Self> {
        match source {
            DatasetSource::Embedded => {
                let dataset = embedded::dataset().clone();
                info!(
                    countries = dataset.countries.len(),
                    "Loaded embedded dataset"
                );
                Ok(dataset)
            }
            DatasetSource::Path(path) => Self::from_path(path),
        }
    }

    /// Load and validate a dataset from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(super::DatasetError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            countries = dataset.countries.len(),
            "Loaded dataset from file"
        );
        Ok(dataset)
    }

    /// Parse and validate a dataset from any JSON reader.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let dataset: Self = serde_json::from_reader(reader)?;
        dataset.validate()?;
        Ok(dataset)
    }
}
