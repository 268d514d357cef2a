//! Dataset asset bundled into the crate, so the library works out of the box
//! without any data files on disk.

use once_cell::sync::Lazy;

use super::records::Dataset;

static ASSET: &str = include_str!("../assets/countries.json");

static DATASET: Lazy<Dataset> = Lazy::new(|| {
    let dataset: Dataset =
        serde_json::from_str(ASSET).expect("Bundled dataset asset must be valid JSON");
    dataset
        .validate()
        .expect("Bundled dataset asset must pass validation");
    dataset
});

/// The parsed bundled dataset.
pub fn dataset() -> &'static Dataset {
    &DATASET
}

/// Provenance and size information for the bundled asset.
#[derive(Debug, Clone)]
pub struct EmbeddedMetadata {
    pub version: String,
    pub source: String,
    pub countries: usize,
    pub subdivisions: usize,
    pub size_bytes: usize,
}

pub fn metadata() -> EmbeddedMetadata {
    let stats = dataset().stats();
    EmbeddedMetadata {
        version: env!("CARGO_PKG_VERSION").to_owned(),
        source: "ISO 3166 extract".to_owned(),
        countries: stats.countries,
        subdivisions: stats.subdivisions,
        size_bytes: ASSET.len(),
    }
}
