//! Deterministic fixture datasets for tests and examples.

use std::collections::BTreeMap;

use tempfile::NamedTempFile;
use tracing::info;

use super::{
    Result,
    records::{CountryRecord, Dataset, SubdivisionRecord},
};

/// Configuration for fixture dataset generation.
#[derive(Debug, Clone)]
pub struct TestDataConfig {
    /// How many fixture countries to include (taken from a fixed list,
    /// Lebanon first).
    pub countries: usize,
    /// Whether to keep non-English name tables.
    pub localized_names: bool,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self {
            countries: 4,
            localized_names: true,
        }
    }
}

impl TestDataConfig {
    /// Minimal data for unit tests.
    pub fn minimal() -> Self {
        Self {
            countries: 2,
            localized_names: false,
        }
    }

    /// Full fixture set for integration tests.
    pub fn sample() -> Self {
        Self {
            countries: 6,
            localized_names: true,
        }
    }
}

/// Build a fixture dataset in memory.
pub fn dataset(config: &TestDataConfig) -> Dataset {
    info!("Creating test dataset with config: {config:?}");

    let mut countries = vec![
        lebanon(),
        united_states(),
        france(),
        germany(),
        japan(),
        spain(),
    ];
    countries.truncate(config.countries.max(1));
    if !config.localized_names {
        for country in &mut countries {
            country.names.retain(|lang, _| lang == "en");
        }
    }
    Dataset::new(countries)
}

/// Write a fixture dataset to a temporary JSON file, for exercising the
/// file-based loader.
pub fn create_dataset_file(config: &TestDataConfig) -> Result<NamedTempFile> {
    let file = NamedTempFile::new()?;
    serde_json::to_writer_pretty(&file, &dataset(config))?;
    file.as_file().sync_all()?;
    Ok(file)
}

fn names(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(lang, name)| ((*lang).to_owned(), (*name).to_owned()))
        .collect()
}

fn lebanon() -> CountryRecord {
    CountryRecord {
        id: 422,
        alpha2: "LB".into(),
        alpha3: "LBN".into(),
        names: names(&[("en", "Lebanon"), ("ar", "لبنان"), ("fr", "Liban")]),
        subdivisions: vec![
            SubdivisionRecord::new(Some("BA"), "Beirut", "governorate", None),
            SubdivisionRecord::new(Some("AS"), "North", "governorate", None),
            SubdivisionRecord::new(Some("JA"), "South", "governorate", None),
            SubdivisionRecord::new(Some("JL"), "Mount Lebanon", "governorate", None),
            SubdivisionRecord::new(None, "Tripoli", "city", Some("AS")),
            SubdivisionRecord::new(None, "Sidon", "city", Some("JA")),
            SubdivisionRecord::new(None, "Tyre", "city", Some("JA")),
            SubdivisionRecord::new(None, "Jounieh", "city", Some("JL")),
        ],
    }
}

fn united_states() -> CountryRecord {
    CountryRecord {
        id: 840,
        alpha2: "US".into(),
        alpha3: "USA".into(),
        names: names(&[
            ("en", "United States"),
            ("es", "Estados Unidos"),
            ("fr", "États-Unis"),
        ]),
        subdivisions: vec![
            SubdivisionRecord::new(Some("NY"), "New York", "state", None),
            SubdivisionRecord::new(Some("CA"), "California", "state", None),
            SubdivisionRecord::new(Some("IL"), "Illinois", "state", None),
            SubdivisionRecord::new(None, "New York City", "city", Some("NY")),
            SubdivisionRecord::new(None, "Los Angeles", "city", Some("CA")),
            SubdivisionRecord::new(None, "Chicago", "city", Some("IL")),
        ],
    }
}

fn france() -> CountryRecord {
    CountryRecord {
        id: 250,
        alpha2: "FR".into(),
        alpha3: "FRA".into(),
        names: names(&[("en", "France"), ("de", "Frankreich"), ("fr", "France")]),
        subdivisions: vec![
            SubdivisionRecord::new(Some("IDF"), "Île-de-France", "region", None),
            SubdivisionRecord::new(Some("ARA"), "Auvergne-Rhône-Alpes", "region", None),
            SubdivisionRecord::new(Some("PAC"), "Provence-Alpes-Côte d'Azur", "region", None),
            SubdivisionRecord::new(None, "Paris", "city", Some("IDF")),
            SubdivisionRecord::new(None, "Lyon", "city", Some("ARA")),
            SubdivisionRecord::new(None, "Marseille", "city", Some("PAC")),
        ],
    }
}

fn germany() -> CountryRecord {
    CountryRecord {
        id: 276,
        alpha2: "DE".into(),
        alpha3: "DEU".into(),
        names: names(&[("en", "Germany"), ("de", "Deutschland"), ("fr", "Allemagne")]),
        subdivisions: vec![
            SubdivisionRecord::new(Some("BE"), "Berlin", "land", None),
            SubdivisionRecord::new(Some("BY"), "Bavaria", "land", None),
            SubdivisionRecord::new(None, "Munich", "city", Some("BY")),
        ],
    }
}

fn japan() -> CountryRecord {
    CountryRecord {
        id: 392,
        alpha2: "JP".into(),
        alpha3: "JPN".into(),
        names: names(&[("en", "Japan"), ("ja", "日本"), ("fr", "Japon")]),
        subdivisions: vec![
            SubdivisionRecord::new(Some("13"), "Tokyo", "prefecture", None),
            SubdivisionRecord::new(Some("27"), "Osaka", "prefecture", None),
        ],
    }
}

fn spain() -> CountryRecord {
    CountryRecord {
        id: 724,
        alpha2: "ES".into(),
        alpha3: "ESP".into(),
        names: names(&[("en", "Spain"), ("es", "España"), ("fr", "Espagne")]),
        subdivisions: vec![
            SubdivisionRecord::new(Some("MD"), "Madrid", "autonomous community", None),
            SubdivisionRecord::new(Some("CT"), "Catalonia", "autonomous community", None),
            SubdivisionRecord::new(None, "Barcelona", "city", Some("CT")),
        ],
    }
}
