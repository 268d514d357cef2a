//! Raw dataset records as they appear in the JSON document.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{DatasetError, Result};

/// One subdivision row of a country.
///
/// Top-level subdivisions (governorates, states, regions) usually carry an
/// ISO 3166-2 suffix in `code`; second-level rows (districts, cities) point
/// at their first-level parent via `parent` and may have no code of their
/// own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdivisionRecord {
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    /// Subdivision category as named by the dataset ("governorate",
    /// "state", "city", ...).
    pub category: String,
    /// Code of the first-level subdivision this row belongs to, if any.
    #[serde(default)]
    pub parent: Option<String>,
}

impl SubdivisionRecord {
    pub fn new(
        code: Option<&str>,
        name: &str,
        category: &str,
        parent: Option<&str>,
    ) -> Self {
        Self {
            code: code.map(str::to_owned),
            name: name.to_owned(),
            category: category.to_owned(),
            parent: parent.map(str::to_owned),
        }
    }
}

/// One country with its localized names and subdivision rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// ISO 3166-1 numeric identifier.
    pub id: u32,
    pub alpha2: String,
    pub alpha3: String,
    /// Localized country names keyed by lowercase language tag. Always
    /// contains `"en"` after validation.
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub subdivisions: Vec<SubdivisionRecord>,
}

impl CountryRecord {
    /// English name of the country.
    pub fn name(&self) -> &str {
        self.names.get("en").map_or(self.alpha2.as_str(), String::as_str)
    }

    /// Localized name for a language tag, if the dataset carries one.
    pub fn localized_name(&self, language: &str) -> Option<&str> {
        self.names.get(language).map(String::as_str)
    }

    /// Whether `code` identifies this country by alpha-2, alpha-3 or ISO
    /// numeric id. Case-insensitive.
    pub fn matches_code(&self, code: &str) -> bool {
        let code = code.trim();
        if code.eq_ignore_ascii_case(&self.alpha2) || code.eq_ignore_ascii_case(&self.alpha3) {
            return true;
        }
        code.parse::<u32>().is_ok_and(|id| id == self.id)
    }
}

/// The whole reference dataset: an immutable list of countries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub countries: Vec<CountryRecord>,
}

/// Row counts for logging and `info()`-style reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetStats {
    pub countries: usize,
    pub subdivisions: usize,
    /// Distinct language tags across all name tables.
    pub languages: usize,
}

impl Dataset {
    pub fn new(countries: Vec<CountryRecord>) -> Self {
        Self { countries }
    }

    /// Find a country by alpha-2, alpha-3 or numeric id.
    pub fn find_country(&self, code: &str) -> Option<&CountryRecord> {
        self.countries.iter().find(|c| c.matches_code(code))
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            countries: self.countries.len(),
            subdivisions: self.countries.iter().map(|c| c.subdivisions.len()).sum(),
            languages: self
                .countries
                .iter()
                .flat_map(|c| c.names.keys())
                .unique()
                .count(),
        }
    }

    /// Structural checks every load path runs before the dataset is used.
    pub fn validate(&self) -> Result<()> {
        if self.countries.is_empty() {
            return Err(DatasetError::Empty);
        }
        for country in &self.countries {
            if country.alpha2.len() != 2
                || !country.alpha2.chars().all(|c| c.is_ascii_uppercase())
            {
                return Err(DatasetError::InvalidCountryCode(country.alpha2.clone()));
            }
            if !country.names.contains_key("en") {
                return Err(DatasetError::MissingEnglishName(country.alpha2.clone()));
            }
        }
        if let Some(dup) = self
            .countries
            .iter()
            .map(|c| c.alpha2.as_str())
            .duplicates()
            .next()
        {
            return Err(DatasetError::DuplicateCountry(dup.to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lebanon() -> CountryRecord {
        CountryRecord {
            id: 422,
            alpha2: "LB".into(),
            alpha3: "LBN".into(),
            names: BTreeMap::from([
                ("en".to_owned(), "Lebanon".to_owned()),
                ("fr".to_owned(), "Liban".to_owned()),
            ]),
            subdivisions: vec![
                SubdivisionRecord::new(Some("BA"), "Beirut", "governorate", None),
                SubdivisionRecord::new(None, "Tripoli", "city", Some("AS")),
            ],
        }
    }

    #[test]
    fn country_code_matching() {
        let lb = lebanon();
        assert!(lb.matches_code("LB"));
        assert!(lb.matches_code("lb"));
        assert!(lb.matches_code("LBN"));
        assert!(lb.matches_code("422"));
        assert!(!lb.matches_code("FR"));
        assert!(!lb.matches_code("423"));
    }

    #[test]
    fn localized_names() {
        let lb = lebanon();
        assert_eq!(lb.name(), "Lebanon");
        assert_eq!(lb.localized_name("fr"), Some("Liban"));
        assert_eq!(lb.localized_name("ja"), None);
    }

    #[test]
    fn validation_accepts_well_formed_dataset() {
        let dataset = Dataset::new(vec![lebanon()]);
        dataset.validate().expect("Should validate");
        let stats = dataset.stats();
        assert_eq!(stats.countries, 1);
        assert_eq!(stats.subdivisions, 2);
        assert_eq!(stats.languages, 2);
    }

    #[test]
    fn validation_rejects_empty_dataset() {
        let err = Dataset::default().validate().unwrap_err();
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn validation_rejects_missing_english_name() {
        let mut country = lebanon();
        country.names.remove("en");
        let err = Dataset::new(vec![country]).validate().unwrap_err();
        assert!(matches!(err, DatasetError::MissingEnglishName(code) if code == "LB"));
    }

    #[test]
    fn validation_rejects_malformed_alpha2() {
        let mut country = lebanon();
        country.alpha2 = "lbn".into();
        let err = Dataset::new(vec![country]).validate().unwrap_err();
        assert!(matches!(err, DatasetError::InvalidCountryCode(_)));
    }

    #[test]
    fn validation_rejects_duplicate_countries() {
        let err = Dataset::new(vec![lebanon(), lebanon()])
            .validate()
            .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateCountry(code) if code == "LB"));
    }

    #[test]
    fn records_round_trip_through_json() {
        let dataset = Dataset::new(vec![lebanon()]);
        let json = serde_json::to_string(&dataset).expect("Should serialize");
        let back: Dataset = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back, dataset);
    }
}
