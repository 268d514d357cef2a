//! Reference dataset for the `gazetteer` search library: record types, a JSON
//! loader, a bundled dataset asset, and deterministic test-data builders.

pub mod embedded;
pub mod loader;
pub mod records;
pub mod test_data;

/// Language tags the service knows how to serve.
///
/// Dataset records may carry localized country names for any of these tags,
/// and cache invalidation fans out across exactly this list.
pub const SUPPORTED_LANGUAGES: [&str; 37] = [
    "ar", "bg", "br", "cs", "da", "de", "el", "en", "eo", "es", "et", "eu", "fa", "fi", "fr", "hr",
    "hu", "hy", "it", "ja", "ko", "lt", "nl", "no", "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv",
    "th", "tr", "uk", "zh", "zh-tw",
];

/// Whether a (lowercase) language tag is in [`SUPPORTED_LANGUAGES`].
pub fn is_supported_language(tag: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&tag)
}

mod error {
    use std::path::PathBuf;

    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum DatasetError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),
        #[error("dataset file not found: {}", .0.display())]
        FileNotFound(PathBuf),
        #[error("dataset contains no countries")]
        Empty,
        #[error("country {0} has no English name")]
        MissingEnglishName(String),
        #[error("malformed alpha-2 country code: {0:?}")]
        InvalidCountryCode(String),
        #[error("duplicate country code: {0}")]
        DuplicateCountry(String),
    }

    pub type Result<T> = std::result::Result<T, DatasetError>;
}

pub use error::{DatasetError, Result};

// Re-export main types
pub use loader::DatasetSource;
pub use records::{CountryRecord, Dataset, DatasetStats, SubdivisionRecord};
pub use test_data::TestDataConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_languages_are_lowercase_and_unique() {
        use itertools::Itertools;

        assert!(
            SUPPORTED_LANGUAGES
                .iter()
                .all(|l| *l == l.to_lowercase().as_str()),
            "All language tags should be lowercase"
        );
        assert_eq!(
            SUPPORTED_LANGUAGES.iter().unique().count(),
            SUPPORTED_LANGUAGES.len(),
            "Language tags should be unique"
        );
    }

    #[test]
    fn english_is_supported() {
        assert!(is_supported_language("en"));
        assert!(is_supported_language("zh-tw"));
        assert!(!is_supported_language("EN"));
        assert!(!is_supported_language("tlh"));
    }
}
