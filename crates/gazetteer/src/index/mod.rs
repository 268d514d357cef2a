//! The flattened place index.
//!
//! The dataset stores countries with nested subdivision lists. Searching
//! wants one flat array of places with their region context already resolved,
//! so the index flattens every subdivision into a [`Place`] carrying the
//! parent region's name and code. The index is built lazily from the dataset
//! retained at construction and can be dropped and rebuilt at any time
//! without touching disk.

use std::fmt;
use std::ops::Range;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gazetteer_data::{CountryRecord, Dataset};

/// Category of a place, parsed from the dataset's free-form category string.
///
/// Unrecognized categories are preserved verbatim in [`PlaceKind::Other`] so
/// nothing in the dataset is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlaceKind {
    City,
    Governorate,
    State,
    Region,
    Province,
    Prefecture,
    District,
    Municipality,
    Department,
    Canton,
    Land,
    Country,
    AutonomousCommunity,
    Other(String),
}

impl From<String> for PlaceKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "city" => Self::City,
            "governorate" => Self::Governorate,
            "state" => Self::State,
            "region" => Self::Region,
            "province" => Self::Province,
            "prefecture" => Self::Prefecture,
            "district" => Self::District,
            "municipality" => Self::Municipality,
            "department" => Self::Department,
            "canton" => Self::Canton,
            "land" => Self::Land,
            "country" => Self::Country,
            "autonomous community" | "autonomous-community" => Self::AutonomousCommunity,
            _ => Self::Other(value),
        }
    }
}

impl From<PlaceKind> for String {
    fn from(value: PlaceKind) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City => f.write_str("city"),
            Self::Governorate => f.write_str("governorate"),
            Self::State => f.write_str("state"),
            Self::Region => f.write_str("region"),
            Self::Province => f.write_str("province"),
            Self::Prefecture => f.write_str("prefecture"),
            Self::District => f.write_str("district"),
            Self::Municipality => f.write_str("municipality"),
            Self::Department => f.write_str("department"),
            Self::Canton => f.write_str("canton"),
            Self::Land => f.write_str("land"),
            Self::Country => f.write_str("country"),
            Self::AutonomousCommunity => f.write_str("autonomous community"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// How a place's display name relates to its canonical dataset name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameTranslation {
    /// The name is the canonical (English) dataset name.
    #[default]
    Source,
    /// The name was translated into the request language.
    Translated {
        /// The canonical name the translation replaced.
        original: String,
    },
    /// Translation was requested but failed; the canonical name is shown.
    Failed,
}

impl NameTranslation {
    #[must_use]
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// The canonical name before translation, if the name was translated.
    #[must_use]
    pub fn original(&self) -> Option<&str> {
        match self {
            Self::Translated { original } => Some(original),
            Self::Source | Self::Failed => None,
        }
    }
}

/// A single searchable place, flattened out of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// Index-local identifier, assigned sequentially per build.
    pub id: u32,
    /// Display name. Canonical English unless [`Place::translation`] says
    /// otherwise.
    pub name: String,
    /// Code of the containing region, or the place's own code for top-level
    /// subdivisions.
    pub state_code: Option<String>,
    /// Name of the containing region, or the place's own name for top-level
    /// subdivisions.
    pub state_name: String,
    /// ISO 3166-1 alpha-2 code of the country.
    pub country_code: String,
    pub kind: PlaceKind,
    /// Subdivision code of the parent, when the dataset nests this place
    /// under another subdivision.
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "NameTranslation::is_source")]
    pub translation: NameTranslation,
}

impl Place {
    /// The canonical dataset name, regardless of any applied translation.
    #[must_use]
    pub fn canonical_name(&self) -> &str {
        self.translation.original().unwrap_or(&self.name)
    }
}

/// Immutable flattened view over a dataset, with per-country slices.
#[derive(Debug)]
pub struct PlaceIndex {
    places: Vec<Place>,
    by_country: HashMap<String, Range<usize>>,
}

impl PlaceIndex {
    /// Flatten a dataset into a place index.
    ///
    /// Identifiers are assigned sequentially starting at 1 and are only
    /// stable within one build. Places of one country occupy a contiguous
    /// range so country-scoped searches slice instead of filtering.
    #[must_use]
    pub fn build(dataset: &Dataset) -> Self {
        let start = Instant::now();
        let mut places = Vec::new();
        let mut by_country = HashMap::new();
        let mut next_id: u32 = 1;

        for country in &dataset.countries {
            let begin = places.len();
            flatten_country(country, &mut places, &mut next_id);
            by_country.insert(country.alpha2.clone(), begin..places.len());
        }

        info!(
            places = places.len(),
            countries = by_country.len(),
            elapsed = ?start.elapsed(),
            "Built place index"
        );
        Self { places, by_country }
    }

    #[must_use]
    pub fn all_places(&self) -> &[Place] {
        &self.places
    }

    /// Places of one country, keyed by canonical alpha-2 code.
    #[must_use]
    pub fn places_for_country(&self, alpha2: &str) -> Option<&[Place]> {
        self.by_country.get(alpha2).map(|range| &self.places[range.clone()])
    }
}

fn flatten_country(country: &CountryRecord, places: &mut Vec<Place>, next_id: &mut u32) {
    // Resolve parent codes to names in one pass so flattening stays linear.
    let region_names: HashMap<&str, &str> = country
        .subdivisions
        .iter()
        .filter_map(|s| s.code.as_deref().map(|code| (code, s.name.as_str())))
        .collect();

    for sub in &country.subdivisions {
        let parent_name = sub
            .parent
            .as_deref()
            .and_then(|code| region_names.get(code).map(|name| (code, *name)));
        let (state_code, state_name) = match parent_name {
            Some((code, name)) => (Some(code.to_owned()), name.to_owned()),
            // Top-level subdivisions (and orphans with a dangling parent
            // code) are their own region.
            None => (sub.code.clone(), sub.name.clone()),
        };

        places.push(Place {
            id: *next_id,
            name: sub.name.clone(),
            state_code,
            state_name,
            country_code: country.alpha2.clone(),
            kind: PlaceKind::from(sub.category.clone()),
            parent: sub.parent.clone(),
            translation: NameTranslation::Source,
        });
        *next_id += 1;
    }
}

/// Shared handle over the lazily built index and the dataset behind it.
///
/// The dataset is loaded once at construction and retained, so invalidating
/// the index never touches disk; the next search simply re-flattens.
#[derive(Debug)]
pub struct IndexHandle {
    dataset: Arc<Dataset>,
    index: RwLock<Option<Arc<PlaceIndex>>>,
}

impl IndexHandle {
    #[must_use]
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset, index: RwLock::new(None) }
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The current index, building it first if no build is live.
    pub fn get_or_build(&self) -> Arc<PlaceIndex> {
        if let Some(index) = self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(index);
        }

        let mut guard = self.index.write().unwrap_or_else(PoisonError::into_inner);
        // A concurrent build may have won the write lock first.
        if let Some(index) = guard.as_ref() {
            return Arc::clone(index);
        }
        let built = Arc::new(PlaceIndex::build(&self.dataset));
        *guard = Some(Arc::clone(&built));
        built
    }

    /// Drop the current build. In-flight searches keep their `Arc` and finish
    /// on the old view.
    pub fn invalidate(&self) {
        let mut guard = self.index.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!("Dropped place index, next search rebuilds");
        }
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazetteer_data::test_data;

    fn index() -> PlaceIndex {
        PlaceIndex::build(&test_data::dataset(&test_data::TestDataConfig::default()))
    }

    #[test]
    fn test_flatten_assigns_sequential_ids() {
        let index = index();
        assert!(!index.all_places().is_empty());
        for (offset, place) in index.all_places().iter().enumerate() {
            assert_eq!(place.id as usize, offset + 1);
        }
    }

    #[test]
    fn test_flatten_resolves_parent_region() {
        let index = index();
        let tripoli = index
            .all_places()
            .iter()
            .find(|p| p.name == "Tripoli")
            .expect("Should flatten Tripoli");
        assert_eq!(tripoli.country_code, "LB");
        assert_eq!(tripoli.state_code.as_deref(), Some("AS"));
        assert_eq!(tripoli.state_name, "North");
        assert_eq!(tripoli.kind, PlaceKind::City);
        assert_eq!(tripoli.parent.as_deref(), Some("AS"));
    }

    #[test]
    fn test_top_level_subdivision_is_its_own_region() {
        let index = index();
        let beirut = index
            .all_places()
            .iter()
            .find(|p| p.name == "Beirut")
            .expect("Should flatten the Beirut governorate");
        assert_eq!(beirut.state_code.as_deref(), Some("BA"));
        assert_eq!(beirut.state_name, "Beirut");
        assert_eq!(beirut.kind, PlaceKind::Governorate);
        assert!(beirut.parent.is_none());
    }

    #[test]
    fn test_country_slices_are_contiguous() {
        let index = index();
        let lb = index.places_for_country("LB").expect("Should have LB places");
        assert!(lb.iter().all(|p| p.country_code == "LB"));
        assert!(index.places_for_country("ZZ").is_none());

        let total: usize = ["LB", "US", "FR", "DE"]
            .iter()
            .filter_map(|cc| index.places_for_country(cc))
            .map(<[Place]>::len)
            .sum();
        assert_eq!(total, index.all_places().len());
    }

    #[test]
    fn test_place_kind_round_trip() {
        for raw in ["city", "Governorate", "autonomous community", "oblast"] {
            let kind = PlaceKind::from(raw.to_owned());
            let back = String::from(kind.clone());
            assert_eq!(PlaceKind::from(back), kind);
        }
        assert_eq!(PlaceKind::from("oblast".to_owned()), PlaceKind::Other("oblast".to_owned()));
    }

    #[test]
    fn test_name_translation_serde_shape() {
        let translated = NameTranslation::Translated { original: "Beirut".to_owned() };
        let json = serde_json::to_string(&translated).expect("Should serialize");
        assert!(json.contains("translated"));
        let back: NameTranslation = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back.original(), Some("Beirut"));

        assert!(NameTranslation::default().is_source());
    }

    #[test]
    fn test_handle_builds_lazily_and_invalidate_drops() {
        let dataset = Arc::new(test_data::dataset(&test_data::TestDataConfig::default()));
        let handle = IndexHandle::new(dataset);
        assert!(!handle.is_built());

        let first = handle.get_or_build();
        assert!(handle.is_built());
        let second = handle.get_or_build();
        assert!(Arc::ptr_eq(&first, &second), "repeat calls should share one build");

        handle.invalidate();
        assert!(!handle.is_built());
        let rebuilt = handle.get_or_build();
        assert!(!Arc::ptr_eq(&first, &rebuilt), "invalidate should force a fresh build");
        assert_eq!(first.all_places().len(), rebuilt.all_places().len());
    }
}
