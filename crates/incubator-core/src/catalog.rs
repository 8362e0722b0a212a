//! Species catalog.
//!
//! The catalog is a JSON array of species with their ideal incubation
//! parameters:
//!
//! ```json
//! [
//!   {"nome": "Galinha", "dias": 21, "temp_min": 37.5, "temp_max": 38.0, "umid_min": 55, "umid_max": 65}
//! ]
//! ```
//!
//! It is read once and never modified at runtime.

use std::path::Path;

use tracing::{debug, warn};

use incubator_types::Species;

use crate::error::CatalogUnavailable;

/// Load every valid species from `path`, in file order.
///
/// Entries that fail [`Species::validate`] are skipped with a warning.
pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Species>, CatalogUnavailable> {
    let path = path.as_ref();
    let unavailable = |reason: String| CatalogUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    let entries: Vec<Species> =
        serde_json::from_str(&contents).map_err(|e| unavailable(e.to_string()))?;

    let total = entries.len();
    let species: Vec<Species> = entries
        .into_iter()
        .filter(|s| match s.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping species '{}' in catalog: {}", s.name, e);
                false
            }
        })
        .collect();

    debug!(
        "Loaded {} of {} species from {}",
        species.len(),
        total,
        path.display()
    );
    Ok(species)
}

/// An in-memory species catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    species: Vec<Species>,
}

impl Catalog {
    /// Build a catalog from an already-loaded list.
    pub fn new(species: Vec<Species>) -> Self {
        Self { species }
    }

    /// Load the catalog at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogUnavailable> {
        load_all(path).map(Self::new)
    }

    /// Load the catalog at `path`, falling back to an empty catalog.
    ///
    /// A missing or unparseable file is logged at `warn` level; the caller
    /// still gets a usable (empty) catalog.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("{}; continuing with an empty catalog", e);
                Self::default()
            }
        }
    }

    /// Look up a species by exact name. The first entry with that name wins.
    pub fn find_by_name(&self, name: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.name == name)
    }

    /// All species in catalog order.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG: &str = r#"[
        {"nome": "Galinha", "dias": 21, "temp_min": 37.5, "temp_max": 38.0, "umid_min": 55, "umid_max": 65},
        {"nome": "Codorna", "dias": 17, "temp_min": 37.5, "temp_max": 37.8, "umid_min": 45, "umid_max": 55},
        {"nome": "Galinha", "dias": 99, "temp_min": 30.0, "temp_max": 31.0, "umid_min": 10, "umid_max": 20}
    ]"#;

    fn write_catalog(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_all_preserves_order() {
        let file = write_catalog(CATALOG);
        let species = load_all(file.path()).unwrap();

        let names: Vec<_> = species.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Galinha", "Codorna", "Galinha"]);
    }

    #[test]
    fn test_find_by_name_first_match_wins() {
        let file = write_catalog(CATALOG);
        let catalog = Catalog::load(file.path()).unwrap();

        let hen = catalog.find_by_name("Galinha").unwrap();
        assert_eq!(hen.incubation_days, 21);
    }

    #[test]
    fn test_find_by_name_is_exact() {
        let file = write_catalog(CATALOG);
        let catalog = Catalog::load(file.path()).unwrap();

        assert!(catalog.find_by_name("galinha").is_none());
        assert!(catalog.find_by_name("Galinha ").is_none());
        assert!(catalog.find_by_name("Pata").is_none());
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_all(dir.path().join("aves.json")).unwrap_err();
        assert!(err.path.ends_with("aves.json"));
    }

    #[test]
    fn test_malformed_file_is_unavailable() {
        let file = write_catalog("{ not json");
        assert!(load_all(file.path()).is_err());
    }

    #[test]
    fn test_load_or_empty_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::load_or_empty(dir.path().join("aves.json"));
        assert!(catalog.is_empty());
        assert!(catalog.find_by_name("Galinha").is_none());
    }

    #[test]
    fn test_invalid_species_are_skipped() {
        let file = write_catalog(
            r#"[
                {"nome": "Invertida", "dias": 21, "temp_min": 39.0, "temp_max": 37.0, "umid_min": 55, "umid_max": 65},
                {"nome": "Zero", "dias": 0, "temp_min": 37.0, "temp_max": 38.0, "umid_min": 55, "umid_max": 65},
                {"nome": "Pata", "dias": 28, "temp_min": 37.2, "temp_max": 37.5, "umid_min": 55, "umid_max": 75}
            ]"#,
        );
        let catalog = Catalog::load(file.path()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.species()[0].name, "Pata");
    }
}
