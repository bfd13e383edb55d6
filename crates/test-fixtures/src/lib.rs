//! Test fixture loader for Strata: seeded organizations and golden routing cases.
//!
//! Fixture files live under this crate's `data/` directory, so every crate in
//! the workspace resolves them the same way.

pub mod organization;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub use organization::{load_organization, OrganizationFixture, SeededOrganization};

/// Root directory of the fixture data.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// List all JSON files in a fixture subdirectory, sorted by file name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                Some(path)
            } else {
                None
            }
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_root_exists() {
        assert!(fixtures_root().exists(), "fixture data directory not found");
    }

    #[test]
    fn organization_files_exist() {
        for f in ["organizations/acme.json", "organizations/diamond.json"] {
            assert!(fixture_exists(f), "Missing fixture: {}", f);
        }
    }

    #[test]
    fn golden_routing_cases_parse() {
        let files = list_fixtures("golden/routing");
        assert!(!files.is_empty());
        for file in &files {
            let content = std::fs::read_to_string(file)
                .unwrap_or_else(|e| panic!("Failed to read {}: {}", file.display(), e));
            let value: serde_json::Value = serde_json::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", file.display(), e));
            assert!(value.get("entity").is_some(), "{} has no entity", file.display());
            assert!(value.get("expected").is_some(), "{} has no expectation", file.display());
        }
    }

    #[test]
    fn acme_relations_reference_declared_streams() {
        let org = load_organization("acme");
        for rel in &org.relations {
            assert!(org.streams.iter().any(|s| s.id == rel.parent), "unknown parent {}", rel.parent);
            assert!(org.streams.iter().any(|s| s.id == rel.child), "unknown child {}", rel.child);
        }
    }
}
