// ABOUTME: Exercise catalog loading and lookup tables built once at startup
// ABOUTME: CatalogIndex maps exercise names to immutable attribute records and info types
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Exercise Catalog
//!
//! The catalog is a static JSON resource read once at process start and
//! shared read-only for the process lifetime. [`CatalogIndex`] keeps two
//! views over it: name → full [`ExerciseRecord`] and name → info-type tag.
//! Nothing here is mutated after load; request-scoped narrowing happens in
//! the resolver, never against the index itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::BodyPart;

/// Tool tag for exercises requiring no equipment
pub const TOOL_BODYWEIGHT: &str = "Bodyweight";

/// Category placeholder used for unclassified records; ignored by the
/// category de-duplication pass
pub const UNCATEGORIZED: &str = "(Uncategorized)";

/// One immutable catalog record, keyed by its unique display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRecord {
    /// Unique exercise name (the catalog key)
    pub name: String,
    /// Localized/human-readable display name; falls back to `name`
    #[serde(default)]
    pub display_name: Option<String>,
    /// Body part tag
    pub body_part: BodyPart,
    /// Equipment tag (e.g. `Barbell`, `Machine`, `Bodyweight`)
    pub tool: String,
    /// Muscle-group category used for same-day de-duplication
    #[serde(default)]
    pub category: Option<String>,
    /// Whether this is a primary/compound lift
    #[serde(default)]
    pub main_lift: bool,
    /// Muscle-engagement score (sum over engaged muscle groups)
    #[serde(default)]
    pub engagement: i64,
    /// Info-type tag for display integrations
    #[serde(default)]
    pub info_type: Option<String>,
}

impl ExerciseRecord {
    /// Display name, falling back to the catalog key
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Category, treating the `(Uncategorized)` placeholder as absent
    #[must_use]
    pub fn effective_category(&self) -> Option<&str> {
        match self.category.as_deref() {
            Some(UNCATEGORIZED) | None => None,
            Some(cat) => Some(cat),
        }
    }

    /// Whether the exercise uses no equipment
    #[must_use]
    pub fn is_bodyweight(&self) -> bool {
        self.tool.eq_ignore_ascii_case(TOOL_BODYWEIGHT)
    }
}

/// Immutable lookup index over the loaded catalog
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    records: HashMap<String, ExerciseRecord>,
    // Preserves file order so enumeration-building stays deterministic
    // before any explicit shuffle.
    order: Vec<String>,
}

impl CatalogIndex {
    /// Build an index from already-parsed records
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_ERROR` if the record list is empty or contains a
    /// duplicate name.
    pub fn from_records(records: Vec<ExerciseRecord>) -> AppResult<Self> {
        if records.is_empty() {
            return Err(AppError::config("Exercise catalog is empty"));
        }

        let mut map = HashMap::with_capacity(records.len());
        let mut order = Vec::with_capacity(records.len());
        for record in records {
            order.push(record.name.clone());
            if map.insert(record.name.clone(), record).is_some() {
                let dup = order.last().map(String::as_str).unwrap_or_default();
                return Err(AppError::config(format!(
                    "Duplicate exercise name in catalog: {dup}"
                )));
            }
        }

        Ok(Self {
            records: map,
            order,
        })
    }

    /// Load the catalog from a JSON file (an array of records)
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_ERROR` if the file cannot be read or parsed, or if
    /// the catalog is empty.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!(
                "Failed to read exercise catalog at {}: {e}",
                path.display()
            ))
        })?;
        let records: Vec<ExerciseRecord> = serde_json::from_str(&raw).map_err(|e| {
            AppError::config(format!(
                "Failed to parse exercise catalog at {}: {e}",
                path.display()
            ))
        })?;

        let index = Self::from_records(records)?;
        info!(
            exercises = index.len(),
            path = %path.display(),
            "Loaded exercise catalog"
        );
        Ok(index)
    }

    /// Look up a record by exercise name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExerciseRecord> {
        self.records.get(name)
    }

    /// Look up the info-type tag for an exercise
    #[must_use]
    pub fn info_type(&self, name: &str) -> Option<&str> {
        self.records.get(name)?.info_type.as_deref()
    }

    /// Whether the catalog contains the name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Iterate records in catalog file order
    pub fn iter(&self) -> impl Iterator<Item = &ExerciseRecord> {
        self.order.iter().filter_map(|name| self.records.get(name))
    }

    /// All exercise names in catalog file order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Names of primary lifts for a body part, in catalog order
    #[must_use]
    pub fn main_lifts_for(&self, body_part: BodyPart) -> Vec<&ExerciseRecord> {
        self.iter()
            .filter(|r| r.body_part == body_part && r.main_lift)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, body_part: BodyPart, main_lift: bool) -> ExerciseRecord {
        ExerciseRecord {
            name: name.to_owned(),
            display_name: None,
            body_part,
            tool: "Barbell".to_owned(),
            category: Some("Press".to_owned()),
            main_lift,
            engagement: 10,
            info_type: None,
        }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(CatalogIndex::from_records(vec![]).is_err());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let records = vec![
            record("Bench Press", BodyPart::Chest, true),
            record("Bench Press", BodyPart::Chest, false),
        ];
        assert!(CatalogIndex::from_records(records).is_err());
    }

    #[test]
    fn test_lookup_and_order() {
        let records = vec![
            record("Squat", BodyPart::Leg, true),
            record("Leg Extension", BodyPart::Leg, false),
            record("Bench Press", BodyPart::Chest, true),
        ];
        let index = CatalogIndex::from_records(records).unwrap();

        assert_eq!(index.len(), 3);
        assert!(index.get("Squat").unwrap().main_lift);
        assert_eq!(
            index.names(),
            vec!["Squat", "Leg Extension", "Bench Press"]
        );
        let leg_mains: Vec<&str> = index
            .main_lifts_for(BodyPart::Leg)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(leg_mains, vec!["Squat"]);
    }

    #[test]
    fn test_uncategorized_is_absent() {
        let mut rec = record("Mystery", BodyPart::Etc, false);
        rec.category = Some(UNCATEGORIZED.to_owned());
        assert!(rec.effective_category().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let json = serde_json::json!([
            {
                "name": "Plank",
                "body_part": "ABS",
                "tool": "Bodyweight",
                "category": "Isometric Hold",
                "main_lift": false,
                "engagement": 6
            }
        ]);
        std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

        let index = CatalogIndex::load(&path).unwrap();
        assert!(index.get("Plank").unwrap().is_bodyweight());
        assert!(index.info_type("Plank").is_none());
    }
}
