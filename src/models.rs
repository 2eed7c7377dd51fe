// ABOUTME: Core domain models for routine generation - profiles, routines, and shared enums
// ABOUTME: Typed records with explicit defaults replace ad hoc map lookups at every seam
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Domain Models
//!
//! Shared data structures used across the resolver, schema compiler, and
//! repairer:
//!
//! - [`UserProfile`] — the per-request user description (gender, level,
//!   frequency, equipment, policy flags)
//! - [`ExercisePair`] — one `(body part, exercise name)` slot; serialized on
//!   the wire as a two-element JSON array so a generator cannot emit an
//!   internally inconsistent pair
//! - [`Routine`] — an ordered week of days, each day an ordered list of pairs
//! - [`EnrichedExercise`] / [`RoutineResponse`] — the display-ready output
//!   joined from the catalog after repair
//!
//! All request-scoped structures are plain owned values; nothing here is
//! shared or mutated across requests.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

// ============================================================================
// Shared enums
// ============================================================================

/// User gender, used to select entry-tier exercise whitelists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    /// Male
    #[serde(rename = "M")]
    Male,
    /// Female
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Single-letter key used in whitelist names (`MBeginner`, `FNovice`, ...)
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

/// Training level as an ordinal five-tier scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrainingLevel {
    /// First months of training
    Beginner,
    /// Comfortable with basic movements
    Novice,
    /// Consistent training history
    Intermediate,
    /// Multiple years of structured training
    Advanced,
    /// Competitive-level strength
    Elite,
}

impl TrainingLevel {
    /// Whether this level uses the restricted entry-tier whitelists
    #[must_use]
    pub const fn is_entry_tier(&self) -> bool {
        matches!(self, Self::Beginner | Self::Novice)
    }

    /// String form matching catalog and table keys
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Novice => "Novice",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Elite => "Elite",
        }
    }
}

impl fmt::Display for TrainingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner" => Ok(Self::Beginner),
            "Novice" => Ok(Self::Novice),
            "Intermediate" => Ok(Self::Intermediate),
            "Advanced" => Ok(Self::Advanced),
            "Elite" => Ok(Self::Elite),
            other => Err(AppError::invalid_input(format!(
                "Unknown training level: {other}"
            ))),
        }
    }
}

/// Session intensity preference (passed through to prompt assembly; not used
/// by the resolver or repairer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intensity {
    /// Lighter loads, longer rests
    Low,
    /// Default intensity
    Normal,
    /// Heavier loads, shorter rests
    High,
}

impl Default for Intensity {
    fn default() -> Self {
        Self::Normal
    }
}

/// Body part tag attached to every catalog record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    /// Chest movements
    Chest,
    /// Back movements
    Back,
    /// Shoulder movements
    Shoulder,
    /// Lower-body movements
    Leg,
    /// Biceps/triceps/forearm accessories
    Arm,
    /// Core work (the equipment-free category)
    #[serde(rename = "ABS")]
    Abs,
    /// Conditioning work
    Cardio,
    /// Anything unclassified
    Etc,
}

impl BodyPart {
    /// Display form matching catalog data
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chest => "Chest",
            Self::Back => "Back",
            Self::Shoulder => "Shoulder",
            Self::Leg => "Leg",
            Self::Arm => "Arm",
            Self::Abs => "ABS",
            Self::Cardio => "Cardio",
            Self::Etc => "Etc",
        }
    }

    /// Parse a body part label, tolerating a trailing `" (main)"` marker that
    /// some generators copy from the prompt catalog
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        let clean = label.replace(" (main)", "");
        match clean.trim() {
            "Chest" | "CHEST" => Self::Chest,
            "Back" | "BACK" => Self::Back,
            "Shoulder" | "SHOULDER" | "Shoulders" | "SHOULDERS" => Self::Shoulder,
            "Leg" | "LEG" | "Legs" | "LEGS" => Self::Leg,
            "Arm" | "ARM" | "Arms" | "ARMS" => Self::Arm,
            "ABS" | "Abs" => Self::Abs,
            "Cardio" | "CARDIO" => Self::Cardio,
            _ => Self::Etc,
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// User profile
// ============================================================================

/// Policy flags controlling which repair passes run
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoutinePolicy {
    /// No exercise name may repeat across the whole week
    pub prevent_weekly_duplicates: bool,
    /// No two exercises on the same day may share a muscle-group category
    pub prevent_category_duplicates: bool,
}

impl Default for RoutinePolicy {
    fn default() -> Self {
        Self {
            prevent_weekly_duplicates: true,
            prevent_category_duplicates: true,
        }
    }
}

/// Per-request user description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Gender, used for entry-tier whitelist selection
    pub gender: Gender,
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Training level tier
    pub level: TrainingLevel,
    /// Weekly training frequency (2-5 sessions)
    pub frequency: u8,
    /// Session duration in minutes
    pub duration_min: u32,
    /// Intensity preference
    #[serde(default)]
    pub intensity: Intensity,
    /// Chosen split identifier (e.g. `SPLIT`, `FB`)
    pub split_id: String,
    /// Owned equipment tags (e.g. `Barbell`, `Machine`, `PullUpBar`);
    /// empty means no equipment filtering
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Duplicate-prevention policy flags
    #[serde(default)]
    pub policy: RoutinePolicy,
}

impl UserProfile {
    /// Validate the frequency range accepted by the split catalog
    ///
    /// # Errors
    ///
    /// Returns an `INVALID_INPUT` error if the frequency is outside 2-5.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(2..=5).contains(&self.frequency) {
            return Err(AppError::new(
                crate::errors::ErrorCode::ValueOutOfRange,
                format!("Weekly frequency must be 2-5, got {}", self.frequency),
            ));
        }
        Ok(())
    }

    /// Owned equipment as a lowercase lookup set
    #[must_use]
    pub fn equipment_set(&self) -> std::collections::HashSet<String> {
        self.equipment.iter().map(|t| t.to_lowercase()).collect()
    }
}

// ============================================================================
// Routine structures
// ============================================================================

/// One `(body part, exercise name)` slot of a day
///
/// Wire format is a two-element array `["Chest", "Bench Press"]`, matching
/// the pair enumerations in the compiled schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExercisePair {
    /// Body part label for the slot
    pub body_part: String,
    /// Exercise display name (the catalog key)
    pub name: String,
}

impl ExercisePair {
    /// Construct a pair
    pub fn new(body_part: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            body_part: body_part.into(),
            name: name.into(),
        }
    }
}

impl Serialize for ExercisePair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.body_part)?;
        tup.serialize_element(&self.name)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for ExercisePair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairVisitor;

        impl<'de> Visitor<'de> for PairVisitor {
            type Value = ExercisePair;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a [body_part, exercise_name] pair")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let body_part: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let name: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                // Tolerate trailing junk rather than failing the whole week
                while seq.next_element::<serde_json::Value>()?.is_some() {}
                Ok(ExercisePair { body_part, name })
            }
        }

        deserializer.deserialize_seq(PairVisitor)
    }
}

/// One training day: an ordered list of exercise pairs
pub type RoutineDay = Vec<ExercisePair>;

/// A weekly routine as produced by the generator and consumed by the repairer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    /// Ordered training days, one per split-day tag
    pub days: Vec<RoutineDay>,
}

impl Routine {
    /// All exercise names in the week, in day/slot order
    #[must_use]
    pub fn all_names(&self) -> Vec<&str> {
        self.days
            .iter()
            .flat_map(|day| day.iter().map(|p| p.name.as_str()))
            .collect()
    }
}

// ============================================================================
// Enriched output
// ============================================================================

/// One exercise slot joined with catalog display metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedExercise {
    /// Catalog key name
    pub name: String,
    /// Human-readable display name
    pub display_name: String,
    /// Body part label from the routine slot
    pub body_part: String,
    /// Muscle-group category, if classified
    pub category: Option<String>,
    /// Whether this is a primary/compound lift
    pub main_lift: bool,
    /// Muscle-engagement score
    pub engagement: i64,
    /// Equipment tag
    pub tool: String,
    /// Catalog info-type tag, if present
    pub info_type: Option<String>,
}

/// Final response handed to the surrounding request handler
#[derive(Debug, Clone, Serialize)]
pub struct RoutineResponse {
    /// Display-ready routine days
    pub days: Vec<Vec<EnrichedExercise>>,
    /// The raw (pre-repair) routine as parsed from the generator
    pub raw: Routine,
    /// Structured repair outcomes for observability and testing
    pub repairs: crate::repair::RepairReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_wire_format() {
        let pair = ExercisePair::new("Chest", "Bench Press");
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"["Chest","Bench Press"]"#);

        let back: ExercisePair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair);
    }

    #[test]
    fn test_pair_rejects_short_array() {
        let result: Result<ExercisePair, _> = serde_json::from_str(r#"["Chest"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_body_part_lenient_parse() {
        assert_eq!(BodyPart::parse_lenient("Chest (main)"), BodyPart::Chest);
        assert_eq!(BodyPart::parse_lenient("LEGS"), BodyPart::Leg);
        assert_eq!(BodyPart::parse_lenient("mystery"), BodyPart::Etc);
    }

    #[test]
    fn test_level_ordering() {
        assert!(TrainingLevel::Beginner < TrainingLevel::Intermediate);
        assert!(TrainingLevel::Novice.is_entry_tier());
        assert!(!TrainingLevel::Elite.is_entry_tier());
    }

    #[test]
    fn test_profile_frequency_validation() {
        let mut profile = UserProfile {
            gender: Gender::Male,
            weight_kg: 80.0,
            level: TrainingLevel::Intermediate,
            frequency: 3,
            duration_min: 60,
            intensity: Intensity::Normal,
            split_id: "SPLIT".into(),
            equipment: vec![],
            policy: RoutinePolicy::default(),
        };
        assert!(profile.validate().is_ok());
        profile.frequency = 6;
        assert!(profile.validate().is_err());
    }
}
