// ABOUTME: Shared test fixtures for integration tests
// ABOUTME: Provides a small exercise catalog, an allowed-name table, and profile builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared test fixtures for `routine_forge`
//!
//! A compact gym: enough exercises per body part to exercise every filter,
//! coverage rule, and repair pass without scanning a production catalog.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use routine_forge::allowed::AllowedNameTable;
use routine_forge::catalog::{CatalogIndex, ExerciseRecord};
use routine_forge::models::{
    BodyPart, ExercisePair, Gender, Intensity, RoutineDay, RoutinePolicy, TrainingLevel,
    UserProfile,
};

/// Seeded RNG so shuffles and replacement picks are reproducible
pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn rec(
    name: &str,
    body_part: BodyPart,
    tool: &str,
    category: &str,
    main_lift: bool,
    engagement: i64,
) -> ExerciseRecord {
    ExerciseRecord {
        name: name.to_owned(),
        display_name: None,
        body_part,
        tool: tool.to_owned(),
        category: Some(category.to_owned()),
        main_lift,
        engagement,
        info_type: None,
    }
}

/// The fixture gym catalog
pub fn fixture_catalog() -> CatalogIndex {
    let records = vec![
        // Chest
        rec("Bench Press", BodyPart::Chest, "Barbell", "Horizontal Press", true, 14),
        rec("Machine Chest Press", BodyPart::Chest, "Machine", "Horizontal Press", true, 11),
        rec("Push Up", BodyPart::Chest, "Bodyweight", "Horizontal Press", false, 8),
        rec("Incline Dumbbell Press", BodyPart::Chest, "Dumbbell", "Incline Press", false, 10),
        rec("Cable Fly", BodyPart::Chest, "Cable", "Fly", false, 7),
        // Back
        rec("Deadlift", BodyPart::Back, "Barbell", "Hip Hinge", true, 16),
        rec("Barbell Row", BodyPart::Back, "Barbell", "Horizontal Pull", true, 12),
        rec("Lat Pulldown", BodyPart::Back, "Machine", "Vertical Pull", false, 9),
        rec("Pull Up", BodyPart::Back, "PullUpBar", "Vertical Pull", true, 11),
        rec("Seated Cable Row", BodyPart::Back, "Cable", "Horizontal Pull", false, 8),
        // Shoulder
        rec("Overhead Press", BodyPart::Shoulder, "Barbell", "Vertical Press", true, 12),
        rec("Machine Shoulder Press", BodyPart::Shoulder, "Machine", "Vertical Press", true, 9),
        rec("Lateral Raise", BodyPart::Shoulder, "Dumbbell", "Lateral Raise", false, 6),
        rec("Face Pull", BodyPart::Shoulder, "Cable", "Rear Delt", false, 6),
        // Leg
        rec("Squat", BodyPart::Leg, "Barbell", "Squat", true, 16),
        rec("Leg Press", BodyPart::Leg, "Machine", "Squat", true, 12),
        rec("Romanian Deadlift", BodyPart::Leg, "Barbell", "Hip Hinge", false, 11),
        rec("Leg Extension", BodyPart::Leg, "Machine", "Knee Extension", false, 6),
        rec("Bodyweight Lunge", BodyPart::Leg, "Bodyweight", "Lunge", false, 7),
        // Arm
        rec("Barbell Curl", BodyPart::Arm, "Barbell", "Elbow Flexion", false, 5),
        rec("Cable Pushdown", BodyPart::Arm, "Cable", "Elbow Extension", false, 5),
        rec("Dumbbell Curl", BodyPart::Arm, "Dumbbell", "Elbow Flexion", false, 5),
        rec("Hammer Curl", BodyPart::Arm, "Dumbbell", "Elbow Flexion", false, 5),
        // Abs
        rec("Plank", BodyPart::Abs, "Bodyweight", "Isometric Hold", false, 6),
        rec("Crunch", BodyPart::Abs, "Bodyweight", "Trunk Flexion", false, 5),
        rec("Hanging Leg Raise", BodyPart::Abs, "PullUpBar", "Hip Flexion", false, 7),
        rec("Cable Crunch", BodyPart::Abs, "Cable", "Trunk Flexion", false, 6),
    ];
    CatalogIndex::from_records(records).unwrap()
}

/// The fixture allowed-name table, covering frequencies 2, 3, and 5
pub fn fixture_table() -> AllowedNameTable {
    serde_json::from_value(json!({
        "by_frequency": {
            "2": {
                "UPPER": [
                    "Bench Press", "Machine Chest Press", "Push Up",
                    "Incline Dumbbell Press", "Cable Fly", "Deadlift",
                    "Barbell Row", "Lat Pulldown", "Pull Up", "Seated Cable Row",
                    "Overhead Press", "Machine Shoulder Press", "Lateral Raise",
                    "Barbell Curl", "Dumbbell Curl"
                ],
                "LOWER": [
                    "Squat", "Leg Press", "Romanian Deadlift", "Leg Extension",
                    "Bodyweight Lunge", "Plank", "Crunch", "Cable Crunch"
                ]
            },
            "3": {
                "PUSH": [
                    "Bench Press", "Machine Chest Press", "Push Up",
                    "Incline Dumbbell Press", "Cable Fly", "Overhead Press",
                    "Machine Shoulder Press", "Lateral Raise", "Cable Pushdown"
                ],
                "PULL": [
                    "Deadlift", "Barbell Row", "Lat Pulldown", "Pull Up",
                    "Seated Cable Row", "Face Pull", "Barbell Curl", "Dumbbell Curl"
                ],
                "LEGS": [
                    "Squat", "Leg Press", "Romanian Deadlift", "Leg Extension",
                    "Bodyweight Lunge", "Plank", "Cable Crunch"
                ]
            },
            "5": {
                "CHEST": [
                    "Bench Press", "Machine Chest Press", "Push Up",
                    "Incline Dumbbell Press", "Cable Fly"
                ],
                "BACK": [
                    "Deadlift", "Barbell Row", "Lat Pulldown", "Pull Up",
                    "Seated Cable Row"
                ],
                "LEGS": [
                    "Squat", "Leg Press", "Romanian Deadlift", "Leg Extension",
                    "Bodyweight Lunge"
                ],
                "SHOULDERS": [
                    "Overhead Press", "Machine Shoulder Press", "Lateral Raise",
                    "Face Pull"
                ],
                "ARM+ABS": [
                    "Barbell Curl", "Cable Pushdown", "Dumbbell Curl", "Hammer Curl",
                    "Plank", "Crunch", "Hanging Leg Raise", "Cable Crunch"
                ]
            }
        },
        "body_parts": {
            "CHEST": [
                "Bench Press", "Machine Chest Press", "Push Up",
                "Incline Dumbbell Press", "Cable Fly"
            ],
            "BACK": [
                "Deadlift", "Barbell Row", "Lat Pulldown", "Pull Up",
                "Seated Cable Row"
            ],
            "SHOULDER": [
                "Overhead Press", "Machine Shoulder Press", "Lateral Raise",
                "Face Pull"
            ],
            "LEG": [
                "Squat", "Leg Press", "Romanian Deadlift", "Leg Extension",
                "Bodyweight Lunge"
            ],
            "ARM": ["Barbell Curl", "Cable Pushdown", "Dumbbell Curl", "Hammer Curl"],
            "ABS": ["Plank", "Crunch", "Hanging Leg Raise", "Cable Crunch"]
        },
        "tools": {
            "PullUpBar": ["Pull Up", "Hanging Leg Raise"]
        },
        "entry_tiers": {
            "MBeginner": [
                "Machine Chest Press", "Push Up", "Lat Pulldown", "Seated Cable Row",
                "Machine Shoulder Press", "Lateral Raise", "Leg Press", "Leg Extension",
                "Bodyweight Lunge", "Dumbbell Curl", "Plank", "Crunch"
            ],
            "FNovice": ["Leg Press", "Leg Extension", "Lat Pulldown"]
        }
    }))
    .unwrap()
}

/// Profile builder with fixture defaults (male, 80 kg, 60 minutes, no
/// equipment, both policy flags on)
pub fn profile(frequency: u8, split_id: &str, level: TrainingLevel) -> UserProfile {
    UserProfile {
        gender: Gender::Male,
        weight_kg: 80.0,
        level,
        frequency,
        duration_min: 60,
        intensity: Intensity::Normal,
        split_id: split_id.to_owned(),
        equipment: vec![],
        policy: RoutinePolicy::default(),
    }
}

/// Build a routine day from `(body_part, name)` tuples
pub fn day(pairs: &[(&str, &str)]) -> RoutineDay {
    pairs
        .iter()
        .map(|(body_part, name)| ExercisePair::new(*body_part, *name))
        .collect()
}
