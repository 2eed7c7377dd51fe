// ABOUTME: Split catalog, per-day coverage rules, and the level/duration exercise-count table
// ABOUTME: Maps weekly frequency and split id to an ordered day-tag sequence
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Split Configuration
//!
//! A split is an ordered sequence of day tags selected by weekly frequency
//! and a split identifier. Two families exist per frequency: a body-part
//! split (`SPLIT`) and a full-body cycle (`FB`). Day tags drive three things
//! downstream:
//!
//! - which allowed-name pool the compiler enumerates (`day_pool`)
//! - which coverage rules apply (full-body days must open with main Leg,
//!   Chest, and Back lifts; the 3-day `PUSH` day must contain main Chest and
//!   Shoulder lifts)
//! - which repair passes the day participates in

use crate::errors::{AppError, AppResult};
use crate::models::{BodyPart, TrainingLevel};

/// Day-tag prefix identifying full-body days (`FULLBODY_A`, `FULLBODY_B`, ...)
pub const FULLBODY_PREFIX: &str = "FULLBODY";

/// Day tag for the combined arm and abs day in the 5-day split
pub const ARM_ABS_TAG: &str = "ARM+ABS";

/// One selectable weekly split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    /// Split identifier (`SPLIT` or `FB`)
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Ordered day tags, one per weekly session
    pub days: &'static [&'static str],
}

/// Available splits for a weekly frequency
#[must_use]
pub fn split_options(frequency: u8) -> &'static [SplitConfig] {
    match frequency {
        2 => &[
            SplitConfig {
                id: "SPLIT",
                name: "Upper/Lower",
                days: &["UPPER", "LOWER"],
            },
            SplitConfig {
                id: "FB",
                name: "Full Body",
                days: &["FULLBODY_A", "FULLBODY_B"],
            },
        ],
        3 => &[
            SplitConfig {
                id: "SPLIT",
                name: "Push/Pull/Legs",
                days: &["PUSH", "PULL", "LEGS"],
            },
            SplitConfig {
                id: "FB",
                name: "Full Body",
                days: &["FULLBODY_A", "FULLBODY_B", "FULLBODY_C"],
            },
        ],
        4 => &[
            SplitConfig {
                id: "SPLIT",
                name: "4-Day Split",
                days: &["CHEST", "BACK", "SHOULDERS", "LEGS"],
            },
            SplitConfig {
                id: "FB",
                name: "Full Body",
                days: &["FULLBODY_A", "FULLBODY_B", "FULLBODY_C", "FULLBODY_D"],
            },
        ],
        5 => &[
            SplitConfig {
                id: "SPLIT",
                name: "5-Day Split",
                days: &["CHEST", "BACK", "LEGS", "SHOULDERS", "ARM+ABS"],
            },
            SplitConfig {
                id: "FB",
                name: "Full Body",
                days: &[
                    "FULLBODY_A",
                    "FULLBODY_B",
                    "FULLBODY_C",
                    "FULLBODY_D",
                    "FULLBODY_E",
                ],
            },
        ],
        _ => &[],
    }
}

/// Find a split by frequency and id, rejecting unknown combinations
///
/// # Errors
///
/// Returns an `INVALID_INPUT` error if no split with the given id exists for
/// the frequency (client-error class; the request is rejected before schema
/// compilation).
pub fn find_split(frequency: u8, split_id: &str) -> AppResult<SplitConfig> {
    split_options(frequency)
        .iter()
        .find(|config| config.id == split_id)
        .cloned()
        .ok_or_else(|| {
            AppError::invalid_input(format!(
                "Invalid split_id '{split_id}' for frequency {frequency}"
            ))
        })
}

/// Whether the tag names a full-body day
#[must_use]
pub fn is_fullbody(tag: &str) -> bool {
    tag.starts_with(FULLBODY_PREFIX)
}

/// Body parts that must be covered by a primary lift on this day, if any
///
/// Full-body days pin their leading slots to main Leg, Chest, and Back lifts;
/// the 3-day split's PUSH day requires main Chest and Shoulder lifts. All
/// other day tags carry no coverage rule.
#[must_use]
pub fn coverage_requirements(tag: &str, frequency: u8) -> &'static [BodyPart] {
    if is_fullbody(tag) {
        &[BodyPart::Leg, BodyPart::Chest, BodyPart::Back]
    } else if tag == "PUSH" && frequency == 3 {
        &[BodyPart::Chest, BodyPart::Shoulder]
    } else {
        &[]
    }
}

/// Inclusive per-day exercise count window derived from level and duration
///
/// Duration resolves to the largest table key not exceeding the requested
/// duration; durations below the smallest key use the smallest.
#[must_use]
pub fn exercise_count_window(level: TrainingLevel, duration_min: u32) -> (usize, usize) {
    const DURATIONS: [u32; 5] = [30, 45, 60, 75, 90];

    let table: [(usize, usize); 5] = match level {
        TrainingLevel::Beginner | TrainingLevel::Novice => {
            [(3, 4), (4, 5), (5, 6), (6, 7), (7, 8)]
        }
        TrainingLevel::Intermediate | TrainingLevel::Advanced | TrainingLevel::Elite => {
            [(3, 4), (4, 5), (6, 7), (7, 8), (8, 9)]
        }
    };

    let idx = DURATIONS
        .iter()
        .rposition(|&d| d <= duration_min)
        .unwrap_or(0);
    table[idx]
}
