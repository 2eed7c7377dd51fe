// ABOUTME: Integration tests for allowed-exercise resolution
// ABOUTME: Covers equipment filtering, the pull-up-bar exception, and level narrowing
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{fixture_catalog, fixture_table, profile};
use routine_forge::allowed::resolve_allowed;
use routine_forge::models::{Gender, TrainingLevel};

#[test]
fn test_no_equipment_means_no_equipment_filtering() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let profile = profile(3, "SPLIT", TrainingLevel::Intermediate);

    let effective = resolve_allowed(&profile, &table, &catalog);
    let push = effective.day_pool(&catalog, 3, "PUSH");

    // Machine and cable exercises survive without any equipment declared
    assert!(push.contains(&"Machine Chest Press".to_owned()));
    assert!(push.contains(&"Cable Fly".to_owned()));
}

#[test]
fn test_equipment_filter_keeps_only_owned_tools() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let mut profile = profile(3, "SPLIT", TrainingLevel::Intermediate);
    profile.equipment = vec!["Machine".into(), "Cable".into()];

    let effective = resolve_allowed(&profile, &table, &catalog);
    let push = effective.day_pool(&catalog, 3, "PUSH");

    assert_eq!(
        push,
        vec![
            "Machine Chest Press".to_owned(),
            "Cable Fly".to_owned(),
            "Machine Shoulder Press".to_owned(),
            "Cable Pushdown".to_owned(),
        ]
    );
}

#[test]
fn test_machine_and_bodyweight_beginner_sees_no_free_weights() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let mut profile = profile(3, "SPLIT", TrainingLevel::Beginner);
    profile.equipment = vec!["Machine".into(), "Bodyweight".into()];

    let effective = resolve_allowed(&profile, &table, &catalog);

    for tag in ["PUSH", "PULL", "LEGS"] {
        let pool = effective.day_pool(&catalog, 3, tag);
        assert!(!pool.is_empty());
        for name in &pool {
            let tool = &catalog.get(name).unwrap().tool;
            assert!(
                tool == "Machine" || tool == "Bodyweight",
                "{name} ({tool}) should have been filtered out of {tag}"
            );
        }
    }
}

#[test]
fn test_pullup_bar_names_gated_by_pullup_bar_flag() {
    let catalog = fixture_catalog();
    let table = fixture_table();

    let mut with_bar = profile(3, "SPLIT", TrainingLevel::Intermediate);
    with_bar.equipment = vec!["Barbell".into(), "PullUpBar".into()];
    let effective = resolve_allowed(&with_bar, &table, &catalog);
    let pull = effective.day_pool(&catalog, 3, "PULL");
    assert!(pull.contains(&"Pull Up".to_owned()));
    assert!(pull.contains(&"Barbell Row".to_owned()));

    let mut without_bar = profile(3, "SPLIT", TrainingLevel::Intermediate);
    without_bar.equipment = vec!["Barbell".into()];
    let effective = resolve_allowed(&without_bar, &table, &catalog);
    let pull = effective.day_pool(&catalog, 3, "PULL");
    assert!(!pull.contains(&"Pull Up".to_owned()));
}

#[test]
fn test_equipment_filter_never_empties_a_day_list() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let mut profile = profile(3, "SPLIT", TrainingLevel::Intermediate);
    // Owns nothing in the catalog: every list would be emptied
    profile.equipment = vec!["Kettlebell".into()];

    let effective = resolve_allowed(&profile, &table, &catalog);
    let push = effective.day_pool(&catalog, 3, "PUSH");

    // Pre-filter contents are kept rather than degrading to nothing,
    // then the level pass still applies (Push Up is a bodyweight accessory)
    assert!(!push.is_empty());
    assert!(push.contains(&"Bench Press".to_owned()));
}

#[test]
fn test_upper_tiers_drop_bodyweight_accessories_outside_core() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let profile = profile(3, "SPLIT", TrainingLevel::Intermediate);

    let effective = resolve_allowed(&profile, &table, &catalog);

    let push = effective.day_pool(&catalog, 3, "PUSH");
    assert!(!push.contains(&"Push Up".to_owned()));

    let legs = effective.day_pool(&catalog, 3, "LEGS");
    assert!(!legs.contains(&"Bodyweight Lunge".to_owned()));
    // Core work is exempt from the bodyweight drop
    assert!(legs.contains(&"Plank".to_owned()));
}

#[test]
fn test_entry_tier_intersects_gender_level_whitelist() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let profile = profile(3, "SPLIT", TrainingLevel::Beginner);

    let effective = resolve_allowed(&profile, &table, &catalog);
    let push = effective.day_pool(&catalog, 3, "PUSH");

    // Day-list order is preserved through the intersection
    assert_eq!(
        push,
        vec![
            "Machine Chest Press".to_owned(),
            "Push Up".to_owned(),
            "Machine Shoulder Press".to_owned(),
            "Lateral Raise".to_owned(),
        ]
    );
}

#[test]
fn test_entry_tier_widens_when_intersection_is_empty() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let mut profile = profile(3, "SPLIT", TrainingLevel::Novice);
    profile.gender = Gender::Female;

    // FNovice holds nothing from the PUSH list, so the pool widens to the
    // whitelisted names from the other same-frequency days
    let effective = resolve_allowed(&profile, &table, &catalog);
    let mut push = effective.day_pool(&catalog, 3, "PUSH");
    push.sort();

    assert_eq!(
        push,
        vec![
            "Lat Pulldown".to_owned(),
            "Leg Extension".to_owned(),
            "Leg Press".to_owned(),
        ]
    );
}

#[test]
fn test_entry_tier_narrows_arm_and_abs_pools() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let profile = profile(5, "SPLIT", TrainingLevel::Beginner);

    let effective = resolve_allowed(&profile, &table, &catalog);

    assert_eq!(effective.body_part_pool("ARM"), ["Dumbbell Curl".to_owned()]);
    assert_eq!(
        effective.body_part_pool("ABS"),
        ["Plank".to_owned(), "Crunch".to_owned()]
    );
}

#[test]
fn test_missing_whitelist_skips_level_narrowing() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let mut profile = profile(3, "SPLIT", TrainingLevel::Beginner);
    profile.gender = Gender::Female;
    profile.level = TrainingLevel::Beginner;

    // No FBeginner whitelist exists in the fixture table
    let effective = resolve_allowed(&profile, &table, &catalog);
    let push = effective.day_pool(&catalog, 3, "PUSH");

    assert!(push.contains(&"Bench Press".to_owned()));
}

#[test]
fn test_day_pool_falls_back_for_unknown_frequency() {
    let catalog = fixture_catalog();
    let table = fixture_table();
    let profile = profile(4, "SPLIT", TrainingLevel::Intermediate);

    // The fixture table has no frequency-4 lists at all
    let effective = resolve_allowed(&profile, &table, &catalog);
    let chest = effective.day_pool(&catalog, 4, "CHEST");

    assert_eq!(chest.len(), catalog.len());
}
