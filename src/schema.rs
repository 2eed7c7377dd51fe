// ABOUTME: Compiles per-day and week-level JSON Schema enumerations for guided generation
// ABOUTME: Every legal weekly routine shape is expressed as nested pair enums the generator samples from
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Schema Compiler
//!
//! Turns an ordered split-day tag sequence plus the resolved allowed sets
//! into a single nested enumeration grammar. The grammar is a JSON Schema
//! document suitable for guided decoding (vLLM `guided_json`).
//!
//! Every slot enumerates complete `(body part, exercise name)` pairs rather
//! than independent fields, so a generator constrained by the grammar cannot
//! produce an internally inconsistent pair. Three day shapes exist:
//!
//! - **Generic**: a flat pair enumeration with a fixed slot count.
//! - **Coverage-constrained** (full-body days, the 3-day PUSH day): leading
//!   slots pinned to main-lift enumerations of the required body parts,
//!   remaining slots drawn from the whole day pool.
//! - **Paired-category** (ARM+ABS): the slot count split between the two
//!   pools, pinned slots shuffled into position, no free tail.
//!
//! Enumeration order is shuffled through the injected RNG so the generator
//! cannot lean on catalog ordering bias; tests pass a seeded RNG.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::allowed::EffectiveAllowedTable;
use crate::catalog::CatalogIndex;
use crate::models::BodyPart;
use crate::splits::{coverage_requirements, is_fullbody, SplitConfig, ARM_ABS_TAG};

/// Compile the week-level schema for a split
///
/// The result is an object schema with a single required `days` array whose
/// length is pinned to the number of split days; each position carries its
/// day schema and no trailing elements are permitted.
#[must_use]
pub fn compile_week_schema(
    split: &SplitConfig,
    frequency: u8,
    effective: &EffectiveAllowedTable,
    catalog: &CatalogIndex,
    min_ex: usize,
    rng: &mut impl Rng,
) -> Value {
    let day_schemas: Vec<Value> = split
        .days
        .iter()
        .map(|tag| compile_day_schema(tag, frequency, effective, catalog, min_ex, rng))
        .collect();

    debug!(
        split_id = split.id,
        days = day_schemas.len(),
        min_ex,
        "Compiled week schema"
    );

    json!({
        "type": "object",
        "required": ["days"],
        "properties": {
            "days": {
                "type": "array",
                "minItems": day_schemas.len(),
                "maxItems": day_schemas.len(),
                "prefixItems": day_schemas,
                "items": false
            }
        }
    })
}

/// Compile the schema for a single day tag
#[must_use]
pub fn compile_day_schema(
    tag: &str,
    frequency: u8,
    effective: &EffectiveAllowedTable,
    catalog: &CatalogIndex,
    min_ex: usize,
    rng: &mut impl Rng,
) -> Value {
    let required = coverage_requirements(tag, frequency);

    if is_fullbody(tag) {
        let pool = effective.fullbody_pool(catalog);
        coverage_day_schema(tag, required, &pool, min_ex, catalog, rng)
    } else if !required.is_empty() {
        let pool = effective.day_pool(catalog, frequency, tag);
        coverage_day_schema(tag, required, &pool, min_ex, catalog, rng)
    } else if tag == ARM_ABS_TAG {
        paired_category_day_schema(effective, catalog, min_ex, rng)
    } else {
        let pool = effective.day_pool(catalog, frequency, tag);
        generic_day_schema(&pool, min_ex, catalog, rng)
    }
}

// ============================================================================
// Generic day
// ============================================================================

/// Flat pair enumeration with a fixed slot count
fn generic_day_schema(
    names: &[String],
    slots: usize,
    catalog: &CatalogIndex,
    rng: &mut impl Rng,
) -> Value {
    let pairs = shuffled_pair_enum(names, catalog, rng);

    json!({
        "type": "array",
        "description": "All items must be distinct: each exercise_name appears only once per day. \
                        Arrange them in an effective order (compound -> accessories) appropriate \
                        to the user's level.",
        "minItems": slots,
        "maxItems": slots,
        "items": { "enum": pairs }
    })
}

// ============================================================================
// Coverage-constrained day
// ============================================================================

/// Leading slots pinned to main-lift enumerations of the required body parts,
/// remaining slots over the whole day pool
fn coverage_day_schema(
    tag: &str,
    required: &[BodyPart],
    pool: &[String],
    min_ex: usize,
    catalog: &CatalogIndex,
    rng: &mut impl Rng,
) -> Value {
    let all_pairs = shuffled_pair_enum(pool, catalog, rng);

    let prefix_items: Vec<Value> = required
        .iter()
        .map(|&body_part| {
            let pinned = pinned_slot_enum(body_part, pool, catalog);
            if pinned.is_empty() {
                // No primary candidates anywhere in the pool: degrade this
                // slot to the generic pool rather than failing compilation.
                warn!(
                    tag,
                    body_part = %body_part,
                    "No primary exercises for required body part; degrading slot to generic pool"
                );
                json!({ "enum": all_pairs })
            } else {
                json!({ "enum": pinned })
            }
        })
        .collect();

    let slots = min_ex.max(required.len());
    let required_names: Vec<String> = required.iter().map(ToString::to_string).collect();

    json!({
        "type": "array",
        "description": format!(
            "{} day. The first {} slots are fixed to main lifts: {}. All items must be distinct.",
            tag,
            required.len(),
            required_names.join(", ")
        ),
        "minItems": slots,
        "maxItems": slots,
        "prefixItems": prefix_items,
        "items": { "enum": all_pairs }
    })
}

/// Enumeration for one pinned coverage slot: main lifts of the body part from
/// the day pool, relaxing to any same-body-part exercise before giving up
fn pinned_slot_enum(body_part: BodyPart, pool: &[String], catalog: &CatalogIndex) -> Vec<Value> {
    let mains = pair_enum(
        pool.iter().filter(|name| {
            catalog
                .get(name.as_str())
                .is_some_and(|r| r.body_part == body_part && r.main_lift)
        }),
        catalog,
    );
    if !mains.is_empty() {
        return mains;
    }

    pair_enum(
        pool.iter().filter(|name| {
            catalog
                .get(name.as_str())
                .is_some_and(|r| r.body_part == body_part)
        }),
        catalog,
    )
}

// ============================================================================
// Paired-category day (ARM+ABS)
// ============================================================================

/// Slot count split between the arm and abs pools, pinned slots shuffled into
/// position, no free tail
fn paired_category_day_schema(
    effective: &EffectiveAllowedTable,
    catalog: &CatalogIndex,
    min_ex: usize,
    rng: &mut impl Rng,
) -> Value {
    let arm_names = effective.body_part_pool("ARM").to_vec();
    let abs_names = effective.body_part_pool("ABS").to_vec();

    let arm_pairs = pair_enum(arm_names.iter(), catalog);
    let abs_pairs = pair_enum(abs_names.iter(), catalog);

    if arm_pairs.is_empty() || abs_pairs.is_empty() {
        warn!(
            arm = arm_pairs.len(),
            abs = abs_pairs.len(),
            "Paired-category pool missing one side; degrading to generic day"
        );
        let combined: Vec<String> = arm_names.into_iter().chain(abs_names).collect();
        return generic_day_schema(&combined, min_ex, catalog, rng);
    }

    let num_arm = min_ex / 2;
    let num_abs = min_ex - num_arm;

    let mut prefix_items: Vec<Value> = Vec::with_capacity(min_ex);
    for _ in 0..num_arm {
        prefix_items.push(json!({ "enum": arm_pairs }));
    }
    for _ in 0..num_abs {
        prefix_items.push(json!({ "enum": abs_pairs }));
    }
    prefix_items.shuffle(rng);

    json!({
        "type": "array",
        "description": format!(
            "A list of exercises for the ARM+ABS day. It MUST contain {num_arm} ARM exercises \
             and {num_abs} ABS exercises. All items must be distinct."
        ),
        "minItems": min_ex,
        "maxItems": min_ex,
        "prefixItems": prefix_items,
        "items": false
    })
}

// ============================================================================
// Pair enumeration helpers
// ============================================================================

/// Build `[body_part, name]` enum entries, deduplicated by pair key and
/// skipping names absent from the catalog
fn pair_enum<'a>(
    names: impl Iterator<Item = &'a String>,
    catalog: &CatalogIndex,
) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();
    for name in names {
        let Some(record) = catalog.get(name) else {
            continue;
        };
        let body_part = record.body_part.as_str();
        if seen.insert((body_part, name.as_str())) {
            pairs.push(json!([body_part, name]));
        }
    }
    pairs
}

/// Pair enum over a shuffled copy of the pool; falls back to the whole
/// catalog if the pool resolves to nothing
fn shuffled_pair_enum(names: &[String], catalog: &CatalogIndex, rng: &mut impl Rng) -> Vec<Value> {
    let mut shuffled = names.to_vec();
    shuffled.shuffle(rng);

    let pairs = pair_enum(shuffled.iter(), catalog);
    if !pairs.is_empty() {
        return pairs;
    }

    warn!("Pair enumeration resolved empty; falling back to full catalog");
    catalog
        .iter()
        .map(|record| json!([record.body_part.as_str(), record.name]))
        .collect()
}
