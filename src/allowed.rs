// ABOUTME: Allowed-name table loading and per-request narrowing by equipment and level
// ABOUTME: Produces the request-scoped EffectiveAllowedTable consumed by the schema compiler
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Allowed-Set Resolver
//!
//! The static [`AllowedNameTable`] maps `(frequency, day tag)` to ordered
//! exercise-name lists, with auxiliary top-level pools (per-body-part lists,
//! tool subsets, entry-tier whitelists). It is loaded once at startup and
//! never mutated.
//!
//! [`resolve_allowed`] narrows it per request into an
//! [`EffectiveAllowedTable`] by composing two independent passes:
//!
//! 1. **Equipment**: keep a name iff its tool tag is owned, except names in
//!    the pull-up-bar subset, which are gated by the `PullUpBar` equipment
//!    flag instead of their nominal tool tag. A day list emptied by this pass
//!    falls back to its pre-filter contents (logged) so the compiler never
//!    sees an empty enumeration.
//! 2. **Level**: tiers above Novice drop pure-bodyweight accessories outside
//!    the core category. Entry tiers intersect each day list with a
//!    gender-and-tier whitelist, widening to the same-frequency union and
//!    finally the whitelist itself before giving up.
//!
//! Narrowing clones lists structurally; the shared table is never touched.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::CatalogIndex;
use crate::errors::{AppError, AppResult};
use crate::models::{BodyPart, UserProfile};
use crate::splits::is_fullbody;

/// Tool-subset key for exercises needing a pull-up bar
pub const PULLUP_BAR_KEY: &str = "PullUpBar";

/// Equipment tag (lowercased) that unlocks the pull-up-bar subset
const PULLUP_BAR_EQUIPMENT: &str = "pullupbar";

/// Day-tag key exempt from the empty-list fallback (explicitly equipment-free)
const EQUIPMENT_FREE_TAG: &str = "ETC";

/// Static allowed-name source table, loaded once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowedNameTable {
    /// `frequency → day tag → ordered exercise names`
    #[serde(default)]
    pub by_frequency: BTreeMap<u8, BTreeMap<String, Vec<String>>>,
    /// Top-level per-body-part pools (`CHEST`, `BACK`, ..., `ARM`, `ABS`)
    #[serde(default)]
    pub body_parts: BTreeMap<String, Vec<String>>,
    /// Tool subsets (`PullUpBar` is the distinguished one)
    #[serde(default)]
    pub tools: BTreeMap<String, Vec<String>>,
    /// Entry-tier whitelists keyed by gender+tier (`MBeginner`, `FNovice`, ...)
    #[serde(default)]
    pub entry_tiers: BTreeMap<String, Vec<String>>,
}

impl AllowedNameTable {
    /// Load the table from a JSON file
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_ERROR` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!(
                "Failed to read allowed-name table at {}: {e}",
                path.display()
            ))
        })?;
        let table: Self = serde_json::from_str(&raw).map_err(|e| {
            AppError::config(format!(
                "Failed to parse allowed-name table at {}: {e}",
                path.display()
            ))
        })?;
        info!(
            frequencies = table.by_frequency.len(),
            body_part_pools = table.body_parts.len(),
            path = %path.display(),
            "Loaded allowed-name table"
        );
        Ok(table)
    }

    /// Names in the pull-up-bar tool subset
    #[must_use]
    pub fn pullup_bar_names(&self) -> HashSet<&str> {
        self.tools
            .get(PULLUP_BAR_KEY)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Request-scoped narrowed view of the allowed-name table
///
/// Same shape as [`AllowedNameTable`], smaller lists. Created fresh per
/// request and discarded with the response.
#[derive(Debug, Clone)]
pub struct EffectiveAllowedTable {
    /// Narrowed `frequency → day tag → names`
    pub by_frequency: BTreeMap<u8, BTreeMap<String, Vec<String>>>,
    /// Narrowed per-body-part pools
    pub body_parts: BTreeMap<String, Vec<String>>,
}

impl EffectiveAllowedTable {
    /// The allowed pool for one day tag, guaranteed non-empty for a non-empty
    /// catalog
    ///
    /// Full-body tags use the union of the body-part pools. Other tags use
    /// their `(frequency, tag)` list, degrading to the same-frequency union
    /// and finally the whole catalog; each degradation is logged.
    #[must_use]
    pub fn day_pool(&self, catalog: &CatalogIndex, frequency: u8, tag: &str) -> Vec<String> {
        if is_fullbody(tag) {
            return self.fullbody_pool(catalog);
        }

        if let Some(names) = self
            .by_frequency
            .get(&frequency)
            .and_then(|tags| tags.get(tag))
        {
            if !names.is_empty() {
                return names.clone();
            }
        }

        if let Some(tags) = self.by_frequency.get(&frequency) {
            let union = dedup_preserving_order(tags.values().flatten().cloned());
            if !union.is_empty() {
                warn!(
                    frequency,
                    tag, "Empty allowed list for day tag; using same-frequency union"
                );
                return union;
            }
        }

        warn!(
            frequency,
            tag, "No allowed names for frequency; falling back to full catalog"
        );
        catalog.names()
    }

    /// Union of all per-body-part pools, used for full-body days
    #[must_use]
    pub fn fullbody_pool(&self, catalog: &CatalogIndex) -> Vec<String> {
        let union = dedup_preserving_order(self.body_parts.values().flatten().cloned());
        if union.is_empty() {
            warn!("No names in body-part pools; falling back to full catalog");
            return catalog.names();
        }
        union
    }

    /// One top-level body-part pool (e.g. `ARM`, `ABS`)
    #[must_use]
    pub fn body_part_pool(&self, key: &str) -> &[String] {
        self.body_parts
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Narrow the static table for one user profile
///
/// See the module docs for the two passes. The resolver never returns an
/// empty pool for any tag the schema compiler will consume, given a non-empty
/// catalog (the [`EffectiveAllowedTable::day_pool`] accessor completes the
/// guarantee).
#[must_use]
pub fn resolve_allowed(
    profile: &UserProfile,
    table: &AllowedNameTable,
    catalog: &CatalogIndex,
) -> EffectiveAllowedTable {
    let mut effective = EffectiveAllowedTable {
        by_frequency: table.by_frequency.clone(),
        body_parts: table.body_parts.clone(),
    };

    apply_equipment_filter(&mut effective, profile, table, catalog);
    apply_level_filter(&mut effective, profile, table, catalog);

    effective
}

// ============================================================================
// Pass 1: equipment
// ============================================================================

fn apply_equipment_filter(
    effective: &mut EffectiveAllowedTable,
    profile: &UserProfile,
    table: &AllowedNameTable,
    catalog: &CatalogIndex,
) {
    let owned = profile.equipment_set();
    if owned.is_empty() {
        return;
    }

    let pullup_names = table.pullup_bar_names();
    let keep = |name: &str| -> bool {
        if pullup_names.contains(name) {
            return owned.contains(PULLUP_BAR_EQUIPMENT);
        }
        catalog
            .get(name)
            .is_some_and(|record| owned.contains(&record.tool.to_lowercase()))
    };

    for (frequency, tags) in &mut effective.by_frequency {
        for (tag, names) in tags.iter_mut() {
            let filtered: Vec<String> = names.iter().filter(|n| keep(n)).cloned().collect();
            if filtered.is_empty() && tag != EQUIPMENT_FREE_TAG {
                warn!(
                    frequency = *frequency,
                    tag = %tag,
                    "Equipment filter emptied day list; keeping pre-filter names"
                );
                continue;
            }
            *names = filtered;
        }
    }

    for names in effective.body_parts.values_mut() {
        names.retain(|n| keep(n));
    }
}

// ============================================================================
// Pass 2: training level
// ============================================================================

fn apply_level_filter(
    effective: &mut EffectiveAllowedTable,
    profile: &UserProfile,
    table: &AllowedNameTable,
    catalog: &CatalogIndex,
) {
    if profile.level.is_entry_tier() {
        apply_entry_tier_whitelist(effective, profile, table);
    } else {
        drop_bodyweight_accessories(effective, catalog);
    }
}

/// Bodyweight accessories are assumed too easy to be main work above the
/// entry tiers; core movements are exempt.
fn drop_bodyweight_accessories(effective: &mut EffectiveAllowedTable, catalog: &CatalogIndex) {
    let keep = |name: &str| -> bool {
        catalog
            .get(name)
            .is_none_or(|record| !(record.is_bodyweight() && record.body_part != BodyPart::Abs))
    };

    for tags in effective.by_frequency.values_mut() {
        for names in tags.values_mut() {
            names.retain(|n| keep(n));
        }
    }
    for names in effective.body_parts.values_mut() {
        names.retain(|n| keep(n));
    }
}

fn apply_entry_tier_whitelist(
    effective: &mut EffectiveAllowedTable,
    profile: &UserProfile,
    table: &AllowedNameTable,
) {
    let key = format!("{}{}", profile.gender.key(), profile.level.as_str());
    let Some(whitelist) = table.entry_tiers.get(&key) else {
        warn!(%key, "No entry-tier whitelist found; skipping level filter");
        return;
    };
    let whitelist_set: HashSet<&str> = whitelist.iter().map(String::as_str).collect();

    // Comparison pools come from the pre-filter table so widening is not
    // defeated by the equipment pass.
    if let Some(source_tags) = table.by_frequency.get(&profile.frequency) {
        if let Some(tags) = effective.by_frequency.get_mut(&profile.frequency) {
            for (tag, names) in tags.iter_mut() {
                let mut intersected: Vec<String> = names
                    .iter()
                    .filter(|n| whitelist_set.contains(n.as_str()))
                    .cloned()
                    .collect();

                if intersected.is_empty() {
                    let union: Vec<String> = source_tags
                        .iter()
                        .filter(|(other, _)| **other != *tag)
                        .flat_map(|(_, list)| list.iter())
                        .filter(|n| whitelist_set.contains(n.as_str()))
                        .cloned()
                        .collect();
                    let widened = dedup_preserving_order(union.into_iter());
                    debug!(
                        tag = %tag,
                        widened = !widened.is_empty(),
                        "Entry-tier intersection empty; widening comparison pool"
                    );
                    intersected = if widened.is_empty() {
                        whitelist.clone()
                    } else {
                        widened
                    };
                }

                *names = intersected;
            }
        }
    }

    // Auxiliary pools feeding the paired-category day follow the whitelist too.
    for key in ["ABS", "ARM"] {
        if let Some(names) = effective.body_parts.get_mut(key) {
            names.retain(|n| whitelist_set.contains(n.as_str()));
        }
    }
}

fn dedup_preserving_order(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.filter(|n| seen.insert(n.clone())).collect()
}
