// ABOUTME: Deterministic repair passes that restore routine invariants after generation
// ABOUTME: Coverage fix-up, weekly de-duplication, and same-day category de-duplication with structured outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Routine Repairer
//!
//! The generator is sampled under the compiled grammar, so a candidate is
//! shape-conformant but not necessarily rule-conformant. [`repair_week`]
//! applies ordered deterministic passes per day, threading a weekly-used-name
//! set forward across days:
//!
//! 0. **Sanitation + length normalization**: strip prompt artifacts from
//!    body-part labels, drop unknown and same-day duplicate names,
//!    canonicalize body parts from the catalog, then clamp the day into the
//!    level/duration window (truncate over-long days, top up short ones from
//!    the day pool).
//! 1. **Coverage fix-up** (coverage-constrained tags only): guarantee one
//!    primary lift per required body part by swapping in an unused primary
//!    candidate, preferring to displace a non-primary exercise of the same
//!    body part.
//! 2. **Weekly de-duplication** (policy flag): replace names already used
//!    this week with a same-body-part, same-primary-flag substitute.
//! 3. **Category de-duplication** (policy flag): replace same-day category
//!    repeats, first with a same-body-part substitute, then relaxing to any
//!    body part.
//!
//! Repair is greedy, single-pass, and non-backtracking: when no legal
//! substitute exists the violation is kept and reported in the
//! [`RepairReport`], never silently dropped and never an error. Running the
//! repairer on its own output is a no-op.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::allowed::EffectiveAllowedTable;
use crate::catalog::CatalogIndex;
use crate::models::{BodyPart, ExercisePair, Routine, RoutineDay, RoutinePolicy};
use crate::splits::{coverage_requirements, SplitConfig};

// ============================================================================
// Structured outcomes
// ============================================================================

/// One repair decision, fixed or left as a violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepairAction {
    /// Day length was clamped or topped up into the count window
    LengthAdjusted {
        /// Day index (0-based)
        day: usize,
        /// Slot count before adjustment
        from: usize,
        /// Slot count after adjustment
        to: usize,
    },
    /// A primary lift was swapped in for a required body part
    CoverageFixed {
        /// Day index
        day: usize,
        /// Required body part
        body_part: BodyPart,
        /// Name displaced by the swap
        removed: String,
        /// Primary candidate swapped in
        inserted: String,
    },
    /// No unused primary candidate existed; the day was left unchanged
    CoverageUnmet {
        /// Day index
        day: usize,
        /// Required body part
        body_part: BodyPart,
    },
    /// A weekly duplicate was replaced
    DuplicateReplaced {
        /// Day index
        day: usize,
        /// Duplicated name
        original: String,
        /// Substitute name
        replacement: String,
    },
    /// A weekly duplicate had no legal substitute and was kept
    DuplicateKept {
        /// Day index
        day: usize,
        /// Duplicated name
        name: String,
    },
    /// A same-day category repeat was replaced
    CategoryReplaced {
        /// Day index
        day: usize,
        /// Name with the repeated category
        original: String,
        /// Substitute name
        replacement: String,
        /// The repeated category
        category: String,
    },
    /// A category repeat had no legal substitute and was kept
    CategoryKept {
        /// Day index
        day: usize,
        /// Name with the repeated category
        name: String,
        /// The repeated category
        category: String,
    },
}

/// All repair decisions for one candidate, in pass order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
    /// Ordered repair actions
    pub actions: Vec<RepairAction>,
}

impl RepairReport {
    /// Whether every invariant was satisfiable (no kept violations)
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.actions.iter().any(|action| {
            matches!(
                action,
                RepairAction::CoverageUnmet { .. }
                    | RepairAction::DuplicateKept { .. }
                    | RepairAction::CategoryKept { .. }
            )
        })
    }

    /// Names kept as weekly duplicates because no substitute existed
    #[must_use]
    pub fn kept_duplicates(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                RepairAction::DuplicateKept { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Coverage requirements that could not be met
    #[must_use]
    pub fn unmet_coverage(&self) -> Vec<(usize, BodyPart)> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                RepairAction::CoverageUnmet { day, body_part } => Some((*day, *body_part)),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Repair a candidate routine until invariants hold or no legal substitute
/// remains
///
/// `window` is the inclusive `[min, max]` per-day exercise count from
/// [`crate::splits::exercise_count_window`].
#[must_use]
pub fn repair_week(
    candidate: &Routine,
    split: &SplitConfig,
    frequency: u8,
    effective: &EffectiveAllowedTable,
    catalog: &CatalogIndex,
    policy: RoutinePolicy,
    window: (usize, usize),
    rng: &mut impl Rng,
) -> (Routine, RepairReport) {
    let mut report = RepairReport::default();
    let mut weekly_used: HashSet<String> = HashSet::new();
    let mut final_days: Vec<RoutineDay> = Vec::with_capacity(candidate.days.len());

    for (day_idx, raw_day) in candidate.days.iter().enumerate() {
        let tag = split.days[day_idx % split.days.len()];
        let pool = effective.day_pool(catalog, frequency, tag);

        let mut day = sanitize_day(raw_day, catalog);
        normalize_length(
            &mut day, day_idx, &pool, catalog, window, policy, &weekly_used, &mut report,
        );
        fix_coverage(
            &mut day, day_idx, tag, frequency, &pool, catalog, &weekly_used, &mut report,
        );

        if policy.prevent_weekly_duplicates {
            day = dedup_weekly(day, day_idx, &pool, catalog, &weekly_used, &mut report, rng);
        }
        if policy.prevent_category_duplicates {
            day = dedup_categories(
                day,
                day_idx,
                &pool,
                catalog,
                policy,
                &mut weekly_used,
                &mut report,
                rng,
            );
        }

        // Passes on later days must see this day's final names.
        for pair in &day {
            weekly_used.insert(pair.name.clone());
        }
        final_days.push(day);
    }

    (Routine { days: final_days }, report)
}

// ============================================================================
// Pass 0: sanitation and length normalization
// ============================================================================

/// Drop unknown names and same-day repeats; canonicalize body-part labels
fn sanitize_day(raw_day: &RoutineDay, catalog: &CatalogIndex) -> RoutineDay {
    let mut day = Vec::with_capacity(raw_day.len());
    let mut seen: HashSet<&str> = HashSet::new();

    for pair in raw_day {
        let Some(record) = catalog.get(&pair.name) else {
            debug!(name = %pair.name, "Dropping exercise absent from catalog");
            continue;
        };
        if !seen.insert(pair.name.as_str()) {
            continue;
        }
        day.push(ExercisePair::new(
            record.body_part.as_str(),
            pair.name.clone(),
        ));
    }
    day
}

#[allow(clippy::too_many_arguments)]
fn normalize_length(
    day: &mut RoutineDay,
    day_idx: usize,
    pool: &[String],
    catalog: &CatalogIndex,
    window: (usize, usize),
    policy: RoutinePolicy,
    weekly_used: &HashSet<String>,
    report: &mut RepairReport,
) {
    let (min_ex, max_ex) = window;
    let before = day.len();

    if day.len() > max_ex {
        day.truncate(max_ex);
    } else if day.len() < min_ex {
        let today: HashSet<&str> = day.iter().map(|p| p.name.as_str()).collect();
        let mut fill: Vec<ExercisePair> = Vec::new();
        for name in pool {
            if day.len() + fill.len() >= min_ex {
                break;
            }
            if today.contains(name.as_str()) {
                continue;
            }
            if policy.prevent_weekly_duplicates && weekly_used.contains(name) {
                continue;
            }
            if fill.iter().any(|p| p.name == *name) {
                continue;
            }
            let Some(record) = catalog.get(name) else {
                continue;
            };
            fill.push(ExercisePair::new(record.body_part.as_str(), name.clone()));
        }
        day.extend(fill);
    }

    if day.len() != before {
        info!(
            day = day_idx + 1,
            from = before,
            to = day.len(),
            "Normalized day length into count window"
        );
        report.actions.push(RepairAction::LengthAdjusted {
            day: day_idx,
            from: before,
            to: day.len(),
        });
    }
}

// ============================================================================
// Pass 1: coverage fix-up
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn fix_coverage(
    day: &mut RoutineDay,
    day_idx: usize,
    tag: &str,
    frequency: u8,
    pool: &[String],
    catalog: &CatalogIndex,
    weekly_used: &HashSet<String>,
    report: &mut RepairReport,
) {
    for &body_part in coverage_requirements(tag, frequency) {
        let has_main = day.iter().any(|pair| {
            catalog
                .get(&pair.name)
                .is_some_and(|r| r.body_part == body_part && r.main_lift)
        });
        if has_main {
            continue;
        }

        let today: HashSet<&str> = day.iter().map(|p| p.name.as_str()).collect();
        let replacement = pool.iter().find(|name| {
            !today.contains(name.as_str())
                && !weekly_used.contains(*name)
                && catalog
                    .get(name.as_str())
                    .is_some_and(|r| r.body_part == body_part && r.main_lift)
        });
        let Some(replacement) = replacement else {
            warn!(
                day = day_idx + 1,
                body_part = %body_part,
                "No unused primary candidate; leaving coverage unmet"
            );
            report.actions.push(RepairAction::CoverageUnmet {
                day: day_idx,
                body_part,
            });
            continue;
        };

        // Prefer displacing a non-primary exercise of the same body part;
        // else the last non-primary slot; else the last slot.
        let replace_idx = day
            .iter()
            .position(|pair| {
                catalog
                    .get(&pair.name)
                    .is_some_and(|r| r.body_part == body_part && !r.main_lift)
            })
            .or_else(|| {
                day.iter().rposition(|pair| {
                    catalog.get(&pair.name).is_none_or(|r| !r.main_lift)
                })
            })
            .or_else(|| day.len().checked_sub(1));

        if let Some(idx) = replace_idx {
            let removed = std::mem::replace(
                &mut day[idx],
                ExercisePair::new(body_part.as_str(), replacement.clone()),
            );
            info!(
                day = day_idx + 1,
                body_part = %body_part,
                removed = %removed.name,
                inserted = %replacement,
                "Swapped in primary lift for coverage"
            );
            report.actions.push(RepairAction::CoverageFixed {
                day: day_idx,
                body_part,
                removed: removed.name,
                inserted: replacement.clone(),
            });
        }
    }
}

// ============================================================================
// Pass 2: weekly de-duplication
// ============================================================================

fn dedup_weekly(
    day: RoutineDay,
    day_idx: usize,
    pool: &[String],
    catalog: &CatalogIndex,
    weekly_used: &HashSet<String>,
    report: &mut RepairReport,
    rng: &mut impl Rng,
) -> RoutineDay {
    let mut deduped: RoutineDay = Vec::with_capacity(day.len());

    for pair in day {
        if !weekly_used.contains(&pair.name) {
            deduped.push(pair);
            continue;
        }

        let is_main = catalog.get(&pair.name).is_some_and(|r| r.main_lift);
        let placed: HashSet<&str> = deduped.iter().map(|p| p.name.as_str()).collect();
        let candidates: Vec<&String> = pool
            .iter()
            .filter(|name| {
                !weekly_used.contains(*name)
                    && !placed.contains(name.as_str())
                    && catalog.get(name.as_str()).is_some_and(|r| {
                        r.body_part.as_str() == pair.body_part && r.main_lift == is_main
                    })
            })
            .collect();

        if let Some(replacement) = candidates.choose(rng) {
            info!(
                day = day_idx + 1,
                original = %pair.name,
                replacement = %replacement,
                "Replaced weekly duplicate"
            );
            report.actions.push(RepairAction::DuplicateReplaced {
                day: day_idx,
                original: pair.name.clone(),
                replacement: (*replacement).clone(),
            });
            deduped.push(ExercisePair::new(pair.body_part, (*replacement).clone()));
        } else {
            // No legal fix exists; the duplicate stays and is reported.
            warn!(day = day_idx + 1, name = %pair.name, "Keeping weekly duplicate");
            report.actions.push(RepairAction::DuplicateKept {
                day: day_idx,
                name: pair.name.clone(),
            });
            deduped.push(pair);
        }
    }

    deduped
}

// ============================================================================
// Pass 3: same-day category de-duplication
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn dedup_categories(
    day: RoutineDay,
    day_idx: usize,
    pool: &[String],
    catalog: &CatalogIndex,
    policy: RoutinePolicy,
    weekly_used: &mut HashSet<String>,
    report: &mut RepairReport,
    rng: &mut impl Rng,
) -> RoutineDay {
    let mut categories_used: HashSet<String> = HashSet::new();
    let mut deduped: RoutineDay = Vec::with_capacity(day.len());

    for pair in day {
        let category = catalog
            .get(&pair.name)
            .and_then(|r| r.effective_category().map(str::to_owned));

        let Some(category) = category else {
            deduped.push(pair);
            continue;
        };
        if !categories_used.contains(&category) {
            categories_used.insert(category);
            deduped.push(pair);
            continue;
        }

        let placed: HashSet<&str> = deduped.iter().map(|p| p.name.as_str()).collect();
        let eligible = |name: &str, require_same_body_part: bool| -> bool {
            if pair.name == name || placed.contains(name) {
                return false;
            }
            if policy.prevent_weekly_duplicates && weekly_used.contains(name) {
                return false;
            }
            let Some(record) = catalog.get(name) else {
                return false;
            };
            if require_same_body_part && record.body_part.as_str() != pair.body_part {
                return false;
            }
            record
                .effective_category()
                .is_none_or(|cat| !categories_used.contains(cat))
        };

        // Strict tier keeps the body part; the relaxed tier deliberately
        // does not (preserved two-tier behavior).
        let strict: Vec<&String> = pool.iter().filter(|n| eligible(n.as_str(), true)).collect();
        let candidates = if strict.is_empty() {
            pool.iter().filter(|n| eligible(n.as_str(), false)).collect()
        } else {
            strict
        };

        if let Some(replacement) = candidates.choose(rng) {
            let record = catalog.get(replacement.as_str());
            let replacement_category =
                record.and_then(|r| r.effective_category().map(str::to_owned));
            // The relaxed tier may cross body parts; the slot label must
            // follow the replacement's catalog record or re-running the
            // repairer would relabel the slot.
            let replacement_body_part = record.map_or_else(
                || pair.body_part.clone(),
                |r| r.body_part.as_str().to_owned(),
            );
            info!(
                day = day_idx + 1,
                original = %pair.name,
                replacement = %replacement,
                category = %category,
                "Replaced same-day category repeat"
            );
            report.actions.push(RepairAction::CategoryReplaced {
                day: day_idx,
                original: pair.name.clone(),
                replacement: (*replacement).clone(),
                category,
            });
            if let Some(cat) = replacement_category {
                categories_used.insert(cat);
            }
            if policy.prevent_weekly_duplicates {
                weekly_used.insert((*replacement).clone());
            }
            deduped.push(ExercisePair::new(
                replacement_body_part,
                (*replacement).clone(),
            ));
        } else {
            warn!(
                day = day_idx + 1,
                name = %pair.name,
                category = %category,
                "No substitute with an unused category; keeping repeat"
            );
            report.actions.push(RepairAction::CategoryKept {
                day: day_idx,
                name: pair.name.clone(),
                category: category.clone(),
            });
            categories_used.insert(category);
            deduped.push(pair);
        }
    }

    deduped
}
