// ABOUTME: Request orchestration - plan, compile, generate, repair, and enrich in one context
// ABOUTME: RoutineEngine owns the immutable catalog and allowed-name table shared across requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Routine Engine
//!
//! [`RoutineEngine`] is the explicit immutable context object holding the
//! two startup loads (catalog, allowed-name table). It is safely shared
//! across concurrent requests without locking; everything derived from a
//! request (plan, effective table, schema, candidate, repaired routine) is
//! allocated fresh and discarded with the response.
//!
//! Control flow for one request:
//!
//! ```text
//! profile -> plan_request -> compile_schema -> [provider.generate]
//!         -> coerce_json -> repair -> enrich -> RoutineResponse
//! ```
//!
//! The generation call is the only suspend point; the compiler and repairer
//! never block or yield.

use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use crate::allowed::{resolve_allowed, AllowedNameTable, EffectiveAllowedTable};
use crate::catalog::CatalogIndex;
use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};
use crate::llm::{coerce_json, GenerationProvider, GenerationRequest};
use crate::models::{EnrichedExercise, Routine, RoutineResponse, UserProfile};
use crate::repair::{repair_week, RepairReport};
use crate::schema::compile_week_schema;
use crate::splits::{exercise_count_window, find_split, SplitConfig};

/// Request-scoped plan derived from a profile: validated split, count
/// window, and the narrowed allowed table
#[derive(Debug, Clone)]
pub struct RequestPlan {
    /// Validated split configuration
    pub split: SplitConfig,
    /// Inclusive per-day exercise count window
    pub window: (usize, usize),
    /// Equipment/level-narrowed allowed table
    pub effective: EffectiveAllowedTable,
}

/// Immutable process-wide context for routine generation
pub struct RoutineEngine {
    catalog: CatalogIndex,
    allowed: AllowedNameTable,
}

impl RoutineEngine {
    /// Build an engine from already-loaded resources
    #[must_use]
    pub fn new(catalog: CatalogIndex, allowed: AllowedNameTable) -> Self {
        Self { catalog, allowed }
    }

    /// Load both startup resources from the configured paths
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_ERROR` if either resource cannot be loaded.
    pub fn load(config: &EngineConfig) -> AppResult<Self> {
        let catalog = CatalogIndex::load(&config.catalog_path)?;
        let allowed = AllowedNameTable::load(&config.allowed_table_path)?;
        Ok(Self::new(catalog, allowed))
    }

    /// The loaded catalog index
    #[must_use]
    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    /// Validate the profile and derive the request plan
    ///
    /// # Errors
    ///
    /// Returns a client-class error for an out-of-range frequency or an
    /// unknown split id (rejected before schema compilation).
    pub fn plan_request(&self, profile: &UserProfile) -> AppResult<RequestPlan> {
        profile.validate()?;
        let split = find_split(profile.frequency, &profile.split_id)?;
        let window = exercise_count_window(profile.level, profile.duration_min);
        let effective = resolve_allowed(profile, &self.allowed, &self.catalog);

        debug!(
            split_id = split.id,
            frequency = profile.frequency,
            min_ex = window.0,
            max_ex = window.1,
            "Planned request"
        );

        Ok(RequestPlan {
            split,
            window,
            effective,
        })
    }

    /// Compile the week schema for a profile
    ///
    /// # Errors
    ///
    /// Propagates plan validation errors.
    pub fn compile_schema(
        &self,
        profile: &UserProfile,
        rng: &mut impl Rng,
    ) -> AppResult<Value> {
        let plan = self.plan_request(profile)?;
        Ok(compile_week_schema(
            &plan.split,
            profile.frequency,
            &plan.effective,
            &self.catalog,
            plan.window.0,
            rng,
        ))
    }

    /// Repair a candidate routine against a profile's plan
    ///
    /// # Errors
    ///
    /// Propagates plan validation errors; repair itself never fails.
    pub fn repair(
        &self,
        candidate: &Routine,
        profile: &UserProfile,
        rng: &mut impl Rng,
    ) -> AppResult<(Routine, RepairReport)> {
        let plan = self.plan_request(profile)?;
        Ok(repair_week(
            candidate,
            &plan.split,
            profile.frequency,
            &plan.effective,
            &self.catalog,
            profile.policy,
            plan.window,
            rng,
        ))
    }

    /// Run one full generation request
    ///
    /// The prompt arrives fully assembled (prompt-text assembly is the
    /// caller's concern). Generation parameters come from `config`.
    ///
    /// # Errors
    ///
    /// Client-class errors for invalid profiles; gateway-class errors when
    /// the provider fails or its output cannot be coerced into a routine.
    pub async fn generate(
        &self,
        profile: &UserProfile,
        prompt: &str,
        provider: &dyn GenerationProvider,
        config: &EngineConfig,
        rng: &mut (impl Rng + Send),
    ) -> AppResult<RoutineResponse> {
        let plan = self.plan_request(profile)?;
        let schema = compile_week_schema(
            &plan.split,
            profile.frequency,
            &plan.effective,
            &self.catalog,
            plan.window.0,
            rng,
        );

        let request = GenerationRequest {
            prompt: prompt.to_owned(),
            schema,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };
        let raw = provider.generate(&request).await?;

        let value = coerce_json(&raw)?;
        if value.get("days").is_none() {
            return Err(AppError::external_service(
                provider.name(),
                "Generated output is missing the 'days' key",
            ));
        }
        let candidate: Routine = serde_json::from_value(value).map_err(|e| {
            AppError::external_service(
                provider.name(),
                format!("Generated output does not match the routine shape: {e}"),
            )
        })?;

        let (routine, report) = repair_week(
            &candidate,
            &plan.split,
            profile.frequency,
            &plan.effective,
            &self.catalog,
            profile.policy,
            plan.window,
            rng,
        );

        info!(
            days = routine.days.len(),
            repairs = report.actions.len(),
            clean = report.is_clean(),
            "Generated and repaired weekly routine"
        );

        Ok(RoutineResponse {
            days: self.enrich(&routine),
            raw: candidate,
            repairs: report,
        })
    }

    /// Join display metadata from the catalog onto a repaired routine
    ///
    /// Pure presentation; performs no further validation.
    #[must_use]
    pub fn enrich(&self, routine: &Routine) -> Vec<Vec<EnrichedExercise>> {
        routine
            .days
            .iter()
            .map(|day| {
                day.iter()
                    .map(|pair| match self.catalog.get(&pair.name) {
                        Some(record) => EnrichedExercise {
                            name: pair.name.clone(),
                            display_name: record.display_name().to_owned(),
                            body_part: pair.body_part.clone(),
                            category: record.category.clone(),
                            main_lift: record.main_lift,
                            engagement: record.engagement,
                            tool: record.tool.clone(),
                            info_type: record.info_type.clone(),
                        },
                        None => EnrichedExercise {
                            name: pair.name.clone(),
                            display_name: pair.name.clone(),
                            body_part: pair.body_part.clone(),
                            category: None,
                            main_lift: false,
                            engagement: 0,
                            tool: "Etc".to_owned(),
                            info_type: None,
                        },
                    })
                    .collect()
            })
            .collect()
    }
}
