// ABOUTME: Main library entry point for the constrained routine generation engine
// ABOUTME: Resolves allowed exercises, compiles guided-decoding schemas, and repairs generated routines
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # Routine Forge
//!
//! A constrained weekly-routine generation engine. Instead of validating
//! free-form model output after the fact, the engine compiles everything it
//! knows about a user into a JSON Schema *grammar* that a guided-decoding
//! backend (vLLM `guided_json`) samples from, then deterministically repairs
//! whatever comes back.
//!
//! ## Pipeline
//!
//! 1. **Resolve**: narrow the allowed-name table by the user's equipment and
//!    training level ([`allowed::resolve_allowed`]).
//! 2. **Compile**: turn the split-day sequence plus the narrowed pools into
//!    a week-level pair-enumeration schema ([`schema::compile_week_schema`]).
//! 3. **Generate**: hand prompt + schema to an opaque provider
//!    ([`llm::GenerationProvider`]).
//! 4. **Repair**: coerce the raw output to JSON and fix coverage,
//!    duplicate, and category violations in one deterministic greedy pass
//!    ([`repair::repair_week`]).
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use routine_forge::config::EngineConfig;
//! use routine_forge::engine::RoutineEngine;
//! use routine_forge::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = EngineConfig::from_env()?;
//!     let engine = RoutineEngine::load(&config)?;
//!     println!("Catalog loaded: {} exercises", engine.catalog().len());
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the CLI binary (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access
// them.

/// Allowed-exercise resolution: equipment and training-level filters
pub mod allowed;

/// Exercise catalog records and name-keyed index
pub mod catalog;

/// Environment-driven engine configuration
pub mod config;

/// Request orchestration: plan, compile, generate, repair, enrich
pub mod engine;

/// Error types and error codes for the engine
pub mod errors;

/// Generation provider abstraction and `OpenAI`-compatible implementation
pub mod llm;

/// Structured logging configuration
pub mod logging;

/// Core domain types: profiles, body parts, routines, repair outcomes
pub mod models;

/// Deterministic routine validation and repair
pub mod repair;

/// JSON Schema compilation for guided decoding
pub mod schema;

/// Split catalog, coverage requirements, and exercise count windows
pub mod splits;
