// ABOUTME: Environment-driven engine configuration for resource paths and generation defaults
// ABOUTME: Centralizes every ROUTINE_* environment variable behind one validated struct
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Engine Configuration
//!
//! All runtime configuration is environment-driven. Resource paths point at
//! the two startup loads (exercise catalog, allowed-name table); generation
//! defaults ride along with every provider call.
//!
//! ## Environment Variables
//!
//! - `ROUTINE_CATALOG_PATH`: Exercise catalog JSON (default: `data/exercises.json`)
//! - `ROUTINE_ALLOWED_TABLE_PATH`: Allowed-name table JSON (default: `data/allowed_names.json`)
//! - `ROUTINE_MAX_TOKENS`: Token budget per generation (default: 4096)
//! - `ROUTINE_TEMPERATURE`: Sampling temperature (default: 1.0)

use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

/// Environment variable for the exercise catalog path
const CATALOG_PATH_ENV: &str = "ROUTINE_CATALOG_PATH";

/// Environment variable for the allowed-name table path
const ALLOWED_TABLE_PATH_ENV: &str = "ROUTINE_ALLOWED_TABLE_PATH";

/// Environment variable for the generation token budget
const MAX_TOKENS_ENV: &str = "ROUTINE_MAX_TOKENS";

/// Environment variable for the sampling temperature
const TEMPERATURE_ENV: &str = "ROUTINE_TEMPERATURE";

/// Default exercise catalog path
const DEFAULT_CATALOG_PATH: &str = "data/exercises.json";

/// Default allowed-name table path
const DEFAULT_ALLOWED_TABLE_PATH: &str = "data/allowed_names.json";

/// Default generation token budget
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature
const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Engine configuration resolved from the environment
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the exercise catalog JSON
    pub catalog_path: PathBuf,
    /// Path to the allowed-name table JSON
    pub allowed_table_path: PathBuf,
    /// Token budget per generation call
    pub max_tokens: u32,
    /// Sampling temperature for generation
    pub temperature: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            allowed_table_path: PathBuf::from(DEFAULT_ALLOWED_TABLE_PATH),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl EngineConfig {
    /// Resolve configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_ERROR` if a numeric variable is set but does not
    /// parse.
    pub fn from_env() -> AppResult<Self> {
        let catalog_path = env::var(CATALOG_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH), PathBuf::from);
        let allowed_table_path = env::var(ALLOWED_TABLE_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_ALLOWED_TABLE_PATH), PathBuf::from);

        let max_tokens = parse_env_var(MAX_TOKENS_ENV, DEFAULT_MAX_TOKENS)?;
        let temperature = parse_env_var(TEMPERATURE_ENV, DEFAULT_TEMPERATURE)?;

        Ok(Self {
            catalog_path,
            allowed_table_path,
            max_tokens,
            temperature,
        })
    }
}

/// Parse an environment variable, falling back to a default when unset
fn parse_env_var<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("Invalid value for {name}: '{raw}'"))),
        Err(_) => Ok(default),
    }
}
