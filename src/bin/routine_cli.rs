// ABOUTME: Command-line interface for the routine generation engine
// ABOUTME: Compiles schemas, repairs candidate routines, and runs full guided generations
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line front end for the routine engine.
//!
//! Usage:
//! ```bash
//! # Compile the week schema for a profile
//! cargo run --bin routine-cli -- schema --profile profile.json
//!
//! # Repair a candidate routine against a profile
//! cargo run --bin routine-cli -- repair --profile profile.json --routine candidate.json
//!
//! # Run a full guided generation (requires a running backend)
//! cargo run --bin routine-cli -- generate --profile profile.json --prompt "4-week plan"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::PathBuf;

use routine_forge::config::EngineConfig;
use routine_forge::engine::RoutineEngine;
use routine_forge::llm::OpenAiCompatibleProvider;
use routine_forge::logging;
use routine_forge::models::{Routine, UserProfile};

#[derive(Parser)]
#[command(
    name = "routine-cli",
    about = "Constrained weekly-routine generation engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducible schema shuffles and repairs
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Compile and print the week schema for a profile
    Schema {
        /// Path to the user profile JSON
        #[arg(long)]
        profile: PathBuf,
    },

    /// Repair a candidate routine against a profile and print the result
    Repair {
        /// Path to the user profile JSON
        #[arg(long)]
        profile: PathBuf,

        /// Path to the candidate routine JSON
        #[arg(long)]
        routine: PathBuf,
    },

    /// Run a full guided generation against the configured backend
    Generate {
        /// Path to the user profile JSON
        #[arg(long)]
        profile: PathBuf,

        /// Prompt text handed to the generator
        #[arg(long)]
        prompt: String,
    },
}

fn load_profile(path: &PathBuf) -> Result<UserProfile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse profile from {}", path.display()))
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let cli = Cli::parse();
    let config = EngineConfig::from_env()?;
    let engine = RoutineEngine::load(&config)?;
    let mut rng = make_rng(cli.seed);

    match cli.command {
        Command::Schema { profile } => {
            let profile = load_profile(&profile)?;
            let schema = engine.compile_schema(&profile, &mut rng)?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Repair { profile, routine } => {
            let profile = load_profile(&profile)?;
            let raw = fs::read_to_string(&routine)
                .with_context(|| format!("Failed to read routine from {}", routine.display()))?;
            let candidate: Routine = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse routine from {}", routine.display()))?;

            let (repaired, report) = engine.repair(&candidate, &profile, &mut rng)?;
            let output = serde_json::json!({
                "routine": repaired,
                "repairs": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Generate { profile, prompt } => {
            let profile = load_profile(&profile)?;
            let provider = OpenAiCompatibleProvider::from_env()?;
            let response = engine
                .generate(&profile, &prompt, &provider, &config, &mut rng)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
