// ABOUTME: Generation provider abstraction and best-effort JSON coercion for raw model output
// ABOUTME: Defines the contract the engine uses to call an opaque schema-guided generator
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Generation Provider Interface
//!
//! The engine treats generation as an opaque, timeout-bounded I/O call:
//! prompt + compiled schema in, raw text out. [`GenerationProvider`] is the
//! contract; [`OpenAiCompatibleProvider`] implements it for vLLM-style
//! endpoints with guided decoding.
//!
//! Raw output is expected to parse as a structure matching the compiled
//! schema but may be malformed (truncation, markdown fences, stray prose).
//! [`coerce_json`] applies a best-effort repair before structural
//! validation; output that still fails to parse surfaces as a gateway-class
//! error.

mod openai_compatible;

pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::{AppError, AppResult};

/// One schema-guided generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully assembled prompt text (assembled by the caller, opaque here)
    pub prompt: String,
    /// Compiled week schema the generator is forced to sample from
    pub schema: Value,
    /// Token budget for the response
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl GenerationRequest {
    /// Build a request with the engine defaults for token budget and
    /// temperature
    #[must_use]
    pub fn new(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
            max_tokens: 4096,
            temperature: 1.0,
        }
    }
}

/// Contract for schema-guided text generators
///
/// Implementations are expected to be cancelable and timeout-bounded; the
/// engine never retries a failed call itself.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short provider name for logging
    fn name(&self) -> &str;

    /// Produce raw text for the prompt under the schema constraint
    ///
    /// # Errors
    ///
    /// Returns an external-service error if the backend cannot be reached,
    /// rejects the request, or returns no choices.
    async fn generate(&self, request: &GenerationRequest) -> AppResult<String>;
}

// ============================================================================
// Best-effort JSON coercion
// ============================================================================

/// Coerce raw generator output into a JSON value
///
/// Repairs applied, in order: markdown fence stripping, slicing to the
/// outermost object braces, and closing any brackets left open by
/// truncation. Strings and escapes are respected while scanning.
///
/// # Errors
///
/// Returns an `EXTERNAL_SERVICE_ERROR` if no repair yields valid JSON.
pub fn coerce_json(raw: &str) -> AppResult<Value> {
    let stripped = strip_markdown_fences(raw);
    let sliced = slice_to_object(stripped);

    if let Ok(value) = serde_json::from_str(sliced) {
        return Ok(value);
    }

    let balanced = close_open_brackets(sliced);
    serde_json::from_str(&balanced).map_err(|e| {
        AppError::external_service(
            "generator",
            format!(
                "Output is not valid JSON after repair: {e} (head: {})",
                raw.chars().take(120).collect::<String>()
            ),
        )
    })
}

/// Drop ```-fenced wrappers (with or without a language tag)
fn strip_markdown_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the language tag line if present
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Slice to the first `{` and the last `}` so surrounding prose is ignored
fn slice_to_object(text: &str) -> &str {
    let Some(start) = text.find('{') else {
        return text;
    };
    match text.rfind('}') {
        Some(end) if end >= start => &text[start..=end],
        _ => &text[start..],
    }
}

/// Append closers for brackets left open by truncated output
fn close_open_brackets(text: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut repaired = text.trim_end().trim_end_matches(',').to_owned();
    if in_string {
        repaired.push('"');
    }
    while let Some(closer) = stack.pop() {
        repaired.push(closer);
    }
    repaired
}
