//! debate-forge: debate scenario library with semantic duplicate detection.
//!
//! This library stores binary-dilemma debate scenarios and decides, for
//! each submission, whether it is the same dilemma as one already stored
//! regardless of wording or title. Duplicate verdicts come from an
//! LLM-backed arbiter with a deterministic exact-match fallback; unique
//! scenarios are admitted under a monotone integer id and a unique
//! URL-safe slug, persisted with atomic replace-on-write.

pub mod arbiter;
pub mod cli;
pub mod dedup;
pub mod embedding;
pub mod error;
pub mod library;
pub mod llm;

// Re-export commonly used error types
pub use error::{LibraryError, LlmError};
