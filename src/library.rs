//! Persistent library of debate scenarios.
//!
//! The library is a single ordered JSON file of [`ScenarioRecord`]s.
//! Records are append-only from this subsystem's point of view: admission
//! assigns a monotone integer id and a unique URL-safe slug, and every
//! save replaces the whole file atomically (write to a temp file, then
//! rename over the real one) so a failed write never corrupts the
//! previously persisted collection.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::embedding::canonical_text;
use crate::error::LibraryError;

/// A debate scenario admitted to the library.
///
/// `id` and `slug` are each unique across the store. The title is display
/// metadata only and never participates in duplicate detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct ScenarioRecord {
    /// Positive integer id, assigned as max existing + 1.
    pub id: u64,
    /// URL-safe slug derived from the title, unique within the store.
    pub slug: String,
    /// Display title; excluded from comparison and fingerprinting.
    pub title: String,
    /// Free text describing the situation.
    pub context: String,
    /// First alternative.
    pub option_a: String,
    /// Second alternative.
    pub option_b: String,
    /// Admission timestamp; absent on legacy seed records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// True for user-submitted records, false for seeds.
    pub is_custom: bool,
}

impl ScenarioRecord {
    /// Returns the normalized comparison string for this record.
    pub fn canonical_text(&self) -> String {
        canonical_text(&self.context, &self.option_a, &self.option_b)
    }
}

/// On-disk record shape, tolerating the legacy field convention.
///
/// Older seed files used `constraints`/`A`/`B` for the content fields and
/// may lack `created_at`/`is_custom`. The new convention wins when both
/// are present.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    constraints: Option<String>,
    #[serde(default)]
    option_a: Option<String>,
    #[serde(default, rename = "A")]
    legacy_a: Option<String>,
    #[serde(default)]
    option_b: Option<String>,
    #[serde(default, rename = "B")]
    legacy_b: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_custom: bool,
}

impl From<RawRecord> for ScenarioRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            id: raw.id,
            slug: raw.slug,
            title: raw.title,
            context: raw.context.or(raw.constraints).unwrap_or_default(),
            option_a: raw.option_a.or(raw.legacy_a).unwrap_or_default(),
            option_b: raw.option_b.or(raw.legacy_b).unwrap_or_default(),
            created_at: raw.created_at,
            is_custom: raw.is_custom,
        }
    }
}

/// A scenario submitted for admission, before identity is assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateScenario {
    /// Display title (5-200 chars at the web layer).
    #[serde(default)]
    pub title: String,
    /// Free text describing the situation.
    #[serde(default)]
    pub context: String,
    /// First alternative.
    #[serde(default)]
    pub option_a: String,
    /// Second alternative.
    #[serde(default)]
    pub option_b: String,
}

impl CandidateScenario {
    /// Returns the normalized comparison string for this candidate.
    pub fn canonical_text(&self) -> String {
        canonical_text(&self.context, &self.option_a, &self.option_b)
    }
}

/// File-backed store for the scenario library.
pub struct LibraryStore {
    path: PathBuf,
}

impl LibraryStore {
    /// Creates a store over the given JSON file path.
    ///
    /// The file is created lazily on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the store's file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the full ordered collection.
    ///
    /// A missing file loads as the empty library. A file that is not valid
    /// JSON also loads as empty, with a warning, matching the fail-open
    /// read path of the original service. Other IO failures propagate.
    pub async fn load(&self) -> Result<Vec<ScenarioRecord>, LibraryError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LibraryError::Io(e)),
        };

        match serde_json::from_slice::<Vec<ScenarioRecord>>(&bytes) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Malformed library file, loading as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Persists the full collection atomically.
    ///
    /// Writes to a temporary sibling file, then renames it over the real
    /// path. On any failure the temporary artifact is removed and the
    /// error propagates, leaving the previous file untouched.
    pub async fn save(&self, records: &[ScenarioRecord]) -> Result<(), LibraryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let temp_path = self.path.with_extension("tmp");

        if let Err(e) = fs::write(&temp_path, &bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(LibraryError::Io(e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(LibraryError::Io(e));
        }

        Ok(())
    }

    /// Admits a candidate: assigns the next id and a unique slug, stamps
    /// the creation time, marks it custom, appends and persists.
    pub async fn add(&self, candidate: &CandidateScenario) -> Result<ScenarioRecord, LibraryError> {
        let mut records = self.load().await?;

        let record = ScenarioRecord {
            id: Self::next_id(&records),
            slug: Self::generate_slug(&candidate.title, &records),
            title: candidate.title.clone(),
            context: candidate.context.clone(),
            option_a: candidate.option_a.clone(),
            option_b: candidate.option_b.clone(),
            created_at: Some(Utc::now()),
            is_custom: true,
        };

        records.push(record.clone());
        self.save(&records).await?;

        Ok(record)
    }

    /// Returns the next record id: max existing + 1, or 1 if empty.
    pub fn next_id(records: &[ScenarioRecord]) -> u64 {
        records.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    /// Derives a unique URL-safe slug from a title.
    ///
    /// Lowercases, strips characters outside `[\w\s-]`, collapses
    /// whitespace/hyphen runs into single hyphens, trims edge hyphens and
    /// truncates to 50 characters. On collision with an existing slug,
    /// appends `-2`, `-3`, ... until unique.
    pub fn generate_slug(title: &str, existing: &[ScenarioRecord]) -> String {
        let strip = Regex::new(r"[^\w\s-]").expect("valid slug strip pattern");
        let collapse = Regex::new(r"[-\s]+").expect("valid slug collapse pattern");

        let slug = title.to_lowercase();
        let slug = strip.replace_all(&slug, "");
        let slug = collapse.replace_all(&slug, "-");
        let slug: String = slug.trim_matches('-').chars().take(50).collect();

        let existing_slugs: HashSet<&str> = existing.iter().map(|r| r.slug.as_str()).collect();

        if !existing_slugs.contains(slug.as_str()) {
            return slug;
        }

        let mut counter = 2u64;
        loop {
            let candidate = format!("{slug}-{counter}");
            if !existing_slugs.contains(candidate.as_str()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
