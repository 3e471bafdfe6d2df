//! Submission orchestration: validate, scan for duplicates, admit.
//!
//! A submission runs as one uninterrupted sequence: validate the four
//! required fields, canonicalize the candidate once, then ask the arbiter
//! about every stored record in store order until the first match or
//! exhaustion. The scan issues one remote comparison per record in the
//! worst case, so cost is linear in library size; callers that need
//! at-most-one concurrent submission must serialize externally, since the
//! store itself takes no lock between racing submissions.

use std::sync::Arc;

use serde::Serialize;

use crate::arbiter::DuplicateArbiter;
use crate::embedding::{cosine_similarity, fingerprint};
use crate::error::LibraryError;
use crate::library::{CandidateScenario, LibraryStore, ScenarioRecord};

/// Outcome of a submission, serialized as the caller-facing response.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    /// False only on validation failure or an internal error.
    pub success: bool,
    /// True when the candidate matched an existing record.
    pub is_duplicate: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// The existing record the candidate matched, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_record: Option<ScenarioRecord>,
    /// The newly admitted record, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_record: Option<ScenarioRecord>,
    /// Advisory fingerprint similarity to the matched record. The arbiter,
    /// not this number, made the duplicate decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
}

impl SubmissionReport {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            is_duplicate: false,
            message,
            matched_record: None,
            added_record: None,
            similarity_score: None,
        }
    }
}

/// Orchestrates duplicate detection and admission for the library.
pub struct DeduplicationService {
    library: LibraryStore,
    arbiter: Arc<dyn DuplicateArbiter>,
}

impl DeduplicationService {
    /// Creates a service over a store and an arbiter.
    pub fn new(library: LibraryStore, arbiter: Arc<dyn DuplicateArbiter>) -> Self {
        Self { library, arbiter }
    }

    /// Returns the underlying library store.
    pub fn library(&self) -> &LibraryStore {
        &self.library
    }

    /// Main entry point for scenario submission.
    ///
    /// Never returns an error: validation failures and internal errors are
    /// both converted into a failed report.
    pub async fn submit(&self, candidate: &CandidateScenario) -> SubmissionReport {
        let missing = missing_fields(candidate);
        if !missing.is_empty() {
            return SubmissionReport::failure(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ));
        }

        match self.process(candidate).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Submission failed");
                SubmissionReport::failure(format!("Failed to process debate: {e}"))
            }
        }
    }

    async fn process(&self, candidate: &CandidateScenario) -> Result<SubmissionReport, LibraryError> {
        if let Some((matched, similarity)) = self.find_duplicate(candidate).await? {
            tracing::info!(matched_id = matched.id, similarity, "Duplicate submission rejected");
            return Ok(SubmissionReport {
                success: true,
                is_duplicate: true,
                message: "This debate already exists in the library.".to_string(),
                matched_record: Some(matched),
                added_record: None,
                similarity_score: Some(similarity),
            });
        }

        let added = self.library.add(candidate).await?;
        tracing::info!(id = added.id, slug = %added.slug, "Debate admitted to library");

        Ok(SubmissionReport {
            success: true,
            is_duplicate: false,
            message: "Debate added to library successfully!".to_string(),
            matched_record: None,
            added_record: Some(added),
            similarity_score: None,
        })
    }

    /// Scans the library in store order for a semantic duplicate.
    ///
    /// First match wins. Returns the matched record and the advisory
    /// fingerprint similarity between the two canonical texts.
    pub async fn find_duplicate(
        &self,
        candidate: &CandidateScenario,
    ) -> Result<Option<(ScenarioRecord, f32)>, LibraryError> {
        let records = self.library.load().await?;
        if records.is_empty() {
            return Ok(None);
        }

        let candidate_text = candidate.canonical_text();
        let candidate_fingerprint = fingerprint(&candidate_text);

        for record in records {
            let record_text = record.canonical_text();

            let verdict = self
                .arbiter
                .is_duplicate(&candidate_text, &record_text, &candidate.title, &record.title)
                .await;

            if verdict {
                let similarity =
                    cosine_similarity(&candidate_fingerprint, &fingerprint(&record_text));
                return Ok(Some((record, similarity)));
            }
        }

        Ok(None)
    }
}

/// Names of required submission fields that are missing or empty.
fn missing_fields(candidate: &CandidateScenario) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if candidate.title.is_empty() {
        missing.push("title");
    }
    if candidate.context.is_empty() {
        missing.push("context");
    }
    if candidate.option_a.is_empty() {
        missing.push("option_a");
    }
    if candidate.option_b.is_empty() {
        missing.push("option_b");
    }
    missing
}
