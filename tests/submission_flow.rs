//! End-to-end submission flow tests over a real on-disk library.
//!
//! The arbiter is either the offline exact-match fallback or an injected
//! deterministic provider, so no test here touches the network.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::tempdir;

use debate_forge::arbiter::{DuplicateArbiter, SemanticArbiter};
use debate_forge::dedup::DeduplicationService;
use debate_forge::error::LlmError;
use debate_forge::library::{CandidateScenario, LibraryStore};
use debate_forge::llm::{ChatRequest, ChatResponse, Choice, LlmProvider, Message};

fn candidate(title: &str, context: &str, option_a: &str, option_b: &str) -> CandidateScenario {
    CandidateScenario {
        title: title.to_string(),
        context: context.to_string(),
        option_a: option_a.to_string(),
        option_b: option_b.to_string(),
    }
}

fn trolley(title: &str) -> CandidateScenario {
    candidate(
        title,
        "A runaway trolley is heading toward five workers on the track.",
        "Pull the lever to divert the trolley onto a side track with one worker.",
        "Do nothing and let the trolley kill the five workers.",
    )
}

#[tokio::test]
async fn duplicate_submission_matches_first_record_and_keeps_library_stable() {
    let dir = tempdir().unwrap();
    let service = DeduplicationService::new(
        LibraryStore::new(dir.path().join("library.json")),
        Arc::new(SemanticArbiter::offline()),
    );

    let first = service.submit(&trolley("T1")).await;
    assert!(first.success && !first.is_duplicate);
    let admitted = first.added_record.unwrap();
    assert_eq!(admitted.id, 1);
    assert_eq!(admitted.slug, "t1");

    // Same content under a different title is the same dilemma.
    let second = service.submit(&trolley("T2")).await;
    assert!(second.success);
    assert!(second.is_duplicate);
    assert_eq!(second.matched_record.unwrap().id, 1);
    assert_eq!(second.added_record, None);

    let records = service.library().load().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "T1");
}

#[tokio::test]
async fn materially_changed_option_is_admitted_as_unique() {
    let dir = tempdir().unwrap();
    let service = DeduplicationService::new(
        LibraryStore::new(dir.path().join("library.json")),
        Arc::new(SemanticArbiter::offline()),
    );

    service.submit(&trolley("Trolley Problem")).await;

    let mut variant = trolley("Trolley Problem");
    variant.option_b =
        "Push a large man off the footbridge to stop the trolley.".to_string();

    let report = service.submit(&variant).await;
    assert!(report.success);
    assert!(!report.is_duplicate);

    let added = report.added_record.unwrap();
    assert_eq!(added.id, 2);
    assert_eq!(added.slug, "trolley-problem-2");
    assert_eq!(service.library().load().await.unwrap().len(), 2);
}

#[tokio::test]
async fn rejected_submission_reports_missing_fields_without_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("library.json");
    let service = DeduplicationService::new(
        LibraryStore::new(&path),
        Arc::new(SemanticArbiter::offline()),
    );

    let report = service.submit(&candidate("", "", "A", "B")).await;
    assert!(!report.success);
    assert_eq!(report.message, "Missing required fields: title, context");
    assert!(!path.exists());
}

/// Provider that recognizes one canned paraphrase pair as a duplicate.
struct ParaphraseAwareProvider;

#[async_trait]
impl LlmProvider for ParaphraseAwareProvider {
    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let prompt = &request.messages.last().expect("user message").content;
        let verdict = if prompt.contains("Divert the vaccine budget to elder care")
            && prompt.contains("Move funding for vaccines into care for the elderly")
        {
            "DUPLICATE"
        } else {
            "DIFFERENT"
        };

        Ok(ChatResponse {
            id: "test".to_string(),
            model: "test".to_string(),
            choices: vec![Choice {
                index: 0,
                message: Message {
                    role: "assistant".to_string(),
                    content: verdict.to_string(),
                },
                finish_reason: "stop".to_string(),
            }],
        })
    }
}

#[tokio::test]
async fn semantic_arbiter_catches_paraphrased_dilemmas() {
    let dir = tempdir().unwrap();
    let service = DeduplicationService::new(
        LibraryStore::new(dir.path().join("library.json")),
        Arc::new(SemanticArbiter::new(Arc::new(ParaphraseAwareProvider))),
    );

    let original = candidate(
        "Budget Ethics",
        "Divert the vaccine budget to elder care",
        "Do it",
        "Refuse",
    );
    let paraphrase = candidate(
        "Funding Dilemma",
        "Move funding for vaccines into care for the elderly",
        "Proceed",
        "Decline",
    );

    assert!(!service.submit(&original).await.is_duplicate);

    let report = service.submit(&paraphrase).await;
    assert!(report.is_duplicate, "paraphrase should match semantically");
    assert_eq!(report.matched_record.unwrap().id, 1);

    // Advisory similarity is attached but did not make the decision:
    // the paraphrase shares almost no exact tokens with the original.
    let similarity = report.similarity_score.unwrap();
    assert!((0.0..=1.0).contains(&similarity));
}

/// Arbiter that panics if consulted, to prove the empty-store short-circuit.
struct UnreachableArbiter;

#[async_trait]
impl DuplicateArbiter for UnreachableArbiter {
    async fn is_duplicate(&self, _: &str, _: &str, _: &str, _: &str) -> bool {
        panic!("arbiter must not be consulted for an empty library");
    }
}

#[tokio::test]
async fn empty_library_skips_the_arbiter_entirely() {
    let dir = tempdir().unwrap();
    let service = DeduplicationService::new(
        LibraryStore::new(dir.path().join("library.json")),
        Arc::new(UnreachableArbiter),
    );

    let report = service.submit(&trolley("First Ever")).await;
    assert!(report.success && !report.is_duplicate);
    assert_eq!(report.added_record.unwrap().id, 1);
}

#[tokio::test]
async fn legacy_seed_records_participate_in_duplicate_detection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("library.json");

    // Seed file in the legacy field convention, as shipped libraries were.
    std::fs::write(
        &path,
        r#"[{"id": 1, "slug": "old-dilemma", "title": "Old Dilemma",
            "constraints": "C", "A": "first choice", "B": "second choice"}]"#,
    )
    .unwrap();

    let service = DeduplicationService::new(
        LibraryStore::new(&path),
        Arc::new(SemanticArbiter::offline()),
    );

    let report = service
        .submit(&candidate("New Title", "C", "first choice", "second choice"))
        .await;
    assert!(report.is_duplicate);
    assert_eq!(report.matched_record.unwrap().slug, "old-dilemma");
}
