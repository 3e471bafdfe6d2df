//! Duplicate verdicts for pairs of debate scenarios.
//!
//! The arbiter issues the authoritative DUPLICATE/DIFFERENT decision. The
//! production implementation asks a remote LLM classifier to compare two
//! canonical texts under a fixed rule set; when no client is configured,
//! or a call fails or comes back without content, that single comparison
//! degrades to exact case-insensitive text equality instead of failing
//! the whole scan. A well-formed answer that simply lacks the DUPLICATE
//! token counts as not a duplicate, so ambiguity never collapses two
//! distinct debates.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{ChatRequest, LlmProvider, Message};

const SYSTEM_PROMPT: &str =
    "You are a precise semantic comparison expert. Respond with only DUPLICATE or DIFFERENT.";

const DUPLICATE_CHECK_PROMPT: &str = r#"You are a semantic duplicate detector for ethical debates. Determine if these two debates are the SAME debate or DIFFERENT debates.

DEBATE 1 (Title: "{title1}"):
{text1}

DEBATE 2 (Title: "{title2}"):
{text2}

RULES FOR DUPLICATE DETECTION:
1. IGNORE titles completely - titles don't matter for duplicate detection
2. Focus ONLY on the content: context and the two options
3. Consider debates DUPLICATES if:
   - The ethical dilemma/scenario is the same (even if worded differently)
   - Both options present the same choices (even if paraphrased)
   - Example: "I am happy" vs "I am not sad" = SAME meaning = DUPLICATE
   - Example: "Kill 1 to save 5" vs "Sacrifice one person to rescue five people" = DUPLICATE

4. Consider debates DIFFERENT if:
   - The context/scenario is different
   - ANY option is different (even if context is same)
   - Example: Same trolley context but "pull lever" vs "push person" = DIFFERENT
   - Example: Same context but different option B = DIFFERENT

Respond with ONLY "DUPLICATE" or "DIFFERENT" - nothing else."#;

/// Issues the binary duplicate verdict for two canonical texts.
///
/// Titles are passed as contextual metadata only; implementations must
/// not let them influence the verdict.
#[async_trait]
pub trait DuplicateArbiter: Send + Sync {
    /// Returns true if the two texts describe the same debate.
    async fn is_duplicate(&self, text1: &str, text2: &str, title1: &str, title2: &str) -> bool;
}

/// LLM-backed arbiter with a deterministic exact-match fallback.
pub struct SemanticArbiter {
    client: Option<Arc<dyn LlmProvider>>,
}

impl SemanticArbiter {
    /// Creates an arbiter over the given provider.
    pub fn new(client: Arc<dyn LlmProvider>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Creates an arbiter with no remote classifier.
    ///
    /// Every comparison uses exact-text equality, so paraphrase detection
    /// is unavailable but verdicts stay deterministic.
    pub fn offline() -> Self {
        Self { client: None }
    }

    fn build_prompt(text1: &str, text2: &str, title1: &str, title2: &str) -> String {
        DUPLICATE_CHECK_PROMPT
            .replace("{title1}", title1)
            .replace("{title2}", title2)
            .replace("{text1}", text1)
            .replace("{text2}", text2)
    }
}

/// Case-insensitive, whitespace-trimmed equality of two canonical texts.
///
/// Strictly stricter than the semantic path: paraphrases are not detected.
pub fn exact_text_match(text1: &str, text2: &str) -> bool {
    text1.to_lowercase().trim() == text2.to_lowercase().trim()
}

#[async_trait]
impl DuplicateArbiter for SemanticArbiter {
    async fn is_duplicate(&self, text1: &str, text2: &str, title1: &str, title2: &str) -> bool {
        let Some(client) = &self.client else {
            return exact_text_match(text1, text2);
        };

        let prompt = Self::build_prompt(text1, text2, title1, title2);
        let request = ChatRequest::new(
            "",
            vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
        )
        .with_temperature(0.1)
        .with_max_tokens(10);

        match client.generate(request).await {
            Ok(response) => match response.first_content() {
                Some(content) => content.to_uppercase().contains("DUPLICATE"),
                None => {
                    tracing::warn!("Duplicate check returned no content, falling back to exact text match");
                    exact_text_match(text1, text2)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Duplicate check failed, falling back to exact text match");
                exact_text_match(text1, text2)
            }
        }
    }
}
