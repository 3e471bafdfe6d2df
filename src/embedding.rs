//! Canonical text and hash-based fingerprints for debate scenarios.
//!
//! A scenario's canonical text is built from its context and two options
//! only; the title is intentionally excluded so renaming a debate never
//! affects duplicate detection. Fingerprints are cheap, deterministic
//! bag-of-features vectors built by hashing words and character trigrams
//! into a fixed number of buckets. They are not learned embeddings: they
//! catch exact and near-exact matches well, and shift buckets whenever a
//! word is substituted.

use sha2::{Digest, Sha256};

/// Width of fingerprint vectors (matches common embedding sizes).
pub const EMBEDDING_DIM: usize = 384;

/// Builds the normalized comparison string for a scenario.
///
/// Pure function of the three content fields; the title never appears in
/// the output. Two records that differ only in title canonicalize
/// identically.
pub fn canonical_text(context: &str, option_a: &str, option_b: &str) -> String {
    format!("Context: {context}\nOption A: {option_a}\nOption B: {option_b}")
}

/// Generates a deterministic fingerprint vector for a text.
///
/// The text is lowercased and trimmed, then:
/// - each whitespace-separated word contributes three hashed buckets
///   (the word, the reversed word, every second character) with weights
///   1.0, 0.5 and 0.3;
/// - each character trigram of the full text contributes weight 0.2.
///
/// The result is L2-normalized unless it is exactly zero (whitespace-only
/// input), in which case it stays zero.
pub fn fingerprint(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    let text = text.trim();

    let mut embedding = vec![0.0f32; EMBEDDING_DIM];

    for word in text.split_whitespace() {
        let reversed: String = word.chars().rev().collect();
        let skipped: String = word.chars().step_by(2).collect();

        embedding[hash_bucket(word)] += 1.0;
        embedding[hash_bucket(&reversed)] += 0.5;
        embedding[hash_bucket(&skipped)] += 0.3;
    }

    let chars: Vec<char> = text.chars().collect();
    for trigram in chars.windows(3) {
        let trigram: String = trigram.iter().collect();
        embedding[hash_bucket(&trigram)] += 0.2;
    }

    let norm = l2_norm(&embedding);
    if norm > 0.0 {
        for value in &mut embedding {
            *value /= norm;
        }
    }

    embedding
}

/// Computes cosine similarity between two fingerprints, clamped to [0, 1].
///
/// Returns 0.0 if either vector has zero norm. Symmetric by construction;
/// self-similarity of a non-zero vector is 1.0 within floating-point
/// tolerance.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Maps a string to a fingerprint bucket via a stable hash.
///
/// Uses SHA-256 truncated to 64 bits so buckets are identical across
/// processes and platforms, unlike a randomly seeded hasher.
fn hash_bucket(s: &str) -> usize {
    let digest = Sha256::digest(s.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(bytes) % EMBEDDING_DIM as u64) as usize
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
