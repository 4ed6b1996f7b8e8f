use anchor_lang::prelude::*;

use crate::address::SessionCode;
use crate::rules::SessionRules;
use crate::{ScribbleError, MAX_WORD_LEN};

const WORD_DOMAIN: &[u8] = b"scribble-stakes/word";

/// Canonical form compared against the drawer's word: surrounding
/// whitespace dropped, case folded.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Rejects empty and oversized submissions. Returns the trimmed text as
/// the player typed it.
pub fn validate_word(word: &str) -> Result<&str> {
    let trimmed = word.trim();
    require!(!trimmed.is_empty(),             ScribbleError::InvalidParameters);
    require!(trimmed.len() <= MAX_WORD_LEN,   ScribbleError::InvalidParameters);
    Ok(trimmed)
}

/// Commitment the drawer stores for a round. Binding the code and round
/// keeps a digest from one round from matching in another.
///
/// Blake3( domain || code || round_le || normalize(word) )
pub fn word_digest(code: &SessionCode, round: u16, word: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(WORD_DOMAIN);
    hasher.update(code.as_bytes());
    hasher.update(&round.to_le_bytes());
    hasher.update(normalize_word(word).as_bytes());
    *hasher.finalize().as_bytes()
}

/// Linear decay from `max_points` at the instant the word is committed to
/// `min_points` when the round timer runs out. Clients use this same
/// function for previews.
pub fn points_for_elapsed(rules: &SessionRules, elapsed_secs: i64) -> u32 {
    let duration = rules.round_duration_secs.max(1) as u64;
    let elapsed = elapsed_secs.clamp(0, rules.round_duration_secs.max(1)) as u64;
    let remaining = duration - elapsed;
    let range = rules.max_points.saturating_sub(rules.min_points) as u64;
    // range <= u32::MAX and remaining/duration <= 1, so this fits back in u32
    let bonus = range.saturating_mul(remaining) / duration;
    rules.min_points.saturating_add(bonus as u32)
}
