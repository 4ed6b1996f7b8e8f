use anchor_lang::prelude::*;

use crate::{ScribbleError, MAX_GUESS_ATTEMPTS};

// ── Defaults ──────────────────────────────────────────────────────────────
pub const DEFAULT_ROUND_SECS:     i64 = 80;
pub const DEFAULT_MAX_POINTS:     u32 = 1_500;
pub const DEFAULT_MIN_POINTS:     u32 = 100;
pub const DEFAULT_DRAWER_BONUS:   u32 = 50;   // per correct guesser
pub const DEFAULT_CYCLES:         u8  = 1;    // everyone draws once
pub const DEFAULT_GUESS_ATTEMPTS: u8  = 5;
pub const DEFAULT_LOBBY_SECS:     i64 = 600;  // 10 min join window

// Rank weights in basis points. Only the first N apply for N participants
// and they are re-normalised to 100% of the pool, so a 2-player session
// splits 3700:2800 and a full table uses every slot.
pub const DEFAULT_PAYOUT_WEIGHTS: [u16; 10] =
    [3_700, 2_800, 1_900, 900, 500, 300, 200, 100, 100, 100];

pub const MIN_ROUND_SECS: i64 = 10;
pub const MAX_ROUND_SECS: i64 = 600;
pub const MAX_CYCLES:     u8  = 3;

/// Per-session tunables. Fixed at create time; clients read them from the
/// Session account to preview scores with exactly the authoritative math.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct SessionRules {
    pub round_duration_secs: i64,
    pub max_points:          u32,
    pub min_points:          u32,
    pub drawer_bonus:        u32,
    pub cycles:              u8,
    pub max_guess_attempts:  u8,
    /// 0 keeps the lobby open until start or cancel.
    pub lobby_timeout_secs:  i64,
    pub payout_weights:      [u16; 10],
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            round_duration_secs: DEFAULT_ROUND_SECS,
            max_points:          DEFAULT_MAX_POINTS,
            min_points:          DEFAULT_MIN_POINTS,
            drawer_bonus:        DEFAULT_DRAWER_BONUS,
            cycles:              DEFAULT_CYCLES,
            max_guess_attempts:  DEFAULT_GUESS_ATTEMPTS,
            lobby_timeout_secs:  DEFAULT_LOBBY_SECS,
            payout_weights:      DEFAULT_PAYOUT_WEIGHTS,
        }
    }
}

impl SessionRules {
    pub fn validate(&self) -> Result<()> {
        require!(
            (MIN_ROUND_SECS..=MAX_ROUND_SECS).contains(&self.round_duration_secs),
            ScribbleError::InvalidParameters
        );
        require!(self.max_points > 0,                    ScribbleError::InvalidParameters);
        require!(self.min_points <= self.max_points,     ScribbleError::InvalidParameters);
        require!((1..=MAX_CYCLES).contains(&self.cycles), ScribbleError::InvalidParameters);
        require!(
            (1..=MAX_GUESS_ATTEMPTS).contains(&self.max_guess_attempts),
            ScribbleError::InvalidParameters
        );
        require!(self.lobby_timeout_secs >= 0,           ScribbleError::InvalidParameters);

        // Rank 1 must always get something and a lower rank never out-earns
        // a higher one; together that keeps every prefix sum positive.
        require!(self.payout_weights[0] > 0,             ScribbleError::InvalidParameters);
        require!(
            self.payout_weights.windows(2).all(|w| w[0] >= w[1]),
            ScribbleError::InvalidParameters
        );
        Ok(())
    }

    pub fn lobby_closes_at(&self, created_at: i64) -> Option<i64> {
        (self.lobby_timeout_secs > 0).then(|| created_at.saturating_add(self.lobby_timeout_secs))
    }
}
