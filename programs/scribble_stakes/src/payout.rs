use anchor_lang::prelude::*;

use crate::ScribbleError;

/// A participant's final line on the scoreboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Standing {
    pub identity:   Pubkey,
    pub score:      u32,
    pub joined_at:  i64,
    pub join_index: u8,
}

/// Score descending; ties go to whoever joined first. `join_index` settles
/// joins that landed in the same second.
pub fn rank_standings(mut standings: Vec<Standing>) -> Vec<Standing> {
    standings.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.joined_at.cmp(&b.joined_at))
            .then(a.join_index.cmp(&b.join_index))
    });
    standings
}

/// Split `pool` across `count` ranks using the first `count` weights.
/// Each share is floored; the leftover units go to rank 1 so the shares
/// always add up to exactly `pool`.
pub fn split_pool(pool: u64, weights: &[u16; 10], count: usize) -> Result<Vec<u64>> {
    require!(count > 0 && count <= weights.len(), ScribbleError::InvalidParameters);

    let weights = &weights[..count];
    let total_weight: u128 = weights.iter().map(|w| *w as u128).sum();
    require!(total_weight > 0, ScribbleError::InvalidParameters);

    let mut shares = Vec::with_capacity(count);
    let mut assigned: u64 = 0;
    for weight in weights {
        // pool * weight / total <= pool, so the narrowing is lossless
        let share = (pool as u128 * *weight as u128 / total_weight) as u64;
        assigned = assigned.checked_add(share).ok_or(ScribbleError::MathOverflow)?;
        shares.push(share);
    }

    let remainder = pool.checked_sub(assigned).ok_or(ScribbleError::MathOverflow)?;
    shares[0] = shares[0].checked_add(remainder).ok_or(ScribbleError::MathOverflow)?;
    Ok(shares)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayoutLine {
    pub standing: Standing,
    /// 1-based.
    pub rank:     u8,
    pub amount:   u64,
}

/// Final ranking with each participant's share of `pool`.
pub fn plan_payouts(standings: Vec<Standing>, pool: u64, weights: &[u16; 10]) -> Result<Vec<PayoutLine>> {
    let ranked = rank_standings(standings);
    let shares = split_pool(pool, weights, ranked.len())?;
    ranked
        .into_iter()
        .zip(shares)
        .enumerate()
        .map(|(i, (standing, amount))| {
            let rank = u8::try_from(i + 1).map_err(|_| error!(ScribbleError::MathOverflow))?;
            Ok(PayoutLine { standing, rank, amount })
        })
        .collect()
}
