use anchor_lang::prelude::*;

use crate::address::SessionCode;
use crate::payout::{PayoutLine, Standing};
use crate::rules::SessionRules;
use crate::{
    ScribbleError, ACCOUNT_VERSION, MAX_COLOR, MAX_GUESS_ENTRIES, MAX_PARTICIPANTS,
    MAX_STROKES, MAX_STROKE_POINTS, MAX_STROKE_WIDTH, MIN_PARTICIPANTS,
};

// ══════════════════════════════════════════════════════════════════════════
//  SESSION
// ══════════════════════════════════════════════════════════════════════════

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default, InitSpace)]
pub enum SessionStatus {
    #[default]
    Lobby,
    Active,
    Ended,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        match self {
            SessionStatus::Lobby | SessionStatus::Active => false,
            SessionStatus::Ended | SessionStatus::Cancelled => true,
        }
    }
}

/// Caller-supplied fields of a new session.
#[derive(Clone, Copy, Debug)]
pub struct SessionParams {
    pub code:             SessionCode,
    pub creator:          Pubkey,
    pub stake_amount:     u64,
    pub max_participants: u8,
    pub rules:            SessionRules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundAdvance {
    Rotated { round: u16, drawer: Pubkey },
    Complete,
}

// seeds: ["session", code]
#[account]
#[derive(InitSpace, Debug, PartialEq, Default)]
pub struct Session {
    pub version:          u8,
    pub code:             [u8; 6],
    pub creator:          Pubkey,
    pub stake_amount:     u64,
    pub max_participants: u8,
    pub participant_count: u8,
    pub status:           SessionStatus,
    pub rules:            SessionRules,
    /// Identities in join order; drives drawer rotation.
    #[max_len(10)]
    pub roster:           Vec<Pubkey>,
    pub created_at:       i64,
    pub started_at:       i64,
    pub ended_at:         i64,
    pub round:            u16,
    pub total_rounds:     u16,
    pub round_started_at: i64,
    pub word_digest:      [u8; 32],
    pub word_committed:   bool,
    pub correct_guessers: u8,
    pub pool_at_end:      u64,
    pub bump:             u8,
    pub pool_bump:        u8,
}

impl Session {
    pub fn open(&mut self, params: &SessionParams, now: i64) -> Result<()> {
        require!(self.version == 0, ScribbleError::DuplicateSession);
        require!(params.stake_amount > 0, ScribbleError::InvalidParameters);
        require!(
            (MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&params.max_participants),
            ScribbleError::InvalidParameters
        );
        params.rules.validate()?;

        self.version           = ACCOUNT_VERSION;
        self.code              = *params.code.as_bytes();
        self.creator           = params.creator;
        self.stake_amount      = params.stake_amount;
        self.max_participants  = params.max_participants;
        self.participant_count = 0;
        self.status            = SessionStatus::Lobby;
        self.rules             = params.rules;
        self.roster            = Vec::new();
        self.created_at        = now;
        Ok(())
    }

    pub fn session_code(&self) -> Result<SessionCode> {
        SessionCode::try_from(self.code)
    }

    /// What the stake pool must hold while the session is Lobby or Active.
    pub fn expected_pool(&self) -> Result<u64> {
        self.stake_amount
            .checked_mul(self.participant_count as u64)
            .ok_or_else(|| error!(ScribbleError::MathOverflow))
    }

    /// Lobby → Lobby. Returns the new participant's join index.
    pub fn admit(&mut self, identity: Pubkey, now: i64) -> Result<u8> {
        match self.status {
            SessionStatus::Lobby => {}
            SessionStatus::Active | SessionStatus::Ended | SessionStatus::Cancelled => {
                return err!(ScribbleError::WrongStatus)
            }
        }
        require!(!self.roster.contains(&identity), ScribbleError::AlreadyJoined);
        require!(self.participant_count < self.max_participants, ScribbleError::SessionFull);
        if let Some(closes_at) = self.rules.lobby_closes_at(self.created_at) {
            require!(now < closes_at, ScribbleError::LobbyExpired);
        }

        let join_index = self.participant_count;
        self.participant_count = join_index.checked_add(1).ok_or(ScribbleError::MathOverflow)?;
        self.roster.push(identity);
        Ok(join_index)
    }

    /// Lobby → Active. Opens round 0 with the first joiner drawing.
    pub fn start(&mut self, caller: Pubkey, now: i64) -> Result<()> {
        require_keys_eq!(caller, self.creator, ScribbleError::Unauthorized);
        match self.status {
            SessionStatus::Lobby => {}
            SessionStatus::Active | SessionStatus::Ended | SessionStatus::Cancelled => {
                return err!(ScribbleError::WrongStatus)
            }
        }
        require!(self.participant_count >= MIN_PARTICIPANTS, ScribbleError::NotEnoughPlayers);

        self.total_rounds = (self.participant_count as u16)
            .checked_mul(self.rules.cycles as u16)
            .ok_or(ScribbleError::MathOverflow)?;
        self.status = SessionStatus::Active;
        self.started_at = now;
        self.open_round(0, now);
        Ok(())
    }

    /// Lobby → Cancelled. Returns the refund owed to each participant, in
    /// join order.
    pub fn cancel(&mut self, caller: Pubkey, now: i64) -> Result<Vec<(Pubkey, u64)>> {
        require_keys_eq!(caller, self.creator, ScribbleError::Unauthorized);
        match self.status {
            SessionStatus::Lobby => {}
            SessionStatus::Active | SessionStatus::Ended | SessionStatus::Cancelled => {
                return err!(ScribbleError::WrongStatus)
            }
        }
        self.status = SessionStatus::Cancelled;
        self.ended_at = now;
        Ok(self.roster.iter().map(|identity| (*identity, self.stake_amount)).collect())
    }

    fn require_active(&self) -> Result<()> {
        match self.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Lobby | SessionStatus::Ended | SessionStatus::Cancelled => {
                err!(ScribbleError::WrongStatus)
            }
        }
    }

    fn open_round(&mut self, round: u16, now: i64) {
        self.round            = round;
        self.round_started_at = now;
        self.word_digest      = [0u8; 32];
        self.word_committed   = false;
        self.correct_guessers = 0;
    }

    pub fn drawer(&self) -> Result<Pubkey> {
        require!(!self.roster.is_empty(), ScribbleError::NotFound);
        Ok(self.roster[self.round as usize % self.roster.len()])
    }

    pub fn is_participant(&self, identity: &Pubkey) -> bool {
        self.roster.contains(identity)
    }

    pub fn round_deadline(&self) -> i64 {
        self.round_started_at.saturating_add(self.rules.round_duration_secs)
    }

    pub fn round_expired(&self, now: i64) -> bool {
        now >= self.round_deadline()
    }

    pub fn all_guessers_scored(&self) -> bool {
        self.correct_guessers as usize + 1 >= self.roster.len()
    }

    pub fn round_closed(&self, now: i64) -> bool {
        self.round_expired(now) || self.all_guessers_scored()
    }

    pub fn is_final_round(&self) -> bool {
        self.round as u32 + 1 >= self.total_rounds as u32
    }

    /// The drawer fixes this round's secret. The timer restarts so guessers
    /// get the full window against the committed word.
    pub fn commit_word(&mut self, caller: Pubkey, digest: [u8; 32], now: i64) -> Result<()> {
        self.require_active()?;
        require_keys_eq!(caller, self.drawer()?, ScribbleError::Unauthorized);
        require!(!self.word_committed, ScribbleError::WordAlreadyCommitted);
        require!(!self.round_closed(now), ScribbleError::RoundClosed);

        self.word_digest = digest;
        self.word_committed = true;
        self.round_started_at = now;
        Ok(())
    }

    pub fn check_stroke(&self, caller: Pubkey, now: i64) -> Result<()> {
        self.require_active()?;
        require_keys_eq!(caller, self.drawer()?, ScribbleError::Unauthorized);
        require!(!self.round_closed(now), ScribbleError::RoundClosed);
        Ok(())
    }

    /// `scored` is the caller's own flag for the current round. A repeat
    /// guess reports `AlreadyScored` even when that guess closed the round.
    pub fn check_guess(&self, caller: Pubkey, scored: bool, now: i64) -> Result<()> {
        self.require_active()?;
        require!(self.is_participant(&caller), ScribbleError::NotFound);
        require_keys_neq!(caller, self.drawer()?, ScribbleError::DrawerCannotGuess);
        require!(!scored, ScribbleError::AlreadyScored);
        require!(self.word_committed, ScribbleError::WordNotCommitted);
        require!(!self.round_closed(now), ScribbleError::RoundClosed);
        Ok(())
    }

    pub fn record_correct_guess(&mut self) -> Result<()> {
        self.correct_guessers = self
            .correct_guessers
            .checked_add(1)
            .ok_or(ScribbleError::MathOverflow)?;
        Ok(())
    }

    /// Closes the current round. Rotates to the next drawer, or reports
    /// that play is over and [`Session::finish`] must run.
    pub fn advance(&mut self, now: i64) -> Result<RoundAdvance> {
        self.require_active()?;
        require!(self.round_closed(now), ScribbleError::RoundInProgress);
        if self.is_final_round() {
            return Ok(RoundAdvance::Complete);
        }
        let next = self.round.checked_add(1).ok_or(ScribbleError::MathOverflow)?;
        self.open_round(next, now);
        Ok(RoundAdvance::Rotated { round: next, drawer: self.drawer()? })
    }

    /// Active → Ended.
    pub fn finish(&mut self, pool_balance: u64, now: i64) -> Result<()> {
        self.require_active()?;
        require!(
            self.is_final_round() && self.round_closed(now),
            ScribbleError::RoundInProgress
        );
        self.status = SessionStatus::Ended;
        self.ended_at = now;
        self.pool_at_end = pool_balance;
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════
//  STAKE POOL
// ══════════════════════════════════════════════════════════════════════════

// seeds: ["stake_pool", code]
#[account]
#[derive(InitSpace, Debug, PartialEq, Default)]
pub struct StakePool {
    pub version:         u8,
    pub session:         Pubkey,
    pub balance:         u64,
    pub total_deposited: u64,
    pub total_refunded:  u64,
    pub total_paid_out:  u64,
    pub bump:            u8,
}

impl StakePool {
    pub fn open(&mut self, session: Pubkey, bump: u8) {
        self.version = ACCOUNT_VERSION;
        self.session = session;
        self.bump    = bump;
    }

    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        let balance = self.balance.checked_add(amount).ok_or(ScribbleError::MathOverflow)?;
        let deposited = self.total_deposited.checked_add(amount).ok_or(ScribbleError::MathOverflow)?;
        self.balance = balance;
        self.total_deposited = deposited;
        Ok(())
    }

    pub fn refund(&mut self, amount: u64) -> Result<()> {
        let balance = self.debit(amount)?;
        let refunded = self.total_refunded.checked_add(amount).ok_or(ScribbleError::MathOverflow)?;
        self.balance = balance;
        self.total_refunded = refunded;
        Ok(())
    }

    pub fn pay_out(&mut self, amount: u64) -> Result<()> {
        let balance = self.debit(amount)?;
        let paid = self.total_paid_out.checked_add(amount).ok_or(ScribbleError::MathOverflow)?;
        self.balance = balance;
        self.total_paid_out = paid;
        Ok(())
    }

    fn debit(&self, amount: u64) -> Result<u64> {
        self.balance
            .checked_sub(amount)
            .ok_or_else(|| error!(ScribbleError::InsufficientPool))
    }

    /// Escrow invariant for each phase of the session.
    pub fn check_escrow(&self, session: &Session) -> Result<()> {
        match session.status {
            SessionStatus::Lobby | SessionStatus::Active => {
                require!(self.balance == session.expected_pool()?, ScribbleError::AccountingBroken);
            }
            SessionStatus::Ended => {
                require!(self.balance <= session.pool_at_end, ScribbleError::AccountingBroken);
            }
            SessionStatus::Cancelled => {
                require!(self.balance == 0, ScribbleError::AccountingBroken);
            }
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════
//  PARTICIPANT
// ══════════════════════════════════════════════════════════════════════════

// seeds: ["participant", code, identity]
#[account]
#[derive(InitSpace, Debug, PartialEq, Default)]
pub struct Participant {
    pub version:        u8,
    pub session:        Pubkey,
    pub identity:       Pubkey,
    pub join_index:     u8,
    pub score:          u32,
    pub joined_at:      i64,
    // per-round guess bookkeeping, reset whenever guess_round falls behind
    pub guess_round:    u16,
    pub guess_attempts: u8,
    pub scored:         bool,
    pub bump:           u8,
}

impl Participant {
    pub fn open(&mut self, session: Pubkey, identity: Pubkey, join_index: u8, now: i64) -> Result<()> {
        require!(self.version == 0, ScribbleError::AlreadyJoined);
        self.version    = ACCOUNT_VERSION;
        self.session    = session;
        self.identity   = identity;
        self.join_index = join_index;
        self.score      = 0;
        self.joined_at  = now;
        Ok(())
    }

    fn round_state(&self, round: u16) -> (u8, bool) {
        if self.guess_round == round {
            (self.guess_attempts, self.scored)
        } else {
            (0, false)
        }
    }

    pub fn has_scored(&self, round: u16) -> bool {
        self.round_state(round).1
    }

    pub fn check_can_guess(&self, round: u16, rules: &SessionRules) -> Result<()> {
        let (attempts, scored) = self.round_state(round);
        require!(!scored, ScribbleError::AlreadyScored);
        require!(attempts < rules.max_guess_attempts, ScribbleError::GuessLimitReached);
        Ok(())
    }

    /// `points` is `Some` only for a correct guess.
    pub fn record_guess(&mut self, round: u16, points: Option<u32>) -> Result<()> {
        let (attempts, _) = self.round_state(round);
        let score = match points {
            Some(points) => self.score.checked_add(points).ok_or(ScribbleError::MathOverflow)?,
            None => self.score,
        };
        self.guess_round    = round;
        self.guess_attempts = attempts.saturating_add(1);
        self.scored         = points.is_some();
        self.score          = score;
        Ok(())
    }

    pub fn award(&mut self, points: u32) -> Result<()> {
        self.score = self.score.checked_add(points).ok_or(ScribbleError::MathOverflow)?;
        Ok(())
    }

    pub fn standing(&self) -> Standing {
        Standing {
            identity:   self.identity,
            score:      self.score,
            joined_at:  self.joined_at,
            join_index: self.join_index,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
//  CANVAS & GUESS LOGS
// ══════════════════════════════════════════════════════════════════════════

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, InitSpace)]
pub struct Stroke {
    /// Flattened x,y pairs.
    #[max_len(64)]
    pub points:   Vec<u16>,
    pub color:    u32,
    pub width:    u8,
    pub drawn_at: i64,
}

impl Stroke {
    pub fn validate(&self) -> Result<()> {
        require!(!self.points.is_empty(),                  ScribbleError::InvalidParameters);
        require!(self.points.len() % 2 == 0,               ScribbleError::InvalidParameters);
        require!(self.points.len() <= MAX_STROKE_POINTS,   ScribbleError::InvalidParameters);
        require!((1..=MAX_STROKE_WIDTH).contains(&self.width), ScribbleError::InvalidParameters);
        require!(self.color <= MAX_COLOR,                  ScribbleError::InvalidParameters);
        Ok(())
    }
}

// seeds: ["canvas", code]
#[account]
#[derive(InitSpace, Debug, PartialEq, Default)]
pub struct CanvasLog {
    pub version: u8,
    pub session: Pubkey,
    /// Round the strokes belong to; a stroke for a later round starts over.
    pub round:   u16,
    #[max_len(48)]
    pub strokes: Vec<Stroke>,
    pub bump:    u8,
}

impl CanvasLog {
    pub fn open(&mut self, session: Pubkey, bump: u8) {
        self.version = ACCOUNT_VERSION;
        self.session = session;
        self.bump    = bump;
    }

    pub fn strokes_for(&self, round: u16) -> &[Stroke] {
        if self.round == round { &self.strokes } else { &[] }
    }

    pub fn append(&mut self, round: u16, stroke: Stroke) -> Result<()> {
        stroke.validate()?;
        require!(self.strokes_for(round).len() < MAX_STROKES, ScribbleError::CanvasFull);
        if self.round != round {
            self.strokes.clear();
            self.round = round;
        }
        self.strokes.push(stroke);
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, InitSpace)]
pub struct GuessEntry {
    pub identity:       Pubkey,
    /// Empty for correct guesses so the log never reveals the word.
    #[max_len(32)]
    pub submitted_word: String,
    pub submitted_at:   i64,
    pub is_correct:     bool,
    pub points_awarded: u32,
}

// seeds: ["guess_log", code]
#[account]
#[derive(InitSpace, Debug, PartialEq, Default)]
pub struct GuessLog {
    pub version: u8,
    pub session: Pubkey,
    pub round:   u16,
    #[max_len(64)]
    pub guesses: Vec<GuessEntry>,
    pub bump:    u8,
}

impl GuessLog {
    pub fn open(&mut self, session: Pubkey, bump: u8) {
        self.version = ACCOUNT_VERSION;
        self.session = session;
        self.bump    = bump;
    }

    pub fn entries_for(&self, round: u16) -> &[GuessEntry] {
        if self.round == round { &self.guesses } else { &[] }
    }

    pub fn append(&mut self, round: u16, entry: GuessEntry) -> Result<()> {
        require!(self.entries_for(round).len() < MAX_GUESS_ENTRIES, ScribbleError::GuessLogFull);
        if self.round != round {
            self.guesses.clear();
            self.round = round;
        }
        self.guesses.push(entry);
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════
//  PAYOUT
// ══════════════════════════════════════════════════════════════════════════

// seeds: ["payout", code, identity]
#[account]
#[derive(InitSpace, Debug, PartialEq, Default)]
pub struct Payout {
    pub version:    u8,
    pub session:    Pubkey,
    pub identity:   Pubkey,
    pub amount:     u64,
    pub rank:       u8,
    pub score:      u32,
    pub claimed:    bool,
    pub created_at: i64,
    pub claimed_at: i64,
    pub bump:       u8,
}

impl Payout {
    pub fn issue(session: Pubkey, line: &PayoutLine, now: i64, bump: u8) -> Self {
        Self {
            version:    ACCOUNT_VERSION,
            session,
            identity:   line.standing.identity,
            amount:     line.amount,
            rank:       line.rank,
            score:      line.standing.score,
            claimed:    false,
            created_at: now,
            claimed_at: 0,
            bump,
        }
    }

    /// Debits the pool and flips `claimed` together; on any error neither
    /// has changed.
    pub fn claim(&mut self, caller: Pubkey, pool: &mut StakePool, now: i64) -> Result<u64> {
        require_keys_eq!(caller, self.identity, ScribbleError::Unauthorized);
        require!(!self.claimed, ScribbleError::AlreadyClaimed);
        pool.pay_out(self.amount)?;
        self.claimed = true;
        self.claimed_at = now;
        Ok(self.amount)
    }
}
