use anchor_lang::prelude::*;

use crate::ScribbleError;

// ── PDA seeds ─────────────────────────────────────────────────────────────
pub const SESSION_SEED:     &[u8] = b"session";
pub const STAKE_POOL_SEED:  &[u8] = b"stake_pool";
pub const PARTICIPANT_SEED: &[u8] = b"participant";
pub const CANVAS_SEED:      &[u8] = b"canvas";
pub const GUESS_LOG_SEED:   &[u8] = b"guess_log";
pub const PAYOUT_SEED:      &[u8] = b"payout";

pub const CODE_LEN: usize = 6;

/// Six characters from `A-Z0-9`. The only way to obtain one is through
/// validation, so derivation below never has to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionCode([u8; CODE_LEN]);

impl SessionCode {
    pub fn parse(code: &str) -> Result<Self> {
        let bytes: [u8; CODE_LEN] = code
            .as_bytes()
            .try_into()
            .map_err(|_| error!(ScribbleError::InvalidParameters))?;
        Self::try_from(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CODE_LEN] {
        &self.0
    }

    pub fn is_valid_char(c: u8) -> bool {
        c.is_ascii_uppercase() || c.is_ascii_digit()
    }
}

impl TryFrom<[u8; CODE_LEN]> for SessionCode {
    type Error = anchor_lang::error::Error;

    fn try_from(bytes: [u8; CODE_LEN]) -> Result<Self> {
        require!(
            bytes.iter().all(|c| Self::is_valid_char(*c)),
            ScribbleError::InvalidParameters
        );
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for SessionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Validated ASCII, so the lossy path never substitutes anything.
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Every persisted entity of a session. Per-identity kinds carry the
/// identity so a caller cannot forget it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountKind {
    Session,
    StakePool,
    CanvasLog,
    GuessLog,
    Participant(Pubkey),
    Payout(Pubkey),
}

impl AccountKind {
    pub fn seed(&self) -> &'static [u8] {
        match self {
            AccountKind::Session        => SESSION_SEED,
            AccountKind::StakePool      => STAKE_POOL_SEED,
            AccountKind::CanvasLog      => CANVAS_SEED,
            AccountKind::GuessLog       => GUESS_LOG_SEED,
            AccountKind::Participant(_) => PARTICIPANT_SEED,
            AccountKind::Payout(_)      => PAYOUT_SEED,
        }
    }

    pub fn identity(&self) -> Option<&Pubkey> {
        match self {
            AccountKind::Participant(identity) | AccountKind::Payout(identity) => Some(identity),
            AccountKind::Session
            | AccountKind::StakePool
            | AccountKind::CanvasLog
            | AccountKind::GuessLog => None,
        }
    }

    pub fn address(&self, code: &SessionCode) -> (Pubkey, u8) {
        self.address_for(code, &crate::ID)
    }

    pub fn address_for(&self, code: &SessionCode, program_id: &Pubkey) -> (Pubkey, u8) {
        match self.identity() {
            Some(identity) => Pubkey::find_program_address(
                &[self.seed(), code.as_bytes(), identity.as_ref()],
                program_id,
            ),
            None => Pubkey::find_program_address(&[self.seed(), code.as_bytes()], program_id),
        }
    }
}

pub fn session_address(code: &SessionCode) -> Pubkey {
    AccountKind::Session.address(code).0
}

pub fn stake_pool_address(code: &SessionCode) -> Pubkey {
    AccountKind::StakePool.address(code).0
}

pub fn participant_address(code: &SessionCode, identity: &Pubkey) -> Pubkey {
    AccountKind::Participant(*identity).address(code).0
}

pub fn payout_address(code: &SessionCode, identity: &Pubkey) -> Pubkey {
    AccountKind::Payout(*identity).address(code).0
}
