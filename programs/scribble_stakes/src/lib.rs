use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::{invoke, invoke_signed};
use anchor_lang::solana_program::system_instruction;
use anchor_lang::solana_program::system_program;

pub mod address;
pub mod payout;
pub mod rules;
pub mod scoring;
pub mod state;

use address::*;
use payout::{plan_payouts, PayoutLine};
use rules::SessionRules;
use scoring::{points_for_elapsed, validate_word, word_digest};
use state::*;

declare_id!("GSzpPmvTG3zwMHaVKcbCmZenD9bFoegnB2kPubuX5kXk");

#[cfg(not(feature = "no-entrypoint"))]
use solana_security_txt::security_txt;

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name: "Scribble Stakes",
    project_url: "https://scribblestakes.app",
    contacts: "email:security@scribblestakes.app",
    policy: "https://scribblestakes.app/security",
    preferred_languages: "en",
    auditors: "Unaudited"
}

// ── Constants ─────────────────────────────────────────────────────────────
pub const ACCOUNT_VERSION:    u8    = 1;
pub const MIN_PARTICIPANTS:   u8    = 2;
pub const MAX_PARTICIPANTS:   u8    = 10;
pub const MAX_GUESS_ATTEMPTS: u8    = 7;
pub const MAX_WORD_LEN:       usize = 32;       // bytes, after trimming

// ── Log capacities ────────────────────────────────────────────────────────
// Guess log: at most 9 guessers × 7 attempts = 63 entries per round, so a
// round can never overflow it. Canvas holds one round of strokes.
pub const MAX_STROKES:        usize = 48;
pub const MAX_STROKE_POINTS:  usize = 64;       // flattened x,y
pub const MAX_STROKE_WIDTH:   u8    = 20;
pub const MAX_COLOR:          u32   = 0x00FF_FFFF;
pub const MAX_GUESS_ENTRIES:  usize = 64;

#[program]
pub mod scribble_stakes {
    use super::*;

    // ── Create ────────────────────────────────────────────────────
    pub fn create_session(
        ctx: Context<CreateSession>,
        code: [u8; 6],
        stake_amount: u64,
        max_participants: u8,
        rules: Option<SessionRules>,
    ) -> Result<Pubkey> {
        let code = SessionCode::try_from(code)?;
        let now = Clock::get()?.unix_timestamp;
        let session_key = ctx.accounts.session.key();
        let params = SessionParams {
            code,
            creator: ctx.accounts.creator.key(),
            stake_amount,
            max_participants,
            rules: rules.unwrap_or_default(),
        };

        let session = &mut ctx.accounts.session;
        session.open(&params, now)?;
        session.bump      = ctx.bumps.session;
        session.pool_bump = ctx.bumps.stake_pool;

        ctx.accounts.stake_pool.open(session_key, ctx.bumps.stake_pool);
        ctx.accounts.canvas.open(session_key, ctx.bumps.canvas);
        ctx.accounts.guess_log.open(session_key, ctx.bumps.guess_log);

        emit!(SessionCreated {
            session: session_key,
            code: *code.as_bytes(),
            creator: params.creator,
            stake_amount,
            max_participants,
        });
        msg!("Session {} created: stake {} × {}", code, stake_amount, max_participants);
        Ok(session_key)
    }

    // ── Join (deposits the stake) ─────────────────────────────────
    //
    // Addressed by code so an unknown code reports NotFound instead of an
    // account-validation failure.
    pub fn join_session(ctx: Context<JoinSession>, code: [u8; 6]) -> Result<Pubkey> {
        SessionCode::try_from(code)?;
        let now = Clock::get()?.unix_timestamp;
        let player_key = ctx.accounts.player.key();
        let session_key = ctx.accounts.session.key();
        let participant_key = ctx.accounts.participant.key();
        let session_ai = ctx.accounts.session.to_account_info();
        let pool_ai = ctx.accounts.stake_pool.to_account_info();

        let mut session: Session = load_record(&session_ai)?;
        let mut pool: StakePool = load_record(&pool_ai)?;
        require_keys_eq!(pool.session, session_key, ScribbleError::NotFound);

        let join_index = session.admit(player_key, now)?;
        let stake = session.stake_amount;

        let participant = &mut ctx.accounts.participant;
        participant.open(session_key, player_key, join_index, now)?;
        participant.bump = ctx.bumps.participant;

        let ix = system_instruction::transfer(&player_key, &pool_ai.key(), stake);
        invoke(&ix, &[ctx.accounts.player.to_account_info(), pool_ai.clone()])?;

        pool.deposit(stake)?;
        pool.check_escrow(&session)?;
        verify_pool_backing(&pool, &pool_ai)?;
        store_record(&session, &session_ai)?;
        store_record(&pool, &pool_ai)?;

        emit!(PlayerJoined {
            session: session_key,
            player: player_key,
            join_index,
            participant_count: session.participant_count,
            pool_balance: pool.balance,
        });
        Ok(participant_key)
    }

    // ── Start (creator only) ──────────────────────────────────────
    pub fn start_session(ctx: Context<StartSession>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let session_key = ctx.accounts.session.key();
        let session = &mut ctx.accounts.session;
        session.start(ctx.accounts.creator.key(), now)?;
        ctx.accounts.stake_pool.check_escrow(session)?;

        emit!(SessionStarted {
            session: session_key,
            participants: session.participant_count,
            total_rounds: session.total_rounds,
            first_drawer: session.drawer()?,
        });
        Ok(())
    }

    // ── Drawer fixes the round's word (Blake3 commitment) ────────
    pub fn commit_word(ctx: Context<CommitWord>, digest: [u8; 32]) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let session_key = ctx.accounts.session.key();
        let drawer = ctx.accounts.drawer.key();
        let session = &mut ctx.accounts.session;
        session.commit_word(drawer, digest, now)?;

        emit!(WordCommitted {
            session: session_key,
            round: session.round,
            drawer,
            deadline: session.round_deadline(),
        });
        Ok(())
    }

    // ── Draw ──────────────────────────────────────────────────────
    pub fn submit_stroke(ctx: Context<SubmitStroke>, points: Vec<u16>, color: u32, width: u8) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let drawer = ctx.accounts.drawer.key();
        let session = &ctx.accounts.session;
        session.check_stroke(drawer, now)?;

        let round = session.round;
        let point_count = u16::try_from(points.len()).map_err(|_| error!(ScribbleError::InvalidParameters))?;
        let canvas = &mut ctx.accounts.canvas;
        canvas.append(round, Stroke { points, color, width, drawn_at: now })?;

        emit!(StrokeAdded {
            session: session.key(),
            round,
            drawer,
            stroke_index: canvas.strokes.len() as u16 - 1,
            color,
            width,
            point_count,
        });
        Ok(())
    }

    // ── Guess ─────────────────────────────────────────────────────
    pub fn submit_guess(ctx: Context<SubmitGuess>, word: String) -> Result<GuessOutcome> {
        let now = Clock::get()?.unix_timestamp;
        let guesser = ctx.accounts.guesser.key();
        let session_key = ctx.accounts.session.key();

        let participant_ai = ctx.accounts.participant.to_account_info();
        let mut participant: Participant = load_record(&participant_ai)?;
        require!(
            participant.session == session_key && participant.identity == guesser,
            ScribbleError::NotFound
        );

        let session = &mut ctx.accounts.session;
        let round = session.round;
        let rules = session.rules;
        session.check_guess(guesser, participant.has_scored(round), now)?;
        require_keys_eq!(
            ctx.accounts.drawer_participant.identity,
            session.drawer()?,
            ScribbleError::InvalidParameters
        );
        let word = validate_word(&word)?;
        participant.check_can_guess(round, &rules)?;

        let correct = word_digest(&session.session_code()?, round, word) == session.word_digest;
        let points = if correct {
            points_for_elapsed(&rules, now.saturating_sub(session.round_started_at))
        } else {
            0
        };

        ctx.accounts.guess_log.append(round, GuessEntry {
            identity:       guesser,
            submitted_word: if correct { String::new() } else { word.to_string() },
            submitted_at:   now,
            is_correct:     correct,
            points_awarded: points,
        })?;
        participant.record_guess(round, correct.then_some(points))?;
        store_record(&participant, &participant_ai)?;
        if correct {
            ctx.accounts.drawer_participant.award(rules.drawer_bonus)?;
            session.record_correct_guess()?;
        }

        emit!(GuessSubmitted { session: session_key, round, player: guesser, correct, points });
        Ok(GuessOutcome { correct, points })
    }

    // ── Close the round; the last one settles the session ────────
    //
    // Permissionless. On the final round remaining_accounts must hold one
    // [participant, payout] pair per roster entry, in join order. The caller
    // pays rent for the payout records.
    pub fn end_round<'info>(ctx: Context<'_, '_, 'info, 'info, EndRound<'info>>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let session_key = ctx.accounts.session.key();

        match ctx.accounts.session.advance(now)? {
            RoundAdvance::Rotated { round, drawer } => {
                emit!(RoundAdvanced {
                    session: session_key,
                    round,
                    drawer,
                    deadline: ctx.accounts.session.round_deadline(),
                });
                Ok(())
            }
            RoundAdvance::Complete => settle_session(
                &mut ctx.accounts.session,
                &ctx.accounts.stake_pool,
                &ctx.accounts.caller.to_account_info(),
                &ctx.accounts.system_program.to_account_info(),
                ctx.remaining_accounts,
                now,
            ),
        }
    }

    // ── Cancel (creator, lobby only), refunds everyone ───────────
    //
    // remaining_accounts: every roster wallet, writable, in join order.
    pub fn cancel_session<'info>(ctx: Context<'_, '_, 'info, 'info, CancelSession<'info>>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let session_key = ctx.accounts.session.key();
        let refunds = ctx.accounts.session.cancel(ctx.accounts.creator.key(), now)?;
        require!(ctx.remaining_accounts.len() == refunds.len(), ScribbleError::InvalidParameters);

        let pool = &mut ctx.accounts.stake_pool;
        let pool_ai = pool.to_account_info();
        let mut refunded: u64 = 0;
        for ((identity, amount), wallet) in refunds.iter().zip(ctx.remaining_accounts.iter()) {
            require_keys_eq!(wallet.key(), *identity, ScribbleError::NotFound);
            pool.refund(*amount)?;
            move_lamports(&pool_ai, wallet, *amount)?;
            refunded = refunded.checked_add(*amount).ok_or(ScribbleError::MathOverflow)?;
            emit!(StakeRefunded { session: session_key, player: *identity, amount: *amount });
        }
        pool.check_escrow(&ctx.accounts.session)?;
        verify_pool_backing(pool, &pool_ai)?;

        emit!(SessionCancelled {
            session: session_key,
            participants: refunds.len() as u8,
            refunded,
        });
        Ok(())
    }

    // ── Claim (payout identity only, exactly once) ────────────────
    pub fn claim_payout(ctx: Context<ClaimPayout>) -> Result<u64> {
        let now = Clock::get()?.unix_timestamp;
        let claimant = ctx.accounts.claimant.key();
        let session = &ctx.accounts.session;
        let session_key = session.key();
        require!(session.status == SessionStatus::Ended, ScribbleError::WrongStatus);

        let payout_ai = ctx.accounts.payout.to_account_info();
        let mut payout: Payout = load_record(&payout_ai)?;
        require_keys_eq!(payout.session, session_key, ScribbleError::NotFound);
        let bump_seed = [payout.bump];
        let seeds: &[&[u8]] = &[PAYOUT_SEED, &session.code, payout.identity.as_ref(), &bump_seed];
        let expected = Pubkey::create_program_address(seeds, &crate::ID)
            .map_err(|_| error!(ScribbleError::NotFound))?;
        require_keys_eq!(payout_ai.key(), expected, ScribbleError::NotFound);

        let pool = &mut ctx.accounts.stake_pool;
        let amount = payout.claim(claimant, pool, now)?;
        store_record(&payout, &payout_ai)?;
        let pool_ai = pool.to_account_info();
        move_lamports(&pool_ai, &ctx.accounts.claimant.to_account_info(), amount)?;
        pool.check_escrow(session)?;
        verify_pool_backing(pool, &pool_ai)?;

        emit!(PayoutClaimed { session: session_key, player: claimant, rank: payout.rank, amount });
        Ok(amount)
    }
}

// ══════════════════════════════════════════════════════════════════════════
//  HELPERS
// ══════════════════════════════════════════════════════════════════════════

/// Physical lamports above rent must always cover the recorded balance.
fn verify_pool_backing(pool: &StakePool, pool_ai: &AccountInfo) -> Result<()> {
    let rent = Rent::get()?.minimum_balance(pool_ai.data_len());
    let physical = pool_ai.lamports().saturating_sub(rent);
    require!(physical >= pool.balance, ScribbleError::AccountingBroken);
    Ok(())
}

/// Reads a program-owned record by hand. Missing or foreign accounts are
/// reported as NotFound rather than as an account-validation failure.
fn load_record<T: AccountDeserialize>(info: &AccountInfo) -> Result<T> {
    require!(*info.owner == crate::ID && !info.data_is_empty(), ScribbleError::NotFound);
    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..])
}

fn store_record<T: AccountSerialize>(record: &T, info: &AccountInfo) -> Result<()> {
    let mut data = info.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data[..];
    record.try_serialize(&mut writer)
}

/// Direct lamport move out of a program-owned account.
fn move_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let from_balance = from.lamports().checked_sub(amount).ok_or(ScribbleError::InsufficientPool)?;
    let to_balance = to.lamports().checked_add(amount).ok_or(ScribbleError::MathOverflow)?;
    **from.try_borrow_mut_lamports()? = from_balance;
    **to.try_borrow_mut_lamports()?   = to_balance;
    Ok(())
}

/// Creates a program-owned PDA. An address somebody already sent lamports
/// to cannot go through create_account, so it is topped up, allocated and
/// assigned instead.
fn create_pda_account<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system: &AccountInfo<'info>,
    space: usize,
    signer_seeds: &[&[u8]],
) -> Result<()> {
    let rent = Rent::get()?.minimum_balance(space);
    let current = target.lamports();

    if current == 0 {
        let ix = system_instruction::create_account(payer.key, target.key, rent, space as u64, &crate::ID);
        invoke_signed(&ix, &[payer.clone(), target.clone(), system.clone()], &[signer_seeds])?;
        return Ok(());
    }

    require!(
        target.data_is_empty() && *target.owner == system_program::ID,
        ScribbleError::InvalidParameters
    );
    let top_up = rent.saturating_sub(current);
    if top_up > 0 {
        let ix = system_instruction::transfer(payer.key, target.key, top_up);
        invoke(&ix, &[payer.clone(), target.clone(), system.clone()])?;
    }
    let ix = system_instruction::allocate(target.key, space as u64);
    invoke_signed(&ix, &[target.clone(), system.clone()], &[signer_seeds])?;
    let ix = system_instruction::assign(target.key, &crate::ID);
    invoke_signed(&ix, &[target.clone(), system.clone()], &[signer_seeds])?;
    Ok(())
}

/// Active → Ended. Reads every score, ranks, splits the pool and writes one
/// Payout record per participant. Nothing moves out of the pool here; each
/// winner pulls their share with claim_payout.
fn settle_session<'info>(
    session: &mut Account<'info, Session>,
    pool: &Account<'info, StakePool>,
    payer: &AccountInfo<'info>,
    system: &AccountInfo<'info>,
    remaining: &'info [AccountInfo<'info>],
    now: i64,
) -> Result<()> {
    let code = session.session_code()?;
    let roster = session.roster.clone();
    require!(remaining.len() == roster.len() * 2, ScribbleError::InvalidParameters);
    pool.check_escrow(session)?;
    verify_pool_backing(pool, &pool.to_account_info())?;

    // Only this program writes Participant records, one per (session,
    // identity), so matching both fields pins the account without a PDA search.
    let session_key = session.key();
    let mut standings = Vec::with_capacity(roster.len());
    for (slot, identity) in roster.iter().enumerate() {
        let participant: Participant = load_record(&remaining[slot * 2])?;
        require!(
            participant.session == session_key && participant.identity == *identity,
            ScribbleError::NotFound
        );
        standings.push(participant.standing());
    }

    let pool_balance = pool.balance;
    let lines = plan_payouts(standings, pool_balance, &session.rules.payout_weights)?;
    for line in &lines {
        let slot = roster
            .iter()
            .position(|k| *k == line.standing.identity)
            .ok_or(ScribbleError::NotFound)?;
        issue_payout(session_key, &code, line, &remaining[slot * 2 + 1], payer, system, now)?;
    }

    session.finish(pool_balance, now)?;
    emit!(SessionEnded {
        session: session_key,
        pool: pool_balance,
        winner: lines.first().map(|l| l.standing.identity).unwrap_or_default(),
        rounds_played: session.total_rounds,
    });
    msg!("Session {} ended: {} lamports across {} payouts", code, pool_balance, lines.len());
    Ok(())
}

fn issue_payout<'info>(
    session_key: Pubkey,
    code: &SessionCode,
    line: &PayoutLine,
    payout_ai: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system: &AccountInfo<'info>,
    now: i64,
) -> Result<()> {
    let identity = line.standing.identity;
    let (expected, bump) = AccountKind::Payout(identity).address(code);
    require_keys_eq!(payout_ai.key(), expected, ScribbleError::NotFound);

    let bump_seed = [bump];
    let seeds: &[&[u8]] = &[PAYOUT_SEED, code.as_bytes(), identity.as_ref(), &bump_seed];
    create_pda_account(payer, payout_ai, system, 8 + Payout::INIT_SPACE, seeds)?;

    store_record(&Payout::issue(session_key, line, now, bump), payout_ai)?;

    emit!(PayoutIssued { session: session_key, player: identity, rank: line.rank, amount: line.amount });
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════
//  ACCOUNTS
// ══════════════════════════════════════════════════════════════════════════

#[derive(Accounts)]
#[instruction(code: [u8; 6])]
pub struct CreateSession<'info> {
    #[account(mut)] pub creator: Signer<'info>,
    #[account(init_if_needed, payer = creator, space = 8 + Session::INIT_SPACE,
              seeds = [SESSION_SEED, code.as_ref()], bump)]
    pub session: Box<Account<'info, Session>>,
    #[account(init_if_needed, payer = creator, space = 8 + StakePool::INIT_SPACE,
              seeds = [STAKE_POOL_SEED, code.as_ref()], bump)]
    pub stake_pool: Box<Account<'info, StakePool>>,
    #[account(init_if_needed, payer = creator, space = 8 + CanvasLog::INIT_SPACE,
              seeds = [CANVAS_SEED, code.as_ref()], bump)]
    pub canvas: Box<Account<'info, CanvasLog>>,
    #[account(init_if_needed, payer = creator, space = 8 + GuessLog::INIT_SPACE,
              seeds = [GUESS_LOG_SEED, code.as_ref()], bump)]
    pub guess_log: Box<Account<'info, GuessLog>>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(code: [u8; 6])]
pub struct JoinSession<'info> {
    #[account(mut)] pub player: Signer<'info>,
    /// CHECK: address pinned by seeds; deserialized in the handler, which
    /// reports a missing session as NotFound.
    #[account(mut, seeds = [SESSION_SEED, code.as_ref()], bump)]
    pub session: UncheckedAccount<'info>,
    /// CHECK: address pinned by seeds; deserialized in the handler.
    #[account(mut, seeds = [STAKE_POOL_SEED, code.as_ref()], bump)]
    pub stake_pool: UncheckedAccount<'info>,
    #[account(init_if_needed, payer = player, space = 8 + Participant::INIT_SPACE,
              seeds = [PARTICIPANT_SEED, code.as_ref(), player.key().as_ref()], bump)]
    pub participant: Account<'info, Participant>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct StartSession<'info> {
    pub creator: Signer<'info>,
    #[account(mut, seeds = [SESSION_SEED, session.code.as_ref()], bump = session.bump)]
    pub session: Box<Account<'info, Session>>,
    #[account(seeds = [STAKE_POOL_SEED, session.code.as_ref()], bump = session.pool_bump)]
    pub stake_pool: Account<'info, StakePool>,
}

#[derive(Accounts)]
pub struct CommitWord<'info> {
    pub drawer: Signer<'info>,
    #[account(mut, seeds = [SESSION_SEED, session.code.as_ref()], bump = session.bump)]
    pub session: Box<Account<'info, Session>>,
}

#[derive(Accounts)]
pub struct SubmitStroke<'info> {
    pub drawer: Signer<'info>,
    #[account(seeds = [SESSION_SEED, session.code.as_ref()], bump = session.bump)]
    pub session: Box<Account<'info, Session>>,
    #[account(mut, seeds = [CANVAS_SEED, session.code.as_ref()], bump = canvas.bump)]
    pub canvas: Box<Account<'info, CanvasLog>>,
}

#[derive(Accounts)]
pub struct SubmitGuess<'info> {
    pub guesser: Signer<'info>,
    #[account(mut, seeds = [SESSION_SEED, session.code.as_ref()], bump = session.bump)]
    pub session: Box<Account<'info, Session>>,
    /// CHECK: address pinned by seeds; deserialized in the handler, which
    /// reports a non-participant as NotFound.
    #[account(mut, seeds = [PARTICIPANT_SEED, session.code.as_ref(), guesser.key().as_ref()], bump)]
    pub participant: UncheckedAccount<'info>,
    /// Receives the drawer bonus; must be the current drawer's record.
    #[account(mut, seeds = [PARTICIPANT_SEED, session.code.as_ref(), drawer_participant.identity.as_ref()],
              bump = drawer_participant.bump)]
    pub drawer_participant: Account<'info, Participant>,
    #[account(mut, seeds = [GUESS_LOG_SEED, session.code.as_ref()], bump = guess_log.bump)]
    pub guess_log: Box<Account<'info, GuessLog>>,
}

#[derive(Accounts)]
pub struct EndRound<'info> {
    #[account(mut)] pub caller: Signer<'info>,
    #[account(mut, seeds = [SESSION_SEED, session.code.as_ref()], bump = session.bump)]
    pub session: Box<Account<'info, Session>>,
    #[account(seeds = [STAKE_POOL_SEED, session.code.as_ref()], bump = session.pool_bump)]
    pub stake_pool: Account<'info, StakePool>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct CancelSession<'info> {
    pub creator: Signer<'info>,
    #[account(mut, seeds = [SESSION_SEED, session.code.as_ref()], bump = session.bump)]
    pub session: Box<Account<'info, Session>>,
    #[account(mut, seeds = [STAKE_POOL_SEED, session.code.as_ref()], bump = session.pool_bump)]
    pub stake_pool: Account<'info, StakePool>,
}

#[derive(Accounts)]
pub struct ClaimPayout<'info> {
    #[account(mut)] pub claimant: Signer<'info>,
    #[account(seeds = [SESSION_SEED, session.code.as_ref()], bump = session.bump)]
    pub session: Box<Account<'info, Session>>,
    #[account(mut, seeds = [STAKE_POOL_SEED, session.code.as_ref()], bump = session.pool_bump)]
    pub stake_pool: Account<'info, StakePool>,
    /// CHECK: owner, session and PDA address are verified in the handler
    /// once the session is known to have ended.
    #[account(mut)]
    pub payout: UncheckedAccount<'info>,
}

// ── Return values ─────────────────────────────────────────────────────────
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuessOutcome {
    pub correct: bool,
    pub points:  u32,
}

// ══════════════════════════════════════════════════════════════════════════
//  ERRORS & EVENTS
// ══════════════════════════════════════════════════════════════════════════

#[error_code]
pub enum ScribbleError {
    #[msg("Invalid parameters")]
    InvalidParameters,
    #[msg("A session with this code already exists")]
    DuplicateSession,
    #[msg("Session is full")]
    SessionFull,
    #[msg("Already joined this session")]
    AlreadyJoined,
    #[msg("Session is not in the required status")]
    WrongStatus,
    #[msg("Caller is not allowed to do this")]
    Unauthorized,
    #[msg("Not enough players to start (min 2)")]
    NotEnoughPlayers,
    #[msg("Already guessed correctly this round")]
    AlreadyScored,
    #[msg("Payout already claimed")]
    AlreadyClaimed,
    #[msg("Stake pool cannot cover this transfer")]
    InsufficientPool,
    #[msg("Account or participant not found")]
    NotFound,
    #[msg("Lobby join window has closed")]
    LobbyExpired,
    #[msg("Round is closed")]
    RoundClosed,
    #[msg("Round is still in progress")]
    RoundInProgress,
    #[msg("Drawer has not committed a word yet")]
    WordNotCommitted,
    #[msg("Word already committed for this round")]
    WordAlreadyCommitted,
    #[msg("The drawer cannot guess")]
    DrawerCannotGuess,
    #[msg("No guess attempts left this round")]
    GuessLimitReached,
    #[msg("Canvas is full for this round")]
    CanvasFull,
    #[msg("Guess log is full for this round")]
    GuessLogFull,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Accounting invariant broken")]
    AccountingBroken,
}

#[event] pub struct SessionCreated   { pub session: Pubkey, pub code: [u8; 6], pub creator: Pubkey, pub stake_amount: u64, pub max_participants: u8 }
#[event] pub struct PlayerJoined     { pub session: Pubkey, pub player: Pubkey, pub join_index: u8, pub participant_count: u8, pub pool_balance: u64 }
#[event] pub struct SessionStarted   { pub session: Pubkey, pub participants: u8, pub total_rounds: u16, pub first_drawer: Pubkey }
#[event] pub struct WordCommitted    { pub session: Pubkey, pub round: u16, pub drawer: Pubkey, pub deadline: i64 }
#[event] pub struct StrokeAdded      { pub session: Pubkey, pub round: u16, pub drawer: Pubkey, pub stroke_index: u16, pub color: u32, pub width: u8, pub point_count: u16 }
#[event] pub struct GuessSubmitted   { pub session: Pubkey, pub round: u16, pub player: Pubkey, pub correct: bool, pub points: u32 }
#[event] pub struct RoundAdvanced    { pub session: Pubkey, pub round: u16, pub drawer: Pubkey, pub deadline: i64 }
#[event] pub struct PayoutIssued     { pub session: Pubkey, pub player: Pubkey, pub rank: u8, pub amount: u64 }
#[event] pub struct SessionEnded     { pub session: Pubkey, pub pool: u64, pub winner: Pubkey, pub rounds_played: u16 }
#[event] pub struct StakeRefunded    { pub session: Pubkey, pub player: Pubkey, pub amount: u64 }
#[event] pub struct SessionCancelled { pub session: Pubkey, pub participants: u8, pub refunded: u64 }
#[event] pub struct PayoutClaimed    { pub session: Pubkey, pub player: Pubkey, pub rank: u8, pub amount: u64 }
