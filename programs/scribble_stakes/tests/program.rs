//! Drives the compiled program through LiteSVM. Build it first with
//! `anchor build`; without `target/deploy/scribble_stakes.so` every test here
//! returns early.

use std::path::PathBuf;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::{AccountDeserialize, InstructionData, ToAccountMetas};
use litesvm::types::TransactionResult;
use litesvm::LiteSVM;
use scribble_stakes::address::*;
use scribble_stakes::rules::SessionRules;
use scribble_stakes::scoring::word_digest;
use scribble_stakes::state::*;
use scribble_stakes::ScribbleError;
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::InstructionError;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::{Transaction, TransactionError};

const T0: i64 = 1_700_000_000;
const STAKE: u64 = 100_000_000;
const FUNDING: u64 = 10_000_000_000;

fn program_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/deploy/scribble_stakes.so")
}

struct World {
    svm:     LiteSVM,
    /// Pays every fee so player balances move only by stake, rent and payout.
    house:   Keypair,
    creator: Keypair,
    code:    SessionCode,
}

impl World {
    fn new(code: &str) -> Option<Self> {
        let bytes = match std::fs::read(program_path()) {
            Ok(bytes) => bytes,
            Err(_) => {
                eprintln!("skipping: {} not built", program_path().display());
                return None;
            }
        };
        let mut svm = LiteSVM::new();
        svm.add_program(scribble_stakes::ID, &bytes);

        let house = Keypair::new();
        let creator = Keypair::new();
        svm.airdrop(&house.pubkey(), FUNDING).unwrap();
        svm.airdrop(&creator.pubkey(), FUNDING).unwrap();
        let mut world = Self { svm, house, creator, code: SessionCode::parse(code).unwrap() };
        world.set_time(T0);
        Some(world)
    }

    fn set_time(&mut self, unix_timestamp: i64) {
        let mut clock: Clock = self.svm.get_sysvar();
        clock.unix_timestamp = unix_timestamp;
        self.svm.set_sysvar(&clock);
    }

    fn funded(&mut self, n: usize) -> Vec<Keypair> {
        (0..n)
            .map(|_| {
                let kp = Keypair::new();
                self.svm.airdrop(&kp.pubkey(), FUNDING).unwrap();
                kp
            })
            .collect()
    }

    fn send(&mut self, ixs: &[Instruction], signer: &Keypair) -> TransactionResult {
        let signers: Vec<&Keypair> = if signer.pubkey() == self.house.pubkey() {
            vec![&self.house]
        } else {
            vec![&self.house, signer]
        };
        let tx = Transaction::new_signed_with_payer(
            ixs,
            Some(&self.house.pubkey()),
            &signers,
            self.svm.latest_blockhash(),
        );
        let result = self.svm.send_transaction(tx);
        // identical retries must not be dropped as already processed
        self.svm.expire_blockhash();
        result
    }

    fn ix(&self, accounts: impl ToAccountMetas, data: impl InstructionData) -> Instruction {
        Instruction {
            program_id: scribble_stakes::ID,
            accounts:   accounts.to_account_metas(None),
            data:       data.data(),
        }
    }

    fn load<T: AccountDeserialize>(&self, address: &Pubkey) -> T {
        let account = self.svm.get_account(address).expect("account should exist");
        T::try_deserialize(&mut &account.data[..]).unwrap()
    }

    fn lamports(&self, address: &Pubkey) -> u64 {
        self.svm.get_account(address).map_or(0, |a| a.lamports)
    }

    fn session(&self) -> Session {
        self.load(&session_address(&self.code))
    }

    fn pool(&self) -> StakePool {
        self.load(&stake_pool_address(&self.code))
    }

    // ── instructions ─────────────────────────────────────────────

    fn create(&mut self, max_participants: u8) -> TransactionResult {
        let ix = self.ix(
            scribble_stakes::accounts::CreateSession {
                creator:        self.creator.pubkey(),
                session:        session_address(&self.code),
                stake_pool:     stake_pool_address(&self.code),
                canvas:         AccountKind::CanvasLog.address(&self.code).0,
                guess_log:      AccountKind::GuessLog.address(&self.code).0,
                system_program: anchor_lang::system_program::ID,
            },
            scribble_stakes::instruction::CreateSession {
                code: *self.code.as_bytes(),
                stake_amount: STAKE,
                max_participants,
                rules: None::<SessionRules>,
            },
        );
        let creator = self.creator.insecure_clone();
        self.send(&[ix], &creator)
    }

    fn join_code(&mut self, player: &Keypair, code: &SessionCode) -> TransactionResult {
        let ix = self.ix(
            scribble_stakes::accounts::JoinSession {
                player:         player.pubkey(),
                session:        session_address(code),
                stake_pool:     stake_pool_address(code),
                participant:    participant_address(code, &player.pubkey()),
                system_program: anchor_lang::system_program::ID,
            },
            scribble_stakes::instruction::JoinSession { code: *code.as_bytes() },
        );
        self.send(&[ix], player)
    }

    fn join(&mut self, player: &Keypair) -> TransactionResult {
        let code = self.code;
        self.join_code(player, &code)
    }

    fn start(&mut self, caller: &Keypair) -> TransactionResult {
        let ix = self.ix(
            scribble_stakes::accounts::StartSession {
                creator:    caller.pubkey(),
                session:    session_address(&self.code),
                stake_pool: stake_pool_address(&self.code),
            },
            scribble_stakes::instruction::StartSession {},
        );
        self.send(&[ix], caller)
    }

    fn commit(&mut self, drawer: &Keypair, word: &str) -> TransactionResult {
        let round = self.session().round;
        let ix = self.ix(
            scribble_stakes::accounts::CommitWord {
                drawer:  drawer.pubkey(),
                session: session_address(&self.code),
            },
            scribble_stakes::instruction::CommitWord { digest: word_digest(&self.code, round, word) },
        );
        self.send(&[ix], drawer)
    }

    fn stroke(&mut self, drawer: &Keypair, points: Vec<u16>) -> TransactionResult {
        let ix = self.ix(
            scribble_stakes::accounts::SubmitStroke {
                drawer:  drawer.pubkey(),
                session: session_address(&self.code),
                canvas:  AccountKind::CanvasLog.address(&self.code).0,
            },
            scribble_stakes::instruction::SubmitStroke { points, color: 0x00FF_0000, width: 4 },
        );
        self.send(&[ix], drawer)
    }

    fn guess_crediting(&mut self, guesser: &Keypair, drawer: &Pubkey, word: &str) -> TransactionResult {
        let ix = self.ix(
            scribble_stakes::accounts::SubmitGuess {
                guesser:            guesser.pubkey(),
                session:            session_address(&self.code),
                participant:        participant_address(&self.code, &guesser.pubkey()),
                drawer_participant: participant_address(&self.code, drawer),
                guess_log:          AccountKind::GuessLog.address(&self.code).0,
            },
            scribble_stakes::instruction::SubmitGuess { word: word.to_string() },
        );
        self.send(&[ix], guesser)
    }

    fn guess(&mut self, guesser: &Keypair, word: &str) -> TransactionResult {
        let drawer = self.session().drawer().unwrap();
        self.guess_crediting(guesser, &drawer, word)
    }

    /// `pairs` is the [participant, payout] list for the final round.
    fn end_round(&mut self, pairs: &[Pubkey]) -> TransactionResult {
        let mut ix = self.ix(
            scribble_stakes::accounts::EndRound {
                caller:         self.house.pubkey(),
                session:        session_address(&self.code),
                stake_pool:     stake_pool_address(&self.code),
                system_program: anchor_lang::system_program::ID,
            },
            scribble_stakes::instruction::EndRound {},
        );
        ix.accounts.extend(pairs.iter().map(|k| AccountMeta::new(*k, false)));
        let budget = ComputeBudgetInstruction::set_compute_unit_limit(1_400_000);
        let house = self.house.insecure_clone();
        self.send(&[budget, ix], &house)
    }

    fn settlement_accounts(&self) -> Vec<Pubkey> {
        self.session()
            .roster
            .iter()
            .flat_map(|id| [participant_address(&self.code, id), payout_address(&self.code, id)])
            .collect()
    }

    fn cancel(&mut self, caller: &Keypair, wallets: &[Pubkey]) -> TransactionResult {
        let mut ix = self.ix(
            scribble_stakes::accounts::CancelSession {
                creator:    caller.pubkey(),
                session:    session_address(&self.code),
                stake_pool: stake_pool_address(&self.code),
            },
            scribble_stakes::instruction::CancelSession {},
        );
        ix.accounts.extend(wallets.iter().map(|k| AccountMeta::new(*k, false)));
        self.send(&[ix], caller)
    }

    fn claim(&mut self, claimant: &Keypair, payout_of: &Pubkey) -> TransactionResult {
        let ix = self.ix(
            scribble_stakes::accounts::ClaimPayout {
                claimant:   claimant.pubkey(),
                session:    session_address(&self.code),
                stake_pool: stake_pool_address(&self.code),
                payout:     payout_address(&self.code, payout_of),
            },
            scribble_stakes::instruction::ClaimPayout {},
        );
        self.send(&[ix], claimant)
    }
}

fn assert_fails(result: TransactionResult, expected: ScribbleError) {
    let failed = match result {
        Ok(_) => panic!("expected {expected:?}, transaction succeeded"),
        Err(failed) => failed,
    };
    match failed.err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            assert_eq!(code, u32::from(expected), "expected {expected:?}, logs: {:#?}", failed.meta.logs)
        }
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}

/// Creates a session and joins `n` players at `T0 + 1`.
fn lobby(code: &str, max_participants: u8, n: usize) -> Option<(World, Vec<Keypair>)> {
    let mut world = World::new(code)?;
    world.create(max_participants).unwrap();
    world.set_time(T0 + 1);
    let players = world.funded(n);
    for p in &players {
        world.join(p).unwrap();
    }
    Some((world, players))
}

#[test]
fn lobby_fills_then_starts() {
    let Some((mut world, players)) = lobby("LOBBY1", 4, 4) else { return };
    let pool_key = stake_pool_address(&world.code);
    let rent = world.svm.minimum_balance_for_rent_exemption(8 + StakePool::INIT_SPACE);

    assert_eq!(world.pool().balance, 4 * STAKE);
    assert_eq!(world.lamports(&pool_key), rent + 4 * STAKE);
    assert_eq!(world.session().roster, players.iter().map(|p| p.pubkey()).collect::<Vec<_>>());

    let late = world.funded(1).remove(0);
    assert_fails(world.join(&late), ScribbleError::SessionFull);
    assert_fails(world.join(&players[1]), ScribbleError::AlreadyJoined);
    assert_eq!(world.lamports(&late.pubkey()), FUNDING);

    assert_fails(world.start(&players[0]), ScribbleError::Unauthorized);
    let creator = world.creator.insecure_clone();
    world.start(&creator).unwrap();
    let session = world.session();
    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.total_rounds, 4);
    assert_fails(world.start(&creator), ScribbleError::WrongStatus);
}

#[test]
fn joining_an_unknown_code_is_not_found() {
    let Some(mut world) = World::new("REAL01") else { return };
    world.create(4).unwrap();
    let player = world.funded(1).remove(0);

    let missing = SessionCode::parse("GHOST1").unwrap();
    assert_fails(world.join_code(&player, &missing), ScribbleError::NotFound);
    assert_eq!(world.lamports(&player.pubkey()), FUNDING);
}

#[test]
fn guesses_are_checked_against_the_caller_and_drawer() {
    let Some((mut world, players)) = lobby("GUESS1", 4, 3) else { return };
    let creator = world.creator.insecure_clone();
    world.start(&creator).unwrap();
    world.set_time(T0 + 10);
    world.commit(&players[0], "otter").unwrap();

    // not on the roster, so there is no participant record behind the address
    let outsider = world.funded(1).remove(0);
    assert_fails(world.guess(&outsider, "otter"), ScribbleError::NotFound);

    // bonus must go to the current drawer
    let wrong = players[2].pubkey();
    assert_fails(world.guess_crediting(&players[1], &wrong, "otter"), ScribbleError::InvalidParameters);

    world.stroke(&players[0], vec![10, 10, 40, 40]).unwrap();
    assert_fails(world.stroke(&players[1], vec![5, 5]), ScribbleError::Unauthorized);
    assert_fails(world.stroke(&players[0], vec![5]), ScribbleError::InvalidParameters);
    let canvas: CanvasLog = world.load(&AccountKind::CanvasLog.address(&world.code).0);
    assert_eq!(canvas.strokes_for(0).len(), 1);

    world.set_time(T0 + 20);
    world.guess(&players[1], "seal").unwrap();
    world.guess(&players[1], " Otter").unwrap();
    assert_fails(world.guess(&players[1], "otter"), ScribbleError::AlreadyScored);

    let guesser: Participant = world.load(&participant_address(&world.code, &players[1].pubkey()));
    let drawer: Participant = world.load(&participant_address(&world.code, &players[0].pubkey()));
    assert_eq!(guesser.score, 1_325);
    assert_eq!(drawer.score, 50);

    let log: GuessLog = world.load(&AccountKind::GuessLog.address(&world.code).0);
    let entries = log.entries_for(0);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].submitted_word, "seal");
    assert!(entries[1].is_correct && entries[1].submitted_word.is_empty());
}

#[test]
fn repeat_guess_after_the_round_closes_is_already_scored() {
    let Some((mut world, players)) = lobby("PAIR01", 2, 2) else { return };
    let creator = world.creator.insecure_clone();
    world.start(&creator).unwrap();
    world.commit(&players[0], "kite").unwrap();
    world.guess(&players[1], "kite").unwrap();

    assert!(world.session().round_closed(T0 + 2));
    assert_fails(world.guess(&players[1], "kite"), ScribbleError::AlreadyScored);
}

#[test]
fn ten_player_session_settles_and_pays_everyone() {
    let Some((mut world, players)) = lobby("TENPLY", 10, 10) else { return };
    let creator = world.creator.insecure_clone();
    world.start(&creator).unwrap();
    let pool_key = stake_pool_address(&world.code);
    let pool_rent = world.svm.minimum_balance_for_rent_exemption(8 + StakePool::INIT_SPACE);

    // a stray deposit on a payout address must not block settlement
    let stray = payout_address(&world.code, &players[3].pubkey());
    world.svm.airdrop(&stray, 1_000_000).unwrap();

    world.set_time(T0 + 5);
    world.commit(&players[0], "otter").unwrap();
    world.guess(&players[4], "otter").unwrap();
    world.set_time(T0 + 25);
    world.guess(&players[7], "otter").unwrap();
    assert_fails(world.claim(&players[4], &players[4].pubkey()), ScribbleError::WrongStatus);

    // every later drawer lets the timer run out
    let mut now = T0 + 5;
    for round in 1..10u16 {
        now += 80;
        world.set_time(now);
        world.end_round(&[]).unwrap();
        assert_eq!(world.session().round, round);
    }

    now += 80;
    world.set_time(now);
    let mut pairs = world.settlement_accounts();
    assert_fails(world.end_round(&pairs[..pairs.len() - 2]), ScribbleError::InvalidParameters);
    pairs.swap(0, 2);
    assert_fails(world.end_round(&pairs), ScribbleError::NotFound);
    pairs.swap(0, 2);
    world.end_round(&pairs).unwrap();

    let session = world.session();
    assert_eq!(session.status, SessionStatus::Ended);
    assert_eq!(session.pool_at_end, 10 * STAKE);

    let payouts: Vec<Payout> = players
        .iter()
        .map(|p| world.load(&payout_address(&world.code, &p.pubkey())))
        .collect();
    assert_eq!(payouts.iter().map(|p| p.amount).sum::<u64>(), 10 * STAKE);
    assert_eq!(payouts[4].rank, 1);
    assert_eq!(payouts[7].rank, 2);
    // drawer bonus: 2 × 50, ahead of the zero scores by join order
    assert_eq!(payouts[0].rank, 3);
    assert_eq!(payouts[1].rank, 4);
    assert_eq!(payouts[9].rank, 10);

    assert_fails(world.claim(&players[0], &players[4].pubkey()), ScribbleError::Unauthorized);
    for (player, payout) in players.iter().zip(&payouts) {
        let before = world.lamports(&player.pubkey());
        world.claim(player, &player.pubkey()).unwrap();
        assert_eq!(world.lamports(&player.pubkey()), before + payout.amount);
    }
    assert_fails(world.claim(&players[4], &players[4].pubkey()), ScribbleError::AlreadyClaimed);

    let pool = world.pool();
    assert_eq!(pool.balance, 0);
    assert_eq!(pool.total_paid_out, 10 * STAKE);
    assert_eq!(world.lamports(&pool_key), pool_rent);
}

#[test]
fn claim_without_a_payout_record_is_not_found() {
    let Some((mut world, players)) = lobby("NOPAY1", 2, 2) else { return };
    let creator = world.creator.insecure_clone();
    world.start(&creator).unwrap();
    world.set_time(T0 + 81);
    world.end_round(&[]).unwrap();
    world.set_time(T0 + 161);
    let pairs = world.settlement_accounts();
    world.end_round(&pairs).unwrap();

    let stranger = world.funded(1).remove(0);
    assert_fails(world.claim(&stranger, &stranger.pubkey()), ScribbleError::NotFound);
    world.claim(&players[0], &players[0].pubkey()).unwrap();
}

#[test]
fn cancel_refunds_every_wallet() {
    let Some((mut world, players)) = lobby("CANCEL", 6, 3) else { return };
    let pool_key = stake_pool_address(&world.code);
    let pool_rent = world.svm.minimum_balance_for_rent_exemption(8 + StakePool::INIT_SPACE);
    let before: Vec<u64> = players.iter().map(|p| world.lamports(&p.pubkey())).collect();
    let mut wallets: Vec<Pubkey> = players.iter().map(|p| p.pubkey()).collect();

    let creator = world.creator.insecure_clone();
    assert_fails(world.cancel(&players[0], &wallets), ScribbleError::Unauthorized);
    assert_fails(world.cancel(&creator, &wallets[..2]), ScribbleError::InvalidParameters);
    wallets.swap(0, 1);
    assert_fails(world.cancel(&creator, &wallets), ScribbleError::NotFound);
    wallets.swap(0, 1);
    world.cancel(&creator, &wallets).unwrap();

    for (player, was) in players.iter().zip(before) {
        assert_eq!(world.lamports(&player.pubkey()), was + STAKE);
    }
    assert_eq!(world.session().status, SessionStatus::Cancelled);
    assert_eq!(world.pool().total_refunded, 3 * STAKE);
    assert_eq!(world.lamports(&pool_key), pool_rent);

    let late = world.funded(1).remove(0);
    assert_fails(world.join(&late), ScribbleError::WrongStatus);
}
