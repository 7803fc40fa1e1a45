//! Mock ledger for testing and demos.

use super::traits::{LedgerClient, LedgerError, MoveRecord, SubmissionId};
use crate::crypto::verify_move_commitment;
use crate::game::{GameId, GameStatus, Move, MoveState, TurnIndex};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

const DEFAULT_MOVE_TIMEOUT: u64 = 300;

/// State of one mock game
#[derive(Clone, Debug)]
struct MockGame {
    player1: Address,
    player2: Address,
    status: GameStatus,
    turns: HashMap<Address, TurnIndex>,
    moves: HashMap<(TurnIndex, Address), MoveRecord>,
    last_move_at: u64,
}

impl MockGame {
    fn is_player(&self, address: Address) -> bool {
        address == self.player1 || address == self.player2
    }

    fn opponent(&self, address: Address) -> Address {
        if address == self.player1 {
            self.player2
        } else {
            self.player1
        }
    }

    fn turn(&self, player: Address) -> TurnIndex {
        self.turns.get(&player).copied().unwrap_or_default()
    }

    fn slot(&self, turn: TurnIndex, player: Address) -> MoveRecord {
        self.moves.get(&(turn, player)).copied().unwrap_or_default()
    }
}

/// A reveal submission accepted by the mock, kept for test assertions
#[derive(Clone, Debug)]
pub struct RevealCapture {
    pub game_id: GameId,
    pub sender: Address,
    pub game_move: Move,
    pub secret: String,
}

/// In-memory hub with the same rules as the on-chain contract
///
/// Handles are cheap clones sharing one game table; `connect` binds a
/// sender address and yields a `LedgerClient` submitting as that player.
/// Time is a logical clock advanced explicitly by the test.
#[derive(Clone)]
pub struct MockLedger {
    games: Arc<Mutex<HashMap<GameId, MockGame>>>,
    games_count: Arc<Mutex<U256>>,
    clock: Arc<Mutex<u64>>,
    reveals: Arc<Mutex<Vec<RevealCapture>>>,
    timeout_window: u64,
}

impl MockLedger {
    /// Create a hub with the default timeout window
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_MOVE_TIMEOUT)
    }

    /// Create a hub with an explicit timeout window in seconds
    pub fn with_timeout(timeout_window: u64) -> Self {
        Self {
            games: Arc::new(Mutex::new(HashMap::new())),
            games_count: Arc::new(Mutex::new(U256::ZERO)),
            clock: Arc::new(Mutex::new(0)),
            reveals: Arc::new(Mutex::new(Vec::new())),
            timeout_window,
        }
    }

    /// Bind a sender address, yielding a client for that player
    pub fn connect(&self, sender: Address) -> MockLedgerClient {
        MockLedgerClient {
            hub: self.clone(),
            sender,
        }
    }

    /// Advance the hub clock
    pub fn advance_clock(&self, secs: u64) {
        *self.clock.lock().unwrap() += secs;
    }

    /// Current hub time in unix seconds
    pub fn now(&self) -> u64 {
        *self.clock.lock().unwrap()
    }

    /// All reveal submissions accepted so far (for testing)
    pub fn captured_reveals(&self) -> Vec<RevealCapture> {
        self.reveals.lock().unwrap().clone()
    }

    fn with_game<T>(
        &self,
        game_id: GameId,
        read: impl FnOnce(&MockGame) -> T,
    ) -> Result<T, LedgerError> {
        let games = self.games.lock().unwrap();
        games.get(&game_id).map(read).ok_or(LedgerError::GameNotFound)
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender-bound client over a [`MockLedger`]
#[derive(Clone)]
pub struct MockLedgerClient {
    hub: MockLedger,
    sender: Address,
}

impl MockLedgerClient {
    /// The address this client submits as
    pub fn sender(&self) -> Address {
        self.sender
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn games_count(&self) -> Result<U256, LedgerError> {
        Ok(*self.hub.games_count.lock().unwrap())
    }

    async fn create_game(
        &self,
        player1: Address,
        player2: Address,
    ) -> Result<GameId, LedgerError> {
        if player1 == Address::ZERO || player2 == Address::ZERO || player1 == player2 {
            return Err(LedgerError::InvalidPlayer);
        }

        let last_move_at = self.hub.now();
        let mut count = self.hub.games_count.lock().unwrap();
        let game_id = GameId::new(*count);
        *count += U256::from(1);

        self.hub.games.lock().unwrap().insert(
            game_id,
            MockGame {
                player1,
                player2,
                status: GameStatus::InProgress,
                turns: HashMap::new(),
                moves: HashMap::new(),
                last_move_at,
            },
        );

        info!("mock ledger: created game {} ({} vs {})", game_id, player1, player2);
        Ok(game_id)
    }

    async fn player1(&self, game_id: GameId) -> Result<Address, LedgerError> {
        let games = self.hub.games.lock().unwrap();
        Ok(games.get(&game_id).map(|game| game.player1).unwrap_or(Address::ZERO))
    }

    async fn player2(&self, game_id: GameId) -> Result<Address, LedgerError> {
        let games = self.hub.games.lock().unwrap();
        Ok(games.get(&game_id).map(|game| game.player2).unwrap_or(Address::ZERO))
    }

    async fn game_state(&self, game_id: GameId) -> Result<GameStatus, LedgerError> {
        self.hub.with_game(game_id, |game| game.status)
    }

    async fn turn(&self, game_id: GameId, player: Address) -> Result<TurnIndex, LedgerError> {
        self.hub.with_game(game_id, |game| game.turn(player))
    }

    async fn move_record(
        &self,
        game_id: GameId,
        turn: TurnIndex,
        player: Address,
    ) -> Result<MoveRecord, LedgerError> {
        self.hub.with_game(game_id, |game| game.slot(turn, player))
    }

    async fn last_move_timestamp(&self, game_id: GameId) -> Result<u64, LedgerError> {
        self.hub.with_game(game_id, |game| game.last_move_at)
    }

    async fn move_timeout(&self) -> Result<u64, LedgerError> {
        Ok(self.hub.timeout_window)
    }

    async fn play(&self, game_id: GameId, commit_hash: B256) -> Result<SubmissionId, LedgerError> {
        let now = self.hub.now();
        let mut games = self.hub.games.lock().unwrap();
        let game = games.get_mut(&game_id).ok_or(LedgerError::GameNotFound)?;

        if !game.is_player(self.sender) {
            return Err(LedgerError::NotPlayer);
        }
        if game.status == GameStatus::Finished {
            return Err(LedgerError::GameFinished);
        }
        let turn = game.turn(self.sender);
        if game.slot(turn, self.sender).state != MoveState::Empty {
            return Err(LedgerError::AlreadyMoved);
        }

        game.moves.insert(
            (turn, self.sender),
            MoveRecord {
                state: MoveState::Moved,
                commit_hash,
                revealed_move: Move::Paper,
            },
        );
        game.last_move_at = now;

        Ok(SubmissionId::new())
    }

    async fn reveal_move(
        &self,
        game_id: GameId,
        game_move: Move,
        secret: &str,
    ) -> Result<SubmissionId, LedgerError> {
        let now = self.hub.now();
        let mut games = self.hub.games.lock().unwrap();
        let game = games.get_mut(&game_id).ok_or(LedgerError::GameNotFound)?;

        if !game.is_player(self.sender) {
            return Err(LedgerError::NotPlayer);
        }
        if game.status == GameStatus::Finished {
            return Err(LedgerError::GameFinished);
        }
        let turn = game.turn(self.sender);
        let slot = game.slot(turn, self.sender);
        if slot.state != MoveState::Moved {
            return Err(LedgerError::NotMoved);
        }
        if !verify_move_commitment(slot.commit_hash, game_move, secret, self.sender) {
            return Err(LedgerError::IncorrectReveal);
        }

        game.moves.insert(
            (turn, self.sender),
            MoveRecord {
                state: MoveState::Revealed,
                commit_hash: slot.commit_hash,
                revealed_move: game_move,
            },
        );
        game.last_move_at = now;

        self.hub.reveals.lock().unwrap().push(RevealCapture {
            game_id,
            sender: self.sender,
            game_move,
            secret: secret.to_string(),
        });

        // Both players stay on the same turn until the round is decided
        let opponent = game.opponent(self.sender);
        let opponent_slot = game.slot(turn, opponent);
        if opponent_slot.state == MoveState::Revealed {
            if game_move == opponent_slot.revealed_move {
                let next = turn.next();
                game.turns.insert(self.sender, next);
                game.turns.insert(opponent, next);
                info!("mock ledger: game {} turn {} drawn on {}", game_id, turn, game_move);
            } else {
                game.status = GameStatus::Finished;
                let winner = if game_move.beats(opponent_slot.revealed_move) {
                    self.sender
                } else {
                    opponent
                };
                info!("mock ledger: game {} finished, winner {}", game_id, winner);
            }
        }

        Ok(SubmissionId::new())
    }

    async fn claim_timeout(&self, game_id: GameId) -> Result<SubmissionId, LedgerError> {
        let now = self.hub.now();
        let mut games = self.hub.games.lock().unwrap();
        let game = games.get_mut(&game_id).ok_or(LedgerError::GameNotFound)?;

        if !game.is_player(self.sender) {
            return Err(LedgerError::NotPlayer);
        }
        if game.status == GameStatus::Finished {
            return Err(LedgerError::GameFinished);
        }
        if now.saturating_sub(game.last_move_at) <= self.hub.timeout_window {
            return Err(LedgerError::TimeoutNotReached);
        }

        // The claimant must be strictly further along than the opponent
        let turn = game.turn(self.sender);
        let mine = game.slot(turn, self.sender).state;
        let theirs = game.slot(turn, game.opponent(self.sender)).state;
        if mine.wire_value() <= theirs.wire_value() {
            return Err(LedgerError::InvalidWinnerMove);
        }

        game.status = GameStatus::Finished;
        info!("mock ledger: game {} finished by timeout, winner {}", game_id, self.sender);

        Ok(SubmissionId::new())
    }
}
