//! Ledger client trait definition.

use crate::game::{GameId, GameStatus, Move, MoveState, TurnIndex};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from ledger operations
///
/// The named variants are the hub contract's revert reasons, surfaced
/// verbatim; `Transport` covers everything beneath the contract.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("player already moved this turn")]
    AlreadyMoved,

    #[error("game is already finished")]
    GameFinished,

    #[error("game not found")]
    GameNotFound,

    #[error("reveal does not match the stored commitment")]
    IncorrectReveal,

    #[error("invalid move value")]
    InvalidMove,

    #[error("invalid player address")]
    InvalidPlayer,

    #[error("claimant has no move to win with")]
    InvalidWinnerMove,

    #[error("player has not moved this turn")]
    NotMoved,

    #[error("sender is not a player in this game")]
    NotPlayer,

    #[error("timeout not reached")]
    TimeoutNotReached,

    #[error("transport error: {0}")]
    Transport(String),
}

/// One move slot as the ledger returns it
///
/// `revealed_move` carries the contract's raw storage value and is only
/// meaningful once `state` is `Revealed`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    pub state: MoveState,
    pub commit_hash: B256,
    pub revealed_move: Move,
}

impl Default for MoveRecord {
    fn default() -> Self {
        Self {
            state: MoveState::Empty,
            commit_hash: B256::ZERO,
            revealed_move: Move::Paper,
        }
    }
}

/// Opaque handle for a dispatched ledger write
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(B256);

impl SubmissionId {
    /// Create a new random submission ID
    pub fn new() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(B256::from(bytes))
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubmissionId({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Trait for move ledger operations
///
/// This trait abstracts the hub contract surface needed by the client.
/// Implementations can be:
/// - MockLedgerClient for testing and demos
/// - an RPC-backed client in the host application
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Total number of games ever created
    async fn games_count(&self) -> Result<U256, LedgerError>;

    /// Create a game between the two players, returning its id
    async fn create_game(&self, player1: Address, player2: Address)
        -> Result<GameId, LedgerError>;

    /// First player of a game; the zero address when the game does not exist
    async fn player1(&self, game_id: GameId) -> Result<Address, LedgerError>;

    /// Second player of a game; the zero address when the game does not exist
    async fn player2(&self, game_id: GameId) -> Result<Address, LedgerError>;

    /// Whether the game is still in progress
    async fn game_state(&self, game_id: GameId) -> Result<GameStatus, LedgerError>;

    /// The player's current turn within the game
    async fn turn(&self, game_id: GameId, player: Address) -> Result<TurnIndex, LedgerError>;

    /// The player's move slot for the given turn
    async fn move_record(
        &self,
        game_id: GameId,
        turn: TurnIndex,
        player: Address,
    ) -> Result<MoveRecord, LedgerError>;

    /// Unix timestamp of the last accepted move in the game
    async fn last_move_timestamp(&self, game_id: GameId) -> Result<u64, LedgerError>;

    /// The contract's timeout window, in seconds
    async fn move_timeout(&self) -> Result<u64, LedgerError>;

    /// Submit a committed move for the current turn
    async fn play(&self, game_id: GameId, commit_hash: B256) -> Result<SubmissionId, LedgerError>;

    /// Reveal the committed move with its secret
    async fn reveal_move(
        &self,
        game_id: GameId,
        game_move: Move,
        secret: &str,
    ) -> Result<SubmissionId, LedgerError>;

    /// Claim a win after the opponent stalled past the timeout window
    async fn claim_timeout(&self, game_id: GameId) -> Result<SubmissionId, LedgerError>;
}
