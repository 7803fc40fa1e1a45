//! Client core for the RPS game hub.
//!
//! The hub contract holds the games; this crate holds everything a
//! player's client needs around it: move commitments and their secrets,
//! a vault that keeps those secrets until reveal time, snapshot
//! projection of ledger state, and a coordinator that turns it all into
//! commit, reveal and timeout submissions.

pub mod coordinator;
pub mod crypto;
pub mod game;
pub mod ledger;
pub mod vault;

pub use coordinator::{
    CommitReceipt, CoordinatorError, GameCoordinator, Resolution, ValidationError,
};
pub use crypto::{
    commitment_payload, generate_secret, move_commitment, validate_secret,
    verify_move_commitment, MIN_SECRET_LEN,
};
pub use game::{
    can_claim_timeout, project, read_players, resolve, round_winner, Action, GameId,
    GameSnapshot, GameStatus, Move, MoveState, ParseIdError, PlayerView, ProjectionError,
    RoundWinner, TurnIndex, WireError,
};
pub use ledger::{
    LedgerClient, LedgerError, MockLedger, MockLedgerClient, MoveRecord, RevealCapture,
    SubmissionId,
};
pub use vault::{
    FileStore, MemoryStore, SecretLookup, SecretRecord, SecretVault, StorageError, StoragePort,
    VaultError, STORAGE_KEY,
};
