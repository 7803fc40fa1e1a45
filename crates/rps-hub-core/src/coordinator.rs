//! Orchestrates ledger submissions, the secret vault and state
//! reconciliation for one local player.

use crate::crypto::{validate_secret, MIN_SECRET_LEN};
use crate::game::{
    can_claim_timeout, project, read_players, resolve, Action, GameId, GameSnapshot, Move,
    ProjectionError, TurnIndex,
};
use crate::ledger::{LedgerClient, LedgerError, SubmissionId};
use crate::vault::{SecretLookup, SecretRecord, SecretVault};
use alloy_primitives::{Address, B256, U256};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

/// Input rejected before anything is submitted
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("secret must be at least {} characters", MIN_SECRET_LEN)]
    SecretTooShort,
    #[error("cannot create a game against yourself")]
    SelfPlay,
}

/// Failure of a coordinator operation
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),
    #[error("a submission for this game is already in flight")]
    SubmissionInFlight,
    #[error("no stored secret for game {0}")]
    NoStoredSecret(GameId),
}

/// Outcome of a commit submission
#[derive(Clone, Debug)]
pub struct CommitReceipt {
    /// Handle for the ledger submission
    pub submission: SubmissionId,
    /// Turn the secret was stored under
    pub turn: TurnIndex,
    /// Commitment hash sent to the ledger
    pub commit_hash: B256,
    /// False when the vault write failed; the reveal will need the move
    /// and secret entered by hand
    pub persisted: bool,
}

/// A refreshed snapshot together with the resolved next step
#[derive(Clone, Debug)]
pub struct Resolution {
    pub snapshot: GameSnapshot,
    pub action: Action,
}

/// Client-side orchestrator for one player.
///
/// Owns the secret vault and tracks which games have a submission in
/// flight, so a second submission cannot race the first before a
/// reconcile has seen the ledger's answer.
pub struct GameCoordinator {
    ledger: Arc<dyn LedgerClient>,
    vault: SecretVault,
    local: Address,
    in_flight: Mutex<HashSet<GameId>>,
}

impl GameCoordinator {
    pub fn new(ledger: Arc<dyn LedgerClient>, vault: SecretVault, local: Address) -> Self {
        Self {
            ledger,
            vault,
            local,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The address this coordinator submits for
    pub fn local_address(&self) -> Address {
        self.local
    }

    /// Direct vault access, mainly for tests and tooling
    pub fn vault(&self) -> &SecretVault {
        &self.vault
    }

    /// Open a game against `opponent` and return its ledger id
    pub async fn create_game(&self, opponent: Address) -> Result<GameId, CoordinatorError> {
        if opponent == self.local {
            return Err(ValidationError::SelfPlay.into());
        }
        let game_id = self.ledger.create_game(self.local, opponent).await?;
        info!("created game {} against {}", game_id, opponent);
        Ok(game_id)
    }

    /// Number of games the ledger has created so far
    pub async fn games_count(&self) -> Result<U256, CoordinatorError> {
        Ok(self.ledger.games_count().await?)
    }

    /// Refresh one game from the ledger and decide the next step.
    ///
    /// Clears the in-flight marker for the game first: a reconcile reads
    /// the ledger's answer to whatever was submitted, so a new submission
    /// is allowed afterwards.
    pub async fn reconcile(&self, game_id: GameId) -> Result<Resolution, CoordinatorError> {
        self.end_submission(game_id);

        let (player1, player2) = read_players(self.ledger.as_ref(), game_id).await?;
        let addresses = if self.local == player1 {
            [self.local, player2]
        } else if self.local == player2 {
            [self.local, player1]
        } else {
            [player1, player2]
        };
        let snapshot = project(self.ledger.as_ref(), game_id, addresses).await?;

        let view = snapshot.view(self.local);
        let secret = match self.vault.find_for_reveal(game_id, view.turn) {
            SecretLookup::Exact(record) | SecretLookup::Fallback(record) => Some(record),
            SecretLookup::Missing => None,
        };
        let action = resolve(&snapshot, self.local, secret.as_ref());

        Ok(Resolution { snapshot, action })
    }

    /// Commit a move: store the secret, then submit the commitment.
    ///
    /// The secret is stored before the submission so a crash between the
    /// two leaves a recoverable record rather than an unrevealable
    /// commit. A vault failure does not block the submission; the receipt
    /// reports it so the caller can warn the player to note the secret.
    pub async fn commit_move(
        &self,
        game_id: GameId,
        game_move: Move,
        secret: &str,
    ) -> Result<CommitReceipt, CoordinatorError> {
        if !validate_secret(secret) {
            return Err(ValidationError::SecretTooShort.into());
        }
        self.begin_submission(game_id)?;

        let turn = match self.ledger.turn(game_id, self.local).await {
            Ok(turn) => turn,
            Err(err) => {
                warn!("turn read failed before commit, storing under turn 0: {}", err);
                TurnIndex::ZERO
            }
        };

        let record = SecretRecord::create(game_id, turn, game_move, secret, self.local);
        let commit_hash = record.commit_hash;
        let persisted = match self.vault.store(record) {
            Ok(()) => true,
            Err(err) => {
                warn!("secret vault write failed, reveal will need manual entry: {}", err);
                false
            }
        };

        match self.ledger.play(game_id, commit_hash).await {
            Ok(submission) => {
                info!("move committed for game {} turn {}", game_id, turn);
                Ok(CommitReceipt {
                    submission,
                    turn,
                    commit_hash,
                    persisted,
                })
            }
            Err(err) => {
                // The stored secret stays; re-committing overwrites it
                self.end_submission(game_id);
                Err(err.into())
            }
        }
    }

    /// Reveal the committed move using the stored secret
    pub async fn reveal_move(&self, game_id: GameId) -> Result<SubmissionId, CoordinatorError> {
        self.begin_submission(game_id)?;
        match self.dispatch_reveal(game_id).await {
            Ok(submission) => Ok(submission),
            Err(err) => {
                self.end_submission(game_id);
                Err(err)
            }
        }
    }

    async fn dispatch_reveal(&self, game_id: GameId) -> Result<SubmissionId, CoordinatorError> {
        let turn = self.ledger.turn(game_id, self.local).await?;
        let record = match self.vault.find_for_reveal(game_id, turn) {
            SecretLookup::Exact(record) => record,
            SecretLookup::Fallback(record) => {
                warn!(
                    "no secret stored for game {} turn {}, using the record from turn {}",
                    game_id, turn, record.turn
                );
                record
            }
            SecretLookup::Missing => return Err(CoordinatorError::NoStoredSecret(game_id)),
        };

        let submission = self
            .ledger
            .reveal_move(game_id, record.game_move, &record.secret)
            .await?;
        info!("move revealed for game {} turn {}", game_id, turn);

        // The secret has served its purpose; a failed delete only leaves
        // a stale record behind
        if let Err(err) = self.vault.delete(record.game_id, record.turn) {
            warn!("failed to clear revealed secret from the vault: {}", err);
        }

        Ok(submission)
    }

    /// Reveal with an explicitly supplied move and secret, for when the
    /// vault has no usable record
    pub async fn reveal_move_manual(
        &self,
        game_id: GameId,
        game_move: Move,
        secret: &str,
    ) -> Result<SubmissionId, CoordinatorError> {
        if !validate_secret(secret) {
            return Err(ValidationError::SecretTooShort.into());
        }
        self.begin_submission(game_id)?;
        match self.ledger.reveal_move(game_id, game_move, secret).await {
            Ok(submission) => {
                info!("move revealed manually for game {}", game_id);
                Ok(submission)
            }
            Err(err) => {
                self.end_submission(game_id);
                Err(err.into())
            }
        }
    }

    /// Claim the win after the opponent stalled past the timeout window
    pub async fn claim_timeout(&self, game_id: GameId) -> Result<SubmissionId, CoordinatorError> {
        self.begin_submission(game_id)?;
        match self.ledger.claim_timeout(game_id).await {
            Ok(submission) => {
                info!("timeout win claimed for game {}", game_id);
                Ok(submission)
            }
            Err(err) => {
                self.end_submission(game_id);
                Err(err.into())
            }
        }
    }

    /// Whether a timeout claim would be accepted at `now` (unix seconds)
    pub async fn timeout_claimable(
        &self,
        game_id: GameId,
        now: u64,
    ) -> Result<bool, CoordinatorError> {
        let last_move_at = self.ledger.last_move_timestamp(game_id).await?;
        let window = self.ledger.move_timeout().await?;
        Ok(can_claim_timeout(last_move_at, window, now))
    }

    fn begin_submission(&self, game_id: GameId) -> Result<(), CoordinatorError> {
        let mut in_flight = self.in_flight.lock().unwrap();
        if !in_flight.insert(game_id) {
            return Err(CoordinatorError::SubmissionInFlight);
        }
        Ok(())
    }

    fn end_submission(&self, game_id: GameId) {
        self.in_flight.lock().unwrap().remove(&game_id);
    }
}
