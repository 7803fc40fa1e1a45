//! Read-side projection of one game from the ledger.

use super::types::{GameId, GameStatus, Move, MoveState, TurnIndex};
use crate::ledger::{LedgerClient, LedgerError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Why a snapshot could not be taken
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The ledger has no such game
    #[error("game not found on the ledger")]
    GameNotFound,
    /// A read failed partway through, so no snapshot is produced
    #[error("ledger state could not be fully read: {0}")]
    Incomplete(#[source] LedgerError),
}

fn classify(err: LedgerError) -> ProjectionError {
    match err {
        LedgerError::GameNotFound => ProjectionError::GameNotFound,
        other => ProjectionError::Incomplete(other),
    }
}

/// One player's position in the current round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub turn: TurnIndex,
    pub move_state: MoveState,
    pub revealed_move: Option<Move>,
}

/// Point-in-time state of one game.
///
/// The reads behind a snapshot are not atomic, so a snapshot taken during
/// a burst of submissions may mix turns. Callers refresh instead of
/// trusting a stale one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub player1: Address,
    pub player2: Address,
    pub status: GameStatus,
    pub per_address: HashMap<Address, PlayerView>,
}

impl GameSnapshot {
    /// The view for an address, empty when nothing was read for it
    pub fn view(&self, address: Address) -> PlayerView {
        self.per_address.get(&address).copied().unwrap_or_default()
    }

    /// Whether the address is one of the two players
    pub fn is_player(&self, address: Address) -> bool {
        address == self.player1 || address == self.player2
    }
}

/// Read the player pair for a game.
///
/// The ledger answers the zero address for games it has never seen, which
/// maps to [`ProjectionError::GameNotFound`].
pub async fn read_players(
    ledger: &dyn LedgerClient,
    game_id: GameId,
) -> Result<(Address, Address), ProjectionError> {
    let player1 = ledger.player1(game_id).await.map_err(classify)?;
    let player2 = ledger.player2(game_id).await.map_err(classify)?;
    if player1 == Address::ZERO || player2 == Address::ZERO {
        return Err(ProjectionError::GameNotFound);
    }
    Ok((player1, player2))
}

/// Assemble a snapshot of one game for the given pair of addresses.
///
/// The pair is usually the local player and the opponent; a spectator
/// passes the two players from [`read_players`].
pub async fn project(
    ledger: &dyn LedgerClient,
    game_id: GameId,
    addresses: [Address; 2],
) -> Result<GameSnapshot, ProjectionError> {
    let (player1, player2) = read_players(ledger, game_id).await?;
    let status = ledger.game_state(game_id).await.map_err(classify)?;

    let mut per_address = HashMap::new();
    for address in addresses {
        let turn = ledger.turn(game_id, address).await.map_err(classify)?;
        let record = ledger.move_record(game_id, turn, address).await.map_err(classify)?;
        per_address.insert(
            address,
            PlayerView {
                turn,
                move_state: record.state,
                revealed_move: (record.state == MoveState::Revealed).then_some(record.revealed_move),
            },
        );
    }

    Ok(GameSnapshot {
        game_id,
        player1,
        player2,
        status,
        per_address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::move_commitment;
    use crate::ledger::{MockLedger, MoveRecord, SubmissionId};
    use alloy_primitives::{B256, U256};
    use async_trait::async_trait;

    const ALICE: Address = Address::repeat_byte(0x11);
    const BOB: Address = Address::repeat_byte(0x22);
    const CAROL: Address = Address::repeat_byte(0x33);

    #[tokio::test]
    async fn test_project_fresh_game() {
        let hub = MockLedger::new();
        let client = hub.connect(ALICE);
        let game_id = client.create_game(ALICE, BOB).await.unwrap();

        let snapshot = project(&client, game_id, [ALICE, BOB]).await.unwrap();
        assert_eq!(snapshot.game_id, game_id);
        assert_eq!(snapshot.player1, ALICE);
        assert_eq!(snapshot.player2, BOB);
        assert_eq!(snapshot.status, GameStatus::InProgress);
        assert!(snapshot.is_player(ALICE));
        assert!(snapshot.is_player(BOB));
        assert!(!snapshot.is_player(CAROL));

        let view = snapshot.view(ALICE);
        assert_eq!(view.turn, TurnIndex::ZERO);
        assert_eq!(view.move_state, MoveState::Empty);
        assert_eq!(view.revealed_move, None);

        // An address outside the pair gets the empty view
        assert_eq!(snapshot.view(CAROL), PlayerView::default());
    }

    #[tokio::test]
    async fn test_project_tracks_commit_and_reveal() {
        let hub = MockLedger::new();
        let client = hub.connect(ALICE);
        let game_id = client.create_game(ALICE, BOB).await.unwrap();

        let commit_hash = move_commitment(Move::Rock, "abcdef", ALICE);
        client.play(game_id, commit_hash).await.unwrap();

        let snapshot = project(&client, game_id, [ALICE, BOB]).await.unwrap();
        assert_eq!(snapshot.view(ALICE).move_state, MoveState::Moved);
        assert_eq!(snapshot.view(ALICE).revealed_move, None);
        assert_eq!(snapshot.view(BOB).move_state, MoveState::Empty);

        client.reveal_move(game_id, Move::Rock, "abcdef").await.unwrap();

        let snapshot = project(&client, game_id, [ALICE, BOB]).await.unwrap();
        assert_eq!(snapshot.view(ALICE).move_state, MoveState::Revealed);
        assert_eq!(snapshot.view(ALICE).revealed_move, Some(Move::Rock));
    }

    #[tokio::test]
    async fn test_project_unknown_game() {
        let hub = MockLedger::new();
        let client = hub.connect(ALICE);

        let result = project(&client, GameId::from(9), [ALICE, BOB]).await;
        assert!(matches!(result, Err(ProjectionError::GameNotFound)));
    }

    /// Fake ledger whose player reads succeed and everything else fails
    struct BrokenLedger;

    fn down() -> LedgerError {
        LedgerError::Transport("connection reset".into())
    }

    #[async_trait]
    impl LedgerClient for BrokenLedger {
        async fn games_count(&self) -> Result<U256, LedgerError> {
            Err(down())
        }

        async fn create_game(
            &self,
            _player1: Address,
            _player2: Address,
        ) -> Result<GameId, LedgerError> {
            Err(down())
        }

        async fn player1(&self, _game_id: GameId) -> Result<Address, LedgerError> {
            Ok(ALICE)
        }

        async fn player2(&self, _game_id: GameId) -> Result<Address, LedgerError> {
            Ok(BOB)
        }

        async fn game_state(&self, _game_id: GameId) -> Result<GameStatus, LedgerError> {
            Err(down())
        }

        async fn turn(&self, _game_id: GameId, _player: Address) -> Result<TurnIndex, LedgerError> {
            Err(down())
        }

        async fn move_record(
            &self,
            _game_id: GameId,
            _turn: TurnIndex,
            _player: Address,
        ) -> Result<MoveRecord, LedgerError> {
            Err(down())
        }

        async fn last_move_timestamp(&self, _game_id: GameId) -> Result<u64, LedgerError> {
            Err(down())
        }

        async fn move_timeout(&self) -> Result<u64, LedgerError> {
            Err(down())
        }

        async fn play(&self, _game_id: GameId, _commit_hash: B256) -> Result<SubmissionId, LedgerError> {
            Err(down())
        }

        async fn reveal_move(
            &self,
            _game_id: GameId,
            _game_move: Move,
            _secret: &str,
        ) -> Result<SubmissionId, LedgerError> {
            Err(down())
        }

        async fn claim_timeout(&self, _game_id: GameId) -> Result<SubmissionId, LedgerError> {
            Err(down())
        }
    }

    #[tokio::test]
    async fn test_partial_read_failure_is_incomplete() {
        let result = project(&BrokenLedger, GameId::from(0), [ALICE, BOB]).await;
        assert!(matches!(result, Err(ProjectionError::Incomplete(_))));
    }
}
