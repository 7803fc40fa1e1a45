//! Decide what the local player should do next.

use super::snapshot::{GameSnapshot, PlayerView};
use super::types::{round_winner, GameStatus, MoveState, RoundWinner};
use crate::vault::SecretRecord;
use alloy_primitives::Address;

/// Next step for the local player in one game
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// No move committed yet for this round
    SelectMove,
    /// Committed, waiting for the opponent to commit
    AwaitOpponentCommit,
    /// Both sides committed and the stored secret is at hand
    ReadyToReveal(SecretRecord),
    /// Both sides committed but the vault has no secret, so the player
    /// must re-enter move and secret by hand
    NeedManualReveal,
    /// Revealed, waiting for the opponent to reveal
    AwaitOpponentReveal,
    /// The round is decided; the score is only known when both moves
    /// were revealed
    Finished { winner: Option<RoundWinner> },
    /// The local address is not one of the players
    SpectatorView,
}

/// Resolve a snapshot into the next step for `local`.
///
/// `secret` is the vault record found for the current round, when one
/// exists.
pub fn resolve(snapshot: &GameSnapshot, local: Address, secret: Option<&SecretRecord>) -> Action {
    if !snapshot.is_player(local) {
        return Action::SpectatorView;
    }
    let opponent = if local == snapshot.player1 {
        snapshot.player2
    } else {
        snapshot.player1
    };
    let mine = snapshot.view(local);
    let theirs = snapshot.view(opponent);

    if snapshot.status == GameStatus::Finished {
        return Action::Finished {
            winner: score(mine, theirs),
        };
    }

    match mine.move_state {
        MoveState::Empty => Action::SelectMove,
        MoveState::Moved => match theirs.move_state {
            MoveState::Empty => Action::AwaitOpponentCommit,
            MoveState::Moved | MoveState::Revealed => match secret {
                Some(record) => Action::ReadyToReveal(record.clone()),
                None => Action::NeedManualReveal,
            },
        },
        MoveState::Revealed => match theirs.move_state {
            MoveState::Empty | MoveState::Moved => Action::AwaitOpponentReveal,
            // The opponent's reveal can be visible before a status read
            // reflects the decided game
            MoveState::Revealed => Action::Finished {
                winner: score(mine, theirs),
            },
        },
    }
}

/// Score from the local perspective; unknown until both moves are visible
fn score(mine: PlayerView, theirs: PlayerView) -> Option<RoundWinner> {
    match (mine.revealed_move, theirs.revealed_move) {
        (Some(me), Some(them)) => Some(round_winner(me, them)),
        _ => None,
    }
}
