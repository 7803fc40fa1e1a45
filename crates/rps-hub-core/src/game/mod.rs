//! Game rules and state handling.
//!
//! - Wire types shared with the hub contract
//! - Snapshot projection from ledger reads
//! - Resolution of a snapshot into the local player's next step
//! - Timeout window arithmetic

mod resolver;
mod snapshot;
mod timeout;
mod types;

pub use resolver::{resolve, Action};
pub use snapshot::{project, read_players, GameSnapshot, PlayerView, ProjectionError};
pub use timeout::can_claim_timeout;
pub use types::{
    round_winner, GameId, GameStatus, Move, MoveState, ParseIdError, RoundWinner, TurnIndex,
    WireError,
};
