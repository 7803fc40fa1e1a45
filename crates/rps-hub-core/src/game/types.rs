//! Core game types shared with the hub contract.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A numeric value that does not map to any variant of a wire enum
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unknown {kind} wire value: {value}")]
pub struct WireError {
    kind: &'static str,
    value: u8,
}

impl WireError {
    fn new(kind: &'static str, value: u8) -> Self {
        Self { kind, value }
    }
}

/// A playable move.
///
/// The discriminants are the contract's GameMove values and feed the move
/// commitment, so the order here must never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Move {
    Paper = 0,
    Rock = 1,
    Scissors = 2,
}

impl Move {
    /// All moves, in wire order
    pub const ALL: [Move; 3] = [Move::Paper, Move::Rock, Move::Scissors];

    /// The value sent over the wire
    pub fn wire_value(self) -> u8 {
        self as u8
    }

    /// Decode a wire value
    pub fn from_wire(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(Move::Paper),
            1 => Ok(Move::Rock),
            2 => Ok(Move::Scissors),
            value => Err(WireError::new("move", value)),
        }
    }

    /// Check if this move beats the other
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors)
                | (Move::Scissors, Move::Paper)
                | (Move::Paper, Move::Rock)
        )
    }
}

impl From<Move> for u8 {
    fn from(game_move: Move) -> u8 {
        game_move.wire_value()
    }
}

impl TryFrom<u8> for Move {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Move::from_wire(value)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Paper => "Paper",
            Move::Rock => "Rock",
            Move::Scissors => "Scissors",
        };
        write!(f, "{}", name)
    }
}

/// State of one player's move slot for a turn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveState {
    #[default]
    Empty = 0,
    Moved = 1,
    Revealed = 2,
}

impl MoveState {
    pub fn wire_value(self) -> u8 {
        self as u8
    }

    pub fn from_wire(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(MoveState::Empty),
            1 => Ok(MoveState::Moved),
            2 => Ok(MoveState::Revealed),
            value => Err(WireError::new("move state", value)),
        }
    }
}

/// Whether the ledger considers a game decided
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress = 0,
    Finished = 1,
}

impl GameStatus {
    pub fn wire_value(self) -> u8 {
        self as u8
    }

    pub fn from_wire(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(GameStatus::InProgress),
            1 => Ok(GameStatus::Finished),
            value => Err(WireError::new("game status", value)),
        }
    }
}

/// Identifier that failed to parse as a decimal or 0x-prefixed number
#[derive(Clone, Debug, Error)]
#[error("invalid identifier: {0}")]
pub struct ParseIdError(String);

/// Ledger-assigned game identifier
///
/// Serialized as decimal text so values beyond the f64-safe integer range
/// survive JSON round trips.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(#[serde(with = "u256_decimal")] U256);

impl GameId {
    /// Create from a raw ledger value
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    /// Get the underlying value
    pub fn value(&self) -> U256 {
        self.0
    }
}

impl From<u64> for GameId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for GameId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.parse::<U256>().map_err(|err| ParseIdError(err.to_string()))?;
        Ok(Self(value))
    }
}

impl fmt::Debug for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameId({})", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-player turn counter within a game
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurnIndex(#[serde(with = "u256_decimal")] U256);

impl TurnIndex {
    pub const ZERO: TurnIndex = TurnIndex(U256::ZERO);

    /// Create from a raw ledger value
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    /// Get the underlying value
    pub fn value(&self) -> U256 {
        self.0
    }

    /// The following turn
    pub fn next(&self) -> TurnIndex {
        Self(self.0 + U256::from(1))
    }
}

impl From<u64> for TurnIndex {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for TurnIndex {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.parse::<U256>().map_err(|err| ParseIdError(err.to_string()))?;
        Ok(Self(value))
    }
}

impl fmt::Debug for TurnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TurnIndex({})", self.0)
    }
}

impl fmt::Display for TurnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round outcome seen from the local player's side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundWinner {
    You,
    Opponent,
    Draw,
}

/// Decide a round from the local player's perspective
pub fn round_winner(mine: Move, theirs: Move) -> RoundWinner {
    if mine == theirs {
        RoundWinner::Draw
    } else if mine.beats(theirs) {
        RoundWinner::You
    } else {
        RoundWinner::Opponent
    }
}

mod u256_decimal {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        value.to_string().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let text = String::deserialize(d)?;
        text.parse::<U256>().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_wire_values() {
        assert_eq!(Move::Paper.wire_value(), 0);
        assert_eq!(Move::Rock.wire_value(), 1);
        assert_eq!(Move::Scissors.wire_value(), 2);

        for game_move in Move::ALL {
            assert_eq!(Move::from_wire(game_move.wire_value()).unwrap(), game_move);
        }
        assert!(Move::from_wire(3).is_err());
    }

    #[test]
    fn test_move_state_wire_values() {
        for state in [MoveState::Empty, MoveState::Moved, MoveState::Revealed] {
            assert_eq!(MoveState::from_wire(state.wire_value()).unwrap(), state);
        }
        assert!(MoveState::from_wire(9).is_err());
        assert_eq!(MoveState::default(), MoveState::Empty);
    }

    #[test]
    fn test_game_status_wire_values() {
        assert_eq!(GameStatus::from_wire(0).unwrap(), GameStatus::InProgress);
        assert_eq!(GameStatus::from_wire(1).unwrap(), GameStatus::Finished);
        assert!(GameStatus::from_wire(2).is_err());
    }

    #[test]
    fn test_beats_cycle() {
        assert!(Move::Rock.beats(Move::Scissors));
        assert!(Move::Scissors.beats(Move::Paper));
        assert!(Move::Paper.beats(Move::Rock));

        assert!(!Move::Scissors.beats(Move::Rock));
        assert!(!Move::Paper.beats(Move::Scissors));
        assert!(!Move::Rock.beats(Move::Paper));
    }

    #[test]
    fn test_round_winner_all_outcomes() {
        // All 9 combinations
        let mut you = 0;
        let mut opponent = 0;
        let mut draws = 0;

        for mine in Move::ALL {
            for theirs in Move::ALL {
                match round_winner(mine, theirs) {
                    RoundWinner::You => you += 1,
                    RoundWinner::Opponent => opponent += 1,
                    RoundWinner::Draw => draws += 1,
                }
            }
        }

        assert_eq!(you, 3);
        assert_eq!(opponent, 3);
        assert_eq!(draws, 3);
    }

    #[test]
    fn test_round_winner_is_symmetric() {
        for mine in Move::ALL {
            for theirs in Move::ALL {
                let here = round_winner(mine, theirs);
                let there = round_winner(theirs, mine);
                match here {
                    RoundWinner::You => assert_eq!(there, RoundWinner::Opponent),
                    RoundWinner::Opponent => assert_eq!(there, RoundWinner::You),
                    RoundWinner::Draw => assert_eq!(there, RoundWinner::Draw),
                }
            }
        }
    }

    #[test]
    fn test_move_display_names() {
        assert_eq!(Move::Paper.to_string(), "Paper");
        assert_eq!(Move::Rock.to_string(), "Rock");
        assert_eq!(Move::Scissors.to_string(), "Scissors");
    }

    #[test]
    fn test_move_serde_uses_wire_value() {
        let encoded = serde_json::to_string(&Move::Scissors).unwrap();
        assert_eq!(encoded, "2");
        let decoded: Move = serde_json::from_str("0").unwrap();
        assert_eq!(decoded, Move::Paper);
        assert!(serde_json::from_str::<Move>("7").is_err());
    }

    #[test]
    fn test_game_id_decimal_round_trip() {
        // Beyond the f64-safe integer range
        let id = GameId::from((1u64 << 60) + 7);
        assert_eq!(id.value(), U256::from((1u64 << 60) + 7));
        assert_eq!(id.to_string(), "1152921504606846983");
        assert_eq!("1152921504606846983".parse::<GameId>().unwrap(), id);

        // Beyond u64 entirely
        let wide = GameId::new(U256::from(1) << 200);
        let text = wide.to_string();
        assert_eq!(text.parse::<GameId>().unwrap(), wide);
        assert!("not a number".parse::<GameId>().is_err());
    }

    #[test]
    fn test_game_id_serde_is_decimal_text() {
        let id = GameId::from((1u64 << 60) + 7);
        let encoded = serde_json::to_string(&id).unwrap();
        assert_eq!(encoded, "\"1152921504606846983\"");
        let decoded: GameId = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, id);
    }

    #[test]
    fn test_turn_index_next() {
        let turn = TurnIndex::ZERO;
        assert_eq!(turn.next(), TurnIndex::from(1));
        assert_eq!(turn.next().next(), TurnIndex::from(2));

        let wide = TurnIndex::new(U256::from(u64::MAX));
        assert_eq!(wide.next().value(), U256::from(u64::MAX) + U256::from(1));
    }
}
