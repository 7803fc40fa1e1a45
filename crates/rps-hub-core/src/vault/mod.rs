//! Secret vault: durable storage for commit secrets.
//!
//! A reveal needs the exact move and secret that were hashed into the
//! commitment, so losing them forfeits the round. The vault keeps one
//! record per game and turn, serialized as a single versioned JSON
//! payload in whatever [`StoragePort`] backs it.

mod store;

pub use store::{FileStore, MemoryStore, StorageError, StoragePort};

use crate::crypto::move_commitment;
use crate::game::{GameId, Move, TurnIndex};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// Key under which the vault payload lives in the backend
pub const STORAGE_KEY: &str = "rps_secrets";

const SCHEMA_VERSION: u32 = 1;

/// Failure writing the vault
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("secret vault backend error: {0}")]
    Backend(#[from] StorageError),
    #[error("secret vault payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct VaultPayload {
    schema: u32,
    records: Vec<SecretRecord>,
}

/// One stored commit: everything needed to reveal it later
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub game_id: GameId,
    pub turn: TurnIndex,
    pub game_move: Move,
    pub secret: String,
    pub commit_hash: B256,
}

impl SecretRecord {
    /// Build the record for a commit, deriving the commitment hash from
    /// the move, secret and committing player
    pub fn create(
        game_id: GameId,
        turn: TurnIndex,
        game_move: Move,
        secret: impl Into<String>,
        player: Address,
    ) -> Self {
        let secret = secret.into();
        let commit_hash = move_commitment(game_move, &secret, player);
        Self {
            game_id,
            turn,
            game_move,
            secret,
            commit_hash,
        }
    }
}

// Keep the secret itself out of logs
impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("game_id", &self.game_id)
            .field("turn", &self.turn)
            .field("game_move", &self.game_move)
            .field("secret", &"<redacted>")
            .field("commit_hash", &self.commit_hash)
            .finish()
    }
}

/// Result of looking up the secret for a reveal
#[derive(Clone, Debug, PartialEq)]
pub enum SecretLookup {
    /// A record stored for exactly this game and turn
    Exact(SecretRecord),
    /// No record for this turn, but one exists for the game
    Fallback(SecretRecord),
    /// Nothing stored for the game
    Missing,
}

fn load_records(port: &dyn StoragePort) -> Vec<SecretRecord> {
    let text = match port.get(STORAGE_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("secret vault read failed, treating as empty: {}", err);
            return Vec::new();
        }
    };
    let payload: VaultPayload = match serde_json::from_str(&text) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("secret vault payload is corrupt, treating as empty: {}", err);
            return Vec::new();
        }
    };
    if payload.schema != SCHEMA_VERSION {
        warn!(
            "unknown secret vault schema {}, treating as empty",
            payload.schema
        );
        return Vec::new();
    }
    payload.records
}

fn save_records(port: &mut dyn StoragePort, records: &[SecretRecord]) -> Result<(), VaultError> {
    let payload = VaultPayload {
        schema: SCHEMA_VERSION,
        records: records.to_vec(),
    };
    let text = serde_json::to_string(&payload)?;
    port.set(STORAGE_KEY, &text)?;
    Ok(())
}

/// Vault over a storage port.
///
/// Every operation reads the whole payload, modifies it and writes it
/// back; the port sits behind a mutex so concurrent callers cannot
/// interleave a read-modify-write.
pub struct SecretVault {
    port: Mutex<Box<dyn StoragePort>>,
}

impl SecretVault {
    /// Open a vault over the given backend
    pub fn new(port: impl StoragePort + 'static) -> Self {
        Self {
            port: Mutex::new(Box::new(port)),
        }
    }

    /// Store a record, replacing any existing one for the same game and
    /// turn
    pub fn store(&self, record: SecretRecord) -> Result<(), VaultError> {
        let mut port = self.port.lock().unwrap();
        let mut records = load_records(port.as_ref());
        let existing = records
            .iter_mut()
            .find(|existing| existing.game_id == record.game_id && existing.turn == record.turn);
        match existing {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        save_records(port.as_mut(), &records)
    }

    /// The record stored for a game and turn
    pub fn get(&self, game_id: GameId, turn: TurnIndex) -> Option<SecretRecord> {
        let port = self.port.lock().unwrap();
        load_records(port.as_ref())
            .into_iter()
            .find(|record| record.game_id == game_id && record.turn == turn)
    }

    /// All records stored for a game, oldest first
    pub fn list_by_game(&self, game_id: GameId) -> Vec<SecretRecord> {
        let port = self.port.lock().unwrap();
        load_records(port.as_ref())
            .into_iter()
            .filter(|record| record.game_id == game_id)
            .collect()
    }

    /// The record to reveal with: an exact match for the turn when one
    /// exists, else the oldest record stored for the game.
    ///
    /// The fallback covers records stored under a stale or placeholder
    /// turn number.
    pub fn find_for_reveal(&self, game_id: GameId, turn: TurnIndex) -> SecretLookup {
        let port = self.port.lock().unwrap();
        let records: Vec<SecretRecord> = load_records(port.as_ref())
            .into_iter()
            .filter(|record| record.game_id == game_id)
            .collect();

        if let Some(record) = records.iter().find(|record| record.turn == turn) {
            return SecretLookup::Exact(record.clone());
        }
        match records.into_iter().next() {
            Some(record) => SecretLookup::Fallback(record),
            None => SecretLookup::Missing,
        }
    }

    /// Remove the record for a game and turn; removing a missing record
    /// is not an error
    pub fn delete(&self, game_id: GameId, turn: TurnIndex) -> Result<(), VaultError> {
        let mut port = self.port.lock().unwrap();
        let mut records = load_records(port.as_ref());
        let before = records.len();
        records.retain(|record| !(record.game_id == game_id && record.turn == turn));
        if records.len() == before {
            return Ok(());
        }
        save_records(port.as_mut(), &records)
    }

    /// Drop the whole payload from the backend
    pub fn clear_all(&self) -> Result<(), VaultError> {
        let mut port = self.port.lock().unwrap();
        port.remove(STORAGE_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    const PLAYER: Address = Address::repeat_byte(0x11);

    fn record(game: u64, turn: u64, game_move: Move, secret: &str) -> SecretRecord {
        SecretRecord::create(
            GameId::from(game),
            TurnIndex::from(turn),
            game_move,
            secret,
            PLAYER,
        )
    }

    #[test]
    fn test_store_and_get_round_trip() {
        let vault = SecretVault::new(MemoryStore::new());
        let stored = SecretRecord::create(
            GameId::from((1u64 << 60) + 7),
            TurnIndex::new(U256::from(1) << 100),
            Move::Rock,
            "abcdef",
            PLAYER,
        );

        vault.store(stored.clone()).unwrap();
        let loaded = vault
            .get(stored.game_id, stored.turn)
            .expect("record was stored");
        assert_eq!(loaded, stored);
        assert_eq!(loaded.commit_hash, move_commitment(Move::Rock, "abcdef", PLAYER));

        assert_eq!(vault.get(stored.game_id, TurnIndex::ZERO), None);
        assert_eq!(vault.get(GameId::from(0), stored.turn), None);
    }

    #[test]
    fn test_store_replaces_in_place() {
        let vault = SecretVault::new(MemoryStore::new());
        vault.store(record(1, 0, Move::Rock, "abcdef")).unwrap();
        vault.store(record(1, 1, Move::Paper, "ghijkl")).unwrap();

        let replacement = record(1, 0, Move::Scissors, "mnopqr");
        vault.store(replacement.clone()).unwrap();

        let records = vault.list_by_game(GameId::from(1));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], replacement);
        assert_eq!(records[1].turn, TurnIndex::from(1));
    }

    #[test]
    fn test_list_by_game_scopes_to_game() {
        let vault = SecretVault::new(MemoryStore::new());
        vault.store(record(1, 0, Move::Rock, "abcdef")).unwrap();
        vault.store(record(2, 0, Move::Paper, "ghijkl")).unwrap();
        vault.store(record(1, 1, Move::Scissors, "mnopqr")).unwrap();

        let records = vault.list_by_game(GameId::from(1));
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.game_id == GameId::from(1)));

        assert_eq!(vault.list_by_game(GameId::from(3)), Vec::new());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let vault = SecretVault::new(MemoryStore::new());
        vault.store(record(1, 0, Move::Rock, "abcdef")).unwrap();
        vault.store(record(1, 1, Move::Paper, "ghijkl")).unwrap();

        vault.delete(GameId::from(1), TurnIndex::ZERO).unwrap();
        assert_eq!(vault.get(GameId::from(1), TurnIndex::ZERO), None);
        assert!(vault.get(GameId::from(1), TurnIndex::from(1)).is_some());

        vault.delete(GameId::from(1), TurnIndex::ZERO).unwrap();
    }

    #[test]
    fn test_clear_all_drops_the_payload() {
        let backend = MemoryStore::new();
        let vault = SecretVault::new(backend.clone());
        vault.store(record(1, 0, Move::Rock, "abcdef")).unwrap();
        assert!(backend.raw(STORAGE_KEY).is_some());

        vault.clear_all().unwrap();
        assert_eq!(backend.raw(STORAGE_KEY), None);
        assert_eq!(vault.list_by_game(GameId::from(1)), Vec::new());
    }

    #[test]
    fn test_find_for_reveal_prefers_exact_match() {
        let vault = SecretVault::new(MemoryStore::new());
        let zero = record(1, 0, Move::Rock, "abcdef");
        let one = record(1, 1, Move::Paper, "ghijkl");
        vault.store(zero.clone()).unwrap();
        vault.store(one.clone()).unwrap();

        assert_eq!(
            vault.find_for_reveal(GameId::from(1), TurnIndex::from(1)),
            SecretLookup::Exact(one)
        );

        // No record for turn 5, the oldest one for the game steps in
        assert_eq!(
            vault.find_for_reveal(GameId::from(1), TurnIndex::from(5)),
            SecretLookup::Fallback(zero)
        );

        assert_eq!(
            vault.find_for_reveal(GameId::from(9), TurnIndex::ZERO),
            SecretLookup::Missing
        );
    }

    #[test]
    fn test_corrupt_payload_treated_as_empty() {
        let backend = MemoryStore::new();
        backend.put_raw(STORAGE_KEY, "{definitely not json");

        let vault = SecretVault::new(backend.clone());
        assert_eq!(vault.get(GameId::from(1), TurnIndex::ZERO), None);

        // The next write repairs the payload
        let fresh = record(1, 0, Move::Rock, "abcdef");
        vault.store(fresh.clone()).unwrap();
        assert_eq!(vault.get(GameId::from(1), TurnIndex::ZERO), Some(fresh));
    }

    #[test]
    fn test_unknown_schema_treated_as_empty() {
        let backend = MemoryStore::new();
        let vault = SecretVault::new(backend.clone());
        vault.store(record(1, 0, Move::Rock, "abcdef")).unwrap();

        let bumped = backend
            .raw(STORAGE_KEY)
            .unwrap()
            .replace("\"schema\":1", "\"schema\":2");
        backend.put_raw(STORAGE_KEY, &bumped);

        assert_eq!(vault.get(GameId::from(1), TurnIndex::ZERO), None);
    }

    #[test]
    fn test_payload_wire_format() {
        let backend = MemoryStore::new();
        let vault = SecretVault::new(backend.clone());
        vault.store(record(7, 0, Move::Scissors, "abcdef")).unwrap();

        let raw = backend.raw(STORAGE_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schema"], 1);
        assert_eq!(value["records"][0]["game_id"], "7");
        assert_eq!(value["records"][0]["turn"], "0");
        assert_eq!(value["records"][0]["game_move"], 2);
        assert_eq!(value["records"][0]["secret"], "abcdef");
    }

    struct FailingStore;

    impl StoragePort for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("disk full".into()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("disk full".into()))
        }
    }

    #[test]
    fn test_backend_write_failure_surfaces() {
        let vault = SecretVault::new(FailingStore);
        let result = vault.store(record(1, 0, Move::Rock, "abcdef"));
        assert!(matches!(result, Err(VaultError::Backend(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let printed = format!("{:?}", record(1, 0, Move::Rock, "hunter2secret"));
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("hunter2secret"));
    }
}
