//! RPS Hub Demo
//!
//! Two players drive a full commit-reveal round against the in-process
//! mock ledger: create, commit, reveal, settle. Each tick reconciles a
//! player's view and performs whatever step it calls for, the way a
//! polling client would against the real hub.

use std::sync::Arc;

use alloy_primitives::Address;
use rps_hub_core::{
    generate_secret, Action, GameCoordinator, GameId, MemoryStore, MockLedger, Move, RoundWinner,
    SecretVault,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn coordinator(hub: &MockLedger, address: Address) -> GameCoordinator {
    GameCoordinator::new(
        Arc::new(hub.connect(address)),
        SecretVault::new(MemoryStore::new()),
        address,
    )
}

/// Reconcile once and act on the answer; true once the game is decided
async fn drive(name: &str, player: &GameCoordinator, game_id: GameId, game_move: Move) -> bool {
    let resolution = player.reconcile(game_id).await.expect("reconcile failed");
    match resolution.action {
        Action::SelectMove => {
            let secret = generate_secret();
            player
                .commit_move(game_id, game_move, &secret)
                .await
                .expect("commit failed");
            info!("{}: committed a move", name);
        }
        Action::ReadyToReveal(_) => {
            player.reveal_move(game_id).await.expect("reveal failed");
            info!("{}: revealed", name);
        }
        Action::AwaitOpponentCommit => info!("{}: waiting for the opponent to commit", name),
        Action::AwaitOpponentReveal => info!("{}: waiting for the opponent to reveal", name),
        Action::NeedManualReveal => info!("{}: secret lost, manual reveal needed", name),
        Action::SpectatorView => info!("{}: spectating", name),
        Action::Finished { winner } => {
            match winner {
                Some(RoundWinner::You) => info!("{}: won the game", name),
                Some(RoundWinner::Opponent) => info!("{}: lost the game", name),
                Some(RoundWinner::Draw) => info!("{}: drew the round", name),
                None => info!("{}: game over without a scored round", name),
            }
            return true;
        }
    }
    false
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let hub = MockLedger::new();
    let alice_address = Address::repeat_byte(0x11);
    let bob_address = Address::repeat_byte(0x22);

    let alice = coordinator(&hub, alice_address);
    let bob = coordinator(&hub, bob_address);

    let game_id = alice.create_game(bob_address).await.expect("create failed");
    info!("Alice opened game {} against Bob ({})", game_id, bob_address);

    // Commit, reveal and settle take a bounded number of ticks
    for _ in 0..8 {
        let alice_done = drive("Alice", &alice, game_id, Move::Rock).await;
        let bob_done = drive("Bob", &bob, game_id, Move::Paper).await;
        if alice_done && bob_done {
            break;
        }
    }
}
