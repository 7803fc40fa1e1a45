//! Timeout window arithmetic.

/// Whether a timeout claim would be accepted at `now`.
///
/// The ledger requires the elapsed time to strictly exceed the window, so
/// elapsed time equal to the window is still too early. Timestamps are
/// unix seconds; a clock behind the ledger saturates to zero elapsed.
pub fn can_claim_timeout(last_move_at: u64, timeout_window: u64, now: u64) -> bool {
    now.saturating_sub(last_move_at) > timeout_window
}
