//! Move ledger abstraction.
//!
//! [`LedgerClient`] is the boundary between the coordinator and whatever
//! actually holds the games. [`MockLedger`] implements the same rules
//! in-process for tests and demos.

mod mock;
mod traits;

pub use mock::{MockLedger, MockLedgerClient, RevealCapture};
pub use traits::{LedgerClient, LedgerError, MoveRecord, SubmissionId};
