//! Settlement Module
//!
//! Computes who owes whom at the end of a session:
//! - P&L aggregation per player (`pnl`)
//! - Greedy debt netting into directed transfers (`netting`)
//! - Room-level composition with totals and mismatch (`engine`)
//!
//! # Critical Invariants
//!
//! 1. **Read-only**: Settlement never mutates a ledger or the store
//! 2. **Matched total**: Σ transfers = min(Σ profits, Σ losses)
//! 3. **Surfaced mismatch**: Unbalanced totals show up in `mismatch`, never as a transfer
//!
//! # Example
//!
//! ```rust
//! use stac_ledger_core::{CashOut, PlayerLedger};
//! use stac_ledger_core::settlement;
//!
//! let result = settlement::calculate_settlement(&[
//!     PlayerLedger::new("A".to_string(), 10_000, CashOut::Recorded(20_000)),
//!     PlayerLedger::new("B".to_string(), 10_000, CashOut::Recorded(8_000)),
//! ]);
//!
//! // Only 20.00 of A's 100.00 profit is matched by B's loss
//! assert_eq!(result.settlements.len(), 1);
//! assert_eq!(result.settlements[0].amount, 2_000);
//! assert_eq!(result.mismatch, 8_000);
//! ```

pub mod config;
pub mod engine;
pub mod netting;
pub mod pnl;

// Re-export public API
pub use config::{MatchingStrategy, SettlementConfig};
pub use engine::{calculate_settlement, RoomSettlementResult, SettlementEngine, SettlementError};
pub use netting::{compute_settlements, compute_settlements_with, Settlement};
pub use pnl::{compute_pnl, PlayerPnL};
