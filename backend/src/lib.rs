//! STAC Ledger Core - Poker Bankroll Settlement
//!
//! Tracks buy-ins and cash-outs for home-game poker rooms and works out who
//! owes whom when the session ends.
//!
//! # Architecture
//!
//! - **core**: Money parsing and formatting (integer cents)
//! - **models**: Domain types (PlayerLedger, Room)
//! - **settlement**: P&L aggregation and debt netting
//! - **store**: Room record store and JSON snapshots
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. Settlement is a pure function of a ledger snapshot
//! 3. Unbalanced totals are reported as mismatch, never hidden in a transfer

// Module declarations
pub mod core;
pub mod models;
pub mod settlement;
pub mod store;

// Re-exports for convenience
pub use crate::core::money::{
    format_cents, format_signed, parse_amount, AmountError, MAX_AMOUNT,
};
pub use models::{
    player::{BuyInAction, BuyInEntry, CashOut, LedgerError, PlayerLedger},
    room::{Room, RoomError},
};
pub use settlement::{
    calculate_settlement, compute_pnl, compute_settlements, MatchingStrategy, PlayerPnL,
    RoomSettlementResult, Settlement, SettlementConfig, SettlementEngine, SettlementError,
};
pub use store::{InMemoryRoomStore, RoomRole, RoomStore, StoreError};
