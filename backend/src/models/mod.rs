//! Domain models for the room ledger

pub mod player;
pub mod room;

// Re-exports
pub use player::{BuyInAction, BuyInEntry, CashOut, LedgerError, PlayerLedger};
pub use room::{Room, RoomError};
