//! Settlement engine
//!
//! Composes P&L aggregation and debt netting into a full room result.
//!
//! # Settlement Flow
//!
//! ```text
//! RoomStore ──get_room──► Room ──active_players──► [PlayerLedger]
//!                                                      │
//!                              compute_pnl ◄───────────┤
//!                                   │                  │
//!                       compute_settlements      totals + mismatch
//!                                   └──────► RoomSettlementResult
//! ```
//!
//! The engine never mutates the store. Marking a room settled is the
//! caller's decision once it has shown the result.

use crate::models::player::PlayerLedger;
use crate::settlement::config::SettlementConfig;
use crate::settlement::netting::{compute_settlements_with, Settlement};
use crate::settlement::pnl::{compute_pnl, PlayerPnL};
use crate::store::RoomStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when settling a stored room
#[derive(Debug, Error, PartialEq)]
pub enum SettlementError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Waiting for cash-outs from: {}", .0.join(", "))]
    PendingCashouts(Vec<String>),
}

/// Full settlement view of one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettlementResult {
    /// Σ buy-in over the settled players (cents)
    pub total_buy_in: i64,

    /// Σ cash-out over the settled players (cents)
    pub total_cash_out: i64,

    /// total_cash_out - total_buy_in (cents)
    pub mismatch: i64,

    /// Per-player P&L, winners first
    pub players: Vec<PlayerPnL>,

    /// Transfers netting the matched portion of all P&L
    pub settlements: Vec<Settlement>,
}

impl RoomSettlementResult {
    /// Whether |mismatch| exceeds the given tolerance (cents)
    pub fn has_mismatch(&self, tolerance: i64) -> bool {
        self.mismatch.abs() > tolerance
    }

    /// Sum of all transfer amounts (cents)
    pub fn total_transferred(&self) -> i64 {
        self.settlements.iter().map(|s| s.amount).sum()
    }

    /// Transfers grouped by receiving player, in first-appearance order
    pub fn by_winner(&self) -> Vec<(&str, Vec<&Settlement>)> {
        let mut groups: Vec<(&str, Vec<&Settlement>)> = Vec::new();
        for settlement in &self.settlements {
            match groups.iter_mut().find(|(to, _)| *to == settlement.to) {
                Some((_, payments)) => payments.push(settlement),
                None => groups.push((settlement.to.as_str(), vec![settlement])),
            }
        }
        groups
    }
}

/// Settlement engine
///
/// Stateless apart from its configuration; safe to share across threads and
/// to call repeatedly on independent ledger snapshots.
///
/// # Example
/// ```
/// use stac_ledger_core::{CashOut, PlayerLedger, SettlementEngine};
///
/// let engine = SettlementEngine::default();
/// let result = engine.calculate_settlement(&[
///     PlayerLedger::new("A".to_string(), 10_000, CashOut::Recorded(15_000)),
///     PlayerLedger::new("B".to_string(), 10_000, CashOut::Recorded(5_000)),
/// ]);
///
/// assert_eq!(result.mismatch, 0);
/// assert_eq!(result.settlements.len(), 1);
/// assert_eq!(result.settlements[0].from, "B");
/// assert_eq!(result.settlements[0].amount, 5_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    config: SettlementConfig,
}

impl SettlementEngine {
    pub fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Per-player P&L, winners first
    pub fn compute_pnl(&self, ledgers: &[PlayerLedger]) -> Vec<PlayerPnL> {
        compute_pnl(ledgers)
    }

    /// Transfers that settle the given P&L
    pub fn compute_settlements(&self, pnls: &[PlayerPnL]) -> Vec<Settlement> {
        compute_settlements_with(pnls, self.config.strategy)
    }

    /// Totals, P&L and transfers for a ledger snapshot
    ///
    /// Every ledger passed in is settled; filtering out inactive players is
    /// the caller's job (see [`Self::calculate_room_settlement`]). Room
    /// operations cap each amount at [`crate::MAX_AMOUNT`], which keeps the
    /// totals within i64.
    pub fn calculate_settlement(&self, ledgers: &[PlayerLedger]) -> RoomSettlementResult {
        let total_buy_in: i64 = ledgers.iter().map(PlayerLedger::buy_in).sum();
        let total_cash_out: i64 = ledgers.iter().map(|l| l.cash_out().amount()).sum();

        let players = self.compute_pnl(ledgers);
        let settlements = self.compute_settlements(&players);

        let result = RoomSettlementResult {
            total_buy_in,
            total_cash_out,
            mismatch: total_cash_out - total_buy_in,
            players,
            settlements,
        };

        tracing::debug!(
            players = result.players.len(),
            transfers = result.settlements.len(),
            total_buy_in,
            total_cash_out,
            mismatch = result.mismatch,
            "settlement calculated"
        );
        if result.has_mismatch(self.config.mismatch_tolerance) {
            tracing::warn!(mismatch = result.mismatch, "cash-out and buy-in totals differ");
        }

        result
    }

    /// Settlement of a stored room over its active players
    ///
    /// Returns `None` when the room does not exist. Pending cash-outs are
    /// not checked here; use [`Self::settle_room`] for that.
    pub fn calculate_room_settlement<S: RoomStore + ?Sized>(
        &self,
        store: &S,
        room_id: &str,
    ) -> Option<RoomSettlementResult> {
        let room = store.get_room(room_id)?;
        Some(self.calculate_settlement(&room.active_players()))
    }

    /// Settlement of a stored room, refusing while cash-outs are missing
    pub fn settle_room<S: RoomStore + ?Sized>(
        &self,
        store: &S,
        room_id: &str,
    ) -> Result<RoomSettlementResult, SettlementError> {
        let room = store
            .get_room(room_id)
            .ok_or_else(|| SettlementError::RoomNotFound(room_id.to_string()))?;

        let pending = room.pending_cashouts();
        if !pending.is_empty() {
            tracing::info!(room = room_id, pending = pending.len(), "settlement blocked");
            return Err(SettlementError::PendingCashouts(pending));
        }

        Ok(self.calculate_settlement(&room.active_players()))
    }
}

/// [`SettlementEngine::calculate_settlement`] with the default configuration
pub fn calculate_settlement(ledgers: &[PlayerLedger]) -> RoomSettlementResult {
    SettlementEngine::default().calculate_settlement(ledgers)
}
