//! Profit and loss aggregation
//!
//! Turns a snapshot of player ledgers into a per-player P&L view ordered
//! winners first. The view is recomputed on every request and never stored.

use crate::models::player::PlayerLedger;
use serde::{Deserialize, Serialize};

/// Derived profit/loss of one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPnL {
    pub id: String,

    /// Total buy-in (cents)
    pub buy_in: i64,

    /// Recorded cash-out, zero when none was recorded (cents)
    pub cash_out: i64,

    /// cash_out - buy_in (cents)
    pub pnl: i64,
}

impl PlayerPnL {
    pub fn new(id: impl Into<String>, buy_in: i64, cash_out: i64) -> Self {
        Self {
            id: id.into(),
            buy_in,
            cash_out,
            pnl: cash_out - buy_in,
        }
    }
}

impl From<&PlayerLedger> for PlayerPnL {
    fn from(ledger: &PlayerLedger) -> Self {
        PlayerPnL::new(ledger.id(), ledger.buy_in(), ledger.cash_out().amount())
    }
}

/// Compute each player's P&L, sorted by pnl descending
///
/// The sort is stable, so players with equal pnl keep their input order.
///
/// # Example
/// ```
/// use stac_ledger_core::{CashOut, PlayerLedger};
/// use stac_ledger_core::settlement::compute_pnl;
///
/// let ledgers = vec![
///     PlayerLedger::new("A".to_string(), 10_000, CashOut::Recorded(5_000)),
///     PlayerLedger::new("B".to_string(), 10_000, CashOut::Recorded(15_000)),
/// ];
/// let pnls = compute_pnl(&ledgers);
/// assert_eq!(pnls[0].id, "B");
/// assert_eq!(pnls[0].pnl, 5_000);
/// assert_eq!(pnls[1].pnl, -5_000);
/// ```
pub fn compute_pnl(ledgers: &[PlayerLedger]) -> Vec<PlayerPnL> {
    let mut pnls: Vec<PlayerPnL> = ledgers.iter().map(PlayerPnL::from).collect();
    pnls.sort_by(|a, b| b.pnl.cmp(&a.pnl));
    pnls
}
