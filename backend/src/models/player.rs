//! Player ledger model
//!
//! Tracks one player's money within a single room:
//! - Accumulated buy-in (i64 cents), built from add/remove events
//! - Final chip value (cash-out), recorded once and overwritten on correction
//! - Buy-in history for auditing
//!
//! CRITICAL: All money values are i64 (cents)

use crate::core::money::MAX_AMOUNT;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during player ledger operations
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Amount must be positive, got {0}")]
    NonPositive(i64),

    #[error("Cash-out cannot be negative, got {0}")]
    NegativeCashOut(i64),

    #[error("Insufficient buy-in: requested {requested}, available {available}")]
    InsufficientBuyIn { requested: i64, available: i64 },

    #[error("Amount {0} exceeds the per-player limit")]
    AboveLimit(i64),
}

/// Final chip value of a player
///
/// A plain `0` cannot tell "hasn't cashed out yet" apart from "busted";
/// settlement has to block on the first and accept the second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashOut {
    /// No cash-out has been recorded yet
    #[default]
    NotRecorded,

    /// Final chip value in cents (0 = busted)
    Recorded(i64),
}

impl CashOut {
    /// Value used for arithmetic (unrecorded counts as zero)
    pub fn amount(&self) -> i64 {
        match self {
            CashOut::NotRecorded => 0,
            CashOut::Recorded(amount) => *amount,
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, CashOut::Recorded(_))
    }
}

/// Direction of a buy-in event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuyInAction {
    Add,
    Remove,
}

/// One recorded buy-in change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyInEntry {
    /// Unique entry identifier (UUID)
    pub id: String,

    /// Amount added or removed (always positive, cents)
    pub amount: i64,

    pub action: BuyInAction,

    /// Room-wide ordering of events
    pub sequence: u64,

    /// When the change was recorded
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

impl BuyInEntry {
    pub fn new(amount: i64, action: BuyInAction, sequence: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount,
            action,
            sequence,
            timestamp: Utc::now(),
        }
    }
}

/// A player's money within one room
///
/// # Example
/// ```
/// use stac_ledger_core::{CashOut, PlayerLedger};
///
/// let mut player = PlayerLedger::new("alice".to_string(), 10_000, CashOut::Recorded(15_000));
/// assert_eq!(player.pnl(), 5_000);
///
/// player.add_buy_in(5_000, 1).unwrap();
/// assert_eq!(player.buy_in(), 15_000);
/// assert_eq!(player.pnl(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLedger {
    /// Username, unique within a room
    id: String,

    /// Chat user id, known once the player has interacted
    user_id: Option<i64>,

    /// Whether the player accepted the invite
    joined: bool,

    /// Accumulated buy-in (i64 cents)
    buy_in: i64,

    /// Final chip value
    cash_out: CashOut,

    /// Buy-in events, oldest first
    history: Vec<BuyInEntry>,
}

impl PlayerLedger {
    /// Create a ledger with fixed totals
    ///
    /// Useful for feeding the settlement engine directly. The ledger is
    /// marked as joined and carries no history. Totals are taken as given;
    /// keep them within [`MAX_AMOUNT`] like the mutating methods do.
    pub fn new(id: String, buy_in: i64, cash_out: CashOut) -> Self {
        Self {
            id,
            user_id: None,
            joined: true,
            buy_in,
            cash_out,
            history: Vec::new(),
        }
    }

    /// Create the ledger of an invited player who has not joined yet
    pub fn invited(id: String) -> Self {
        Self {
            id,
            user_id: None,
            joined: false,
            buy_in: 0,
            cash_out: CashOut::NotRecorded,
            history: Vec::new(),
        }
    }

    /// Create the ledger of a player who is present from the start
    pub fn joined(id: String, user_id: i64) -> Self {
        Self {
            id,
            user_id: Some(user_id),
            joined: true,
            buy_in: 0,
            cash_out: CashOut::NotRecorded,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn buy_in(&self) -> i64 {
        self.buy_in
    }

    pub fn cash_out(&self) -> CashOut {
        self.cash_out
    }

    pub fn history(&self) -> &[BuyInEntry] {
        &self.history
    }

    /// Profit or loss (cash-out minus buy-in)
    pub fn pnl(&self) -> i64 {
        self.cash_out.amount() - self.buy_in
    }

    /// Joined players and anyone with money in play take part in settlement
    pub fn is_active(&self) -> bool {
        self.joined || self.buy_in > 0
    }

    /// Active player with chips in play whose cash-out is still unknown
    pub fn is_pending_cash_out(&self) -> bool {
        self.is_active() && self.buy_in > 0 && !self.cash_out.is_recorded()
    }

    /// Whether this ledger belongs to the given chat user
    pub fn matches(&self, user_id: i64, username: &str) -> bool {
        self.user_id == Some(user_id) || self.id == username
    }

    /// Mark the player as joined and bind their chat user id
    pub fn join(&mut self, user_id: i64) {
        self.joined = true;
        self.user_id = Some(user_id);
    }

    /// Add to the buy-in, returning the new total
    ///
    /// The total may not exceed [`MAX_AMOUNT`].
    pub fn add_buy_in(&mut self, amount: i64, sequence: u64) -> Result<i64, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::NonPositive(amount));
        }
        let total = self
            .buy_in
            .checked_add(amount)
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or(LedgerError::AboveLimit(amount))?;
        self.buy_in = total;
        self.history
            .push(BuyInEntry::new(amount, BuyInAction::Add, sequence));
        Ok(self.buy_in)
    }

    /// Take back part of the buy-in, returning the new total
    ///
    /// Fails without changes if more is removed than was bought in.
    pub fn remove_buy_in(&mut self, amount: i64, sequence: u64) -> Result<i64, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::NonPositive(amount));
        }
        if self.buy_in < amount {
            return Err(LedgerError::InsufficientBuyIn {
                requested: amount,
                available: self.buy_in,
            });
        }
        self.buy_in -= amount;
        self.history
            .push(BuyInEntry::new(amount, BuyInAction::Remove, sequence));
        Ok(self.buy_in)
    }

    /// Record the final chip value, replacing any earlier cash-out
    pub fn record_cash_out(&mut self, amount: i64) -> Result<i64, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeCashOut(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(LedgerError::AboveLimit(amount));
        }
        self.cash_out = CashOut::Recorded(amount);
        Ok(self.pnl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecorded_cash_out_counts_as_zero() {
        let player = PlayerLedger::new("bob".to_string(), 5_000, CashOut::NotRecorded);
        assert_eq!(player.pnl(), -5_000);
        assert!(player.is_pending_cash_out());
    }

    #[test]
    fn test_busted_player_is_not_pending() {
        let player = PlayerLedger::new("bob".to_string(), 5_000, CashOut::Recorded(0));
        assert_eq!(player.pnl(), -5_000);
        assert!(!player.is_pending_cash_out());
    }

    #[test]
    fn test_history_tracks_both_directions() {
        let mut player = PlayerLedger::joined("carol".to_string(), 7);
        player.add_buy_in(10_000, 1).unwrap();
        player.remove_buy_in(2_500, 2).unwrap();

        let actions: Vec<_> = player.history().iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![BuyInAction::Add, BuyInAction::Remove]);
        assert_eq!(player.buy_in(), 7_500);
    }

    #[test]
    fn test_amounts_above_limit_are_rejected() {
        let mut player = PlayerLedger::joined("dave".to_string(), 9);
        player.add_buy_in(MAX_AMOUNT, 1).unwrap();
        assert_eq!(player.add_buy_in(1, 2), Err(LedgerError::AboveLimit(1)));
        assert_eq!(player.buy_in(), MAX_AMOUNT);
        assert_eq!(player.history().len(), 1);

        assert_eq!(
            player.record_cash_out(MAX_AMOUNT + 1),
            Err(LedgerError::AboveLimit(MAX_AMOUNT + 1))
        );
        assert!(!player.cash_out().is_recorded());
    }
}
