//! Debt netting
//!
//! Builds the list of directed payments that zeroes every player's P&L.
//!
//! # Algorithm (greedy two-pointer match)
//!
//! ```text
//! losers  (owe, desc):  B 70   C 30
//! winners (owed, desc): A 60   D 40
//!
//! B→A 60   (A done)
//! B→D 10   (B done)
//! C→D 30   (both done)
//! ```
//!
//! Largest debtor pays largest creditor. This tends toward, but does not
//! guarantee, the minimum number of transfers; exact minimisation is
//! NP-hard and not attempted.
//!
//! # Critical Invariants
//!
//! - **Bounded**: nobody receives more than their profit or pays more than their loss
//! - **Matched total**: Σ amounts = min(Σ profits, Σ losses)
//! - **Positive**: every transfer amount is > 0 and `from != to`
//! - **Deterministic**: same input order produces the same transfers
//!
//! When profits and losses do not balance, the longer side is left with a
//! remainder. That remainder is exactly the room's mismatch and is never
//! forced into a transfer.

use crate::settlement::config::MatchingStrategy;
use crate::settlement::pnl::PlayerPnL;
use serde::{Deserialize, Serialize};

/// One directed payment obligation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Paying player (had a loss)
    pub from: String,

    /// Receiving player (had a profit)
    pub to: String,

    /// Amount owed (cents, always positive)
    pub amount: i64,
}

/// A player's open position during matching
#[derive(Debug)]
struct Position<'a> {
    id: &'a str,
    remaining: i64,
}

/// Compute transfers with the default greedy strategy
///
/// # Example
/// ```
/// use stac_ledger_core::settlement::{compute_settlements, PlayerPnL};
///
/// let pnls = vec![
///     PlayerPnL::new("A", 10_000, 20_000),
///     PlayerPnL::new("B", 10_000, 5_000),
///     PlayerPnL::new("C", 10_000, 5_000),
/// ];
/// let settlements = compute_settlements(&pnls);
/// assert_eq!(settlements.len(), 2);
/// assert!(settlements.iter().all(|s| s.to == "A" && s.amount == 5_000));
/// ```
pub fn compute_settlements(pnls: &[PlayerPnL]) -> Vec<Settlement> {
    compute_settlements_with(pnls, MatchingStrategy::Greedy)
}

/// Compute transfers with an explicit matching strategy
pub fn compute_settlements_with(pnls: &[PlayerPnL], strategy: MatchingStrategy) -> Vec<Settlement> {
    let (mut losers, mut winners) = split_positions(pnls);
    let mut settlements = Vec::with_capacity(losers.len() + winners.len());

    if strategy == MatchingStrategy::ExactMatchFirst {
        match_exact(&mut losers, &mut winners, &mut settlements);
        losers.retain(|p| p.remaining > 0);
        winners.retain(|p| p.remaining > 0);
    }

    match_greedy(&mut losers, &mut winners, &mut settlements);
    settlements
}

/// Split P&L into (losers, winners), each sorted by amount descending
///
/// Break-even players take no part. Sorting is stable.
fn split_positions(pnls: &[PlayerPnL]) -> (Vec<Position<'_>>, Vec<Position<'_>>) {
    let mut losers: Vec<Position<'_>> = pnls
        .iter()
        .filter(|p| p.pnl < 0)
        .map(|p| Position {
            id: &p.id,
            remaining: -p.pnl,
        })
        .collect();
    let mut winners: Vec<Position<'_>> = pnls
        .iter()
        .filter(|p| p.pnl > 0)
        .map(|p| Position {
            id: &p.id,
            remaining: p.pnl,
        })
        .collect();

    losers.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    winners.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    (losers, winners)
}

/// Two-pointer walk over losers and winners
fn match_greedy(
    losers: &mut [Position<'_>],
    winners: &mut [Position<'_>],
    out: &mut Vec<Settlement>,
) {
    let (mut i, mut j) = (0, 0);

    while i < losers.len() && j < winners.len() {
        let amount = losers[i].remaining.min(winners[j].remaining);
        if amount > 0 {
            push_transfer(out, &losers[i], &winners[j], amount);
            losers[i].remaining -= amount;
            winners[j].remaining -= amount;
        }

        if losers[i].remaining <= 0 {
            i += 1;
        }
        if winners[j].remaining <= 0 {
            j += 1;
        }
    }
}

/// Pair each loser with the first unused winner owed exactly the same amount
fn match_exact(
    losers: &mut [Position<'_>],
    winners: &mut [Position<'_>],
    out: &mut Vec<Settlement>,
) {
    for loser in losers.iter_mut() {
        if let Some(winner) = winners
            .iter_mut()
            .find(|w| w.remaining > 0 && w.remaining == loser.remaining)
        {
            let amount = loser.remaining;
            push_transfer(out, loser, winner, amount);
            loser.remaining = 0;
            winner.remaining = 0;
        }
    }
}

fn push_transfer(
    out: &mut Vec<Settlement>,
    loser: &Position<'_>,
    winner: &Position<'_>,
    amount: i64,
) {
    debug_assert_ne!(loser.id, winner.id, "a player cannot be both winner and loser");
    out.push(Settlement {
        from: loser.id.to_string(),
        to: winner.id.to_string(),
        amount,
    });
}
