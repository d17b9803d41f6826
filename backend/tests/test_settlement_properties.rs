//! Settlement Invariant Property Tests
//!
//! Random ledgers (balanced and unbalanced) checked against the netting
//! invariants: bounded transfers, matched total, positivity, no self-payment
//! and determinism, for every matching strategy.

use proptest::prelude::*;
use stac_ledger_core::{
    compute_pnl, CashOut, MatchingStrategy, PlayerLedger, PlayerPnL, Settlement,
    SettlementConfig, SettlementEngine,
};
use std::collections::HashMap;

// ============================================================================
// Strategies
// ============================================================================

/// Up to 10 players with buy-ins and cash-outs below 100k units
fn ledgers() -> impl Strategy<Value = Vec<PlayerLedger>> {
    prop::collection::vec((0i64..10_000_000, 0i64..10_000_000), 0..10).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (buy_in, cash_out))| {
                PlayerLedger::new(format!("P{}", i), buy_in, CashOut::Recorded(cash_out))
            })
            .collect()
    })
}

/// Ledgers whose cash-outs sum exactly to their buy-ins
fn balanced_ledgers() -> impl Strategy<Value = Vec<PlayerLedger>> {
    prop::collection::vec(-500_000i64..500_000, 1..10).prop_map(|deltas| {
        let mut pnls = deltas;
        let drift: i64 = pnls.iter().sum();
        pnls.push(-drift);
        pnls.into_iter()
            .enumerate()
            .map(|(i, pnl)| {
                let buy_in = 10_000_000;
                PlayerLedger::new(format!("P{}", i), buy_in, CashOut::Recorded(buy_in + pnl))
            })
            .collect()
    })
}

fn strategies() -> impl Strategy<Value = MatchingStrategy> {
    prop_oneof![
        Just(MatchingStrategy::Greedy),
        Just(MatchingStrategy::ExactMatchFirst)
    ]
}

fn engine(strategy: MatchingStrategy) -> SettlementEngine {
    SettlementEngine::new(SettlementConfig::default().with_strategy(strategy))
}

/// Net flow per player: received minus paid
fn net_flows(settlements: &[Settlement]) -> HashMap<&str, i64> {
    let mut flows = HashMap::new();
    for s in settlements {
        *flows.entry(s.to.as_str()).or_insert(0) += s.amount;
        *flows.entry(s.from.as_str()).or_insert(0) -= s.amount;
    }
    flows
}

fn profit_and_loss(players: &[PlayerPnL]) -> (i64, i64) {
    let profit: i64 = players.iter().filter(|p| p.pnl > 0).map(|p| p.pnl).sum();
    let loss: i64 = players.iter().filter(|p| p.pnl < 0).map(|p| -p.pnl).sum();
    (profit, loss)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_transfers_are_positive_and_never_self_payments(
        ledgers in ledgers(),
        strategy in strategies(),
    ) {
        let result = engine(strategy).calculate_settlement(&ledgers);
        for s in &result.settlements {
            prop_assert!(s.amount > 0);
            prop_assert_ne!(&s.from, &s.to);
        }
    }

    #[test]
    fn prop_transfers_bounded_by_each_players_pnl(
        ledgers in ledgers(),
        strategy in strategies(),
    ) {
        let result = engine(strategy).calculate_settlement(&ledgers);
        let flows = net_flows(&result.settlements);

        for player in &result.players {
            let received: i64 = result
                .settlements
                .iter()
                .filter(|s| s.to == player.id)
                .map(|s| s.amount)
                .sum();
            let paid: i64 = result
                .settlements
                .iter()
                .filter(|s| s.from == player.id)
                .map(|s| s.amount)
                .sum();

            prop_assert!(received <= player.pnl.max(0));
            prop_assert!(paid <= (-player.pnl).max(0));
            // Nobody both pays and receives
            prop_assert!(received == 0 || paid == 0);
            let net = flows.get(player.id.as_str()).copied().unwrap_or(0);
            prop_assert!(net.abs() <= player.pnl.abs());
        }
    }

    #[test]
    fn prop_matched_total_is_min_of_profit_and_loss(
        ledgers in ledgers(),
        strategy in strategies(),
    ) {
        let result = engine(strategy).calculate_settlement(&ledgers);
        let (profit, loss) = profit_and_loss(&result.players);

        prop_assert_eq!(result.total_transferred(), profit.min(loss));
        prop_assert_eq!(result.mismatch, result.total_cash_out - result.total_buy_in);
        prop_assert_eq!(result.mismatch, profit - loss);
    }

    #[test]
    fn prop_balanced_ledgers_zero_every_balance(
        ledgers in balanced_ledgers(),
        strategy in strategies(),
    ) {
        let result = engine(strategy).calculate_settlement(&ledgers);
        prop_assert_eq!(result.mismatch, 0);

        let flows = net_flows(&result.settlements);
        for player in &result.players {
            let flow = flows.get(player.id.as_str()).copied().unwrap_or(0);
            prop_assert_eq!(flow, player.pnl, "player {} not settled", player.id);
        }
    }

    #[test]
    fn prop_greedy_uses_fewer_transfers_than_players(ledgers in balanced_ledgers()) {
        let result = engine(MatchingStrategy::Greedy).calculate_settlement(&ledgers);
        let movers = result.players.iter().filter(|p| p.pnl != 0).count();
        prop_assert!(result.settlements.len() < movers.max(1));
    }

    #[test]
    fn prop_settlement_is_deterministic(
        ledgers in ledgers(),
        strategy in strategies(),
    ) {
        let settler = engine(strategy);
        prop_assert_eq!(
            settler.calculate_settlement(&ledgers),
            settler.calculate_settlement(&ledgers)
        );
    }

    #[test]
    fn prop_pnl_sorted_descending(ledgers in ledgers()) {
        let pnls = compute_pnl(&ledgers);
        prop_assert_eq!(pnls.len(), ledgers.len());
        for pair in pnls.windows(2) {
            prop_assert!(pair[0].pnl >= pair[1].pnl);
        }
    }
}
