//! Plain-text rendering of room state and settlement results

use stac_ledger_core::{format_cents, format_signed, Room, RoomSettlementResult};
use std::fmt::Write;

const NAME_WIDTH: usize = 12;
const AMOUNT_WIDTH: usize = 10;

/// Shorten long usernames so table columns stay aligned
fn clip_name(name: &str) -> String {
    if name.chars().count() > NAME_WIDTH - 2 {
        let head: String = name.chars().take(NAME_WIDTH - 2).collect();
        format!("{}..", head)
    } else {
        name.to_string()
    }
}

/// Settlement table, mismatch warning and transfers grouped by winner
pub fn render_settlement(
    room_id: &str,
    result: &RoomSettlementResult,
    currency: &str,
    mismatch_tolerance: i64,
) -> String {
    let mut out = String::new();
    let rule = format!(
        "+{}+{}+{}+",
        "-".repeat(NAME_WIDTH + 2),
        "-".repeat(AMOUNT_WIDTH + 2),
        "-".repeat(AMOUNT_WIDTH + 2)
    );

    let _ = writeln!(out, "SETTLEMENT - room {}", room_id);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "| {:<nw$} | {:>aw$} | {:>aw$} |",
        "PLAYER",
        "BUY IN",
        "P&L",
        nw = NAME_WIDTH,
        aw = AMOUNT_WIDTH
    );
    let _ = writeln!(out, "{}", rule);
    for player in &result.players {
        let _ = writeln!(
            out,
            "| {:<nw$} | {:>aw$} | {:>aw$} |",
            clip_name(&player.id),
            format_cents(player.buy_in),
            format_signed(player.pnl),
            nw = NAME_WIDTH,
            aw = AMOUNT_WIDTH
        );
    }
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "total buy-in {}{}, total cash-out {}{}",
        currency,
        format_cents(result.total_buy_in),
        currency,
        format_cents(result.total_cash_out)
    );

    if result.has_mismatch(mismatch_tolerance) {
        let direction = if result.mismatch > 0 { "more" } else { "less" };
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "WARNING: mismatch of {}{} recorded ({} cashed out than bought in).",
            currency,
            format_cents(result.mismatch.abs()),
            direction
        );
    }

    if result.settlements.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "nothing to settle.");
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "TRANSFERS");
    for (winner, payments) in result.by_winner() {
        let total: i64 = payments.iter().map(|p| p.amount).sum();
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "@{} wins {}{} in total",
            winner,
            currency,
            format_cents(total)
        );
        for payment in payments {
            let _ = writeln!(
                out,
                "   - @{} owes {}{}",
                payment.from,
                currency,
                format_cents(payment.amount)
            );
        }
    }
    out
}

/// Message shown when settlement is blocked on missing cash-outs
pub fn render_pending(room_id: &str, pending: &[String]) -> String {
    let names: Vec<String> = pending.iter().map(|name| format!("@{}", name)).collect();
    format!(
        "waiting for cash-outs from:\n{}\n\nuse `stac cash-out {} <amount>` to record final chips.\n",
        names.join(", "),
        room_id
    )
}

/// Room details with every player on the list, joined or still invited
pub fn render_room(room: &Room, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "room: {}", room.id());
    let _ = writeln!(out, "owner: @{}", room.owner_username());
    let _ = writeln!(out, "created: {}", room.created_at().format("%Y-%m-%d"));
    if room.is_settled() {
        let _ = writeln!(out, "status: settled");
    }
    let _ = writeln!(out);

    if room.players().is_empty() {
        let _ = writeln!(out, "no players yet.");
        return out;
    }
    let _ = writeln!(out, "players ({})", room.players().len());
    for player in room.players() {
        let marker = if player.is_joined() { "[joined]" } else { "[pending]" };
        let _ = writeln!(
            out,
            "  {:<9} @{} (buy-in: {}{})",
            marker,
            player.id(),
            currency,
            format_cents(player.buy_in())
        );
    }
    out
}

/// Buy-in overview ordered by buy-in, largest first
pub fn render_summary(room: &Room, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "room summary: {}", room.id());
    let _ = writeln!(out, "owner: @{}", room.owner_username());
    if room.is_settled() {
        let _ = writeln!(out, "status: settled");
    }
    let _ = writeln!(out);

    let mut players = room.active_players();
    if players.is_empty() {
        let _ = writeln!(out, "no players with buy-ins yet.");
        return out;
    }
    players.sort_by(|a, b| b.buy_in().cmp(&a.buy_in()));

    let total = room.total_buy_in();
    let _ = writeln!(out, "players ({})", players.len());
    for (rank, player) in players.iter().enumerate() {
        let share = if total > 0 {
            player.buy_in() as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let status = if player.is_joined() { "" } else { " (invited)" };
        let cash_out = if player.cash_out().is_recorded() {
            format!(", cashed out {}{}", currency, format_cents(player.cash_out().amount()))
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{:>2}. @{}{}  {}{} ({:.1}%){}",
            rank + 1,
            player.id(),
            status,
            currency,
            format_cents(player.buy_in()),
            share,
            cash_out
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "total: {}{}", currency, format_cents(total));
    out
}
