//! `stac` - command-line front end for the room ledger
//!
//! Every invocation loads the ledger snapshot, applies one command on behalf
//! of `--user-id`/`--username`, saves the snapshot if anything changed and
//! prints a plain-text reply.

mod report;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use stac_ledger_core::core::money::parse_username;
use stac_ledger_core::store::{generate_room_id, snapshot};
use stac_ledger_core::{
    format_cents, format_signed, parse_amount, InMemoryRoomStore, Room, RoomRole, RoomStore,
    SettlementConfig, SettlementEngine, SettlementError,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stac", author, version, about = "Poker room bankroll ledger and settlement")]
struct Args {
    /// Ledger snapshot file (created on first write).
    #[arg(long, env = "STAC_LEDGER", default_value = "stac.json")]
    ledger: PathBuf,

    /// JSON settlement configuration (strategy, mismatch tolerance).
    #[arg(long, env = "STAC_CONFIG")]
    config: Option<PathBuf>,

    /// Chat user id of the caller.
    #[arg(long, env = "STAC_USER_ID")]
    user_id: i64,

    /// Username of the caller (a leading @ is ignored).
    #[arg(long, env = "STAC_USERNAME")]
    username: String,

    /// Currency symbol used in replies.
    #[arg(long, default_value = "₹")]
    currency: String,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Open a new room owned by the caller.
    CreateRoom,
    /// Delete a room (owner only).
    DeleteRoom { room: String },
    /// Invite a player to a room (owner only).
    Invite { room: String, player: String },
    /// Accept an invite.
    Join { room: String },
    /// Add to the caller's buy-in.
    BuyIn { room: String, amount: String },
    /// Take back part of the caller's buy-in.
    RemoveBuyIn { room: String, amount: String },
    /// Record the caller's final chip value (0 = busted).
    CashOut { room: String, amount: String },
    /// Show room details and every invited player.
    Room { room: String },
    /// Show buy-ins for a room.
    Summary { room: String },
    /// Compute who owes whom; the owner's settle also closes the room.
    Settle { room: String },
    /// List rooms the caller owns or plays in.
    MyRooms,
}

/// Caller identity for the current invocation
struct Caller {
    user_id: i64,
    username: String,
}

/// Reply text and whether the store has to be written back
struct Outcome {
    reply: String,
    changed: bool,
}

impl Outcome {
    fn read(reply: String) -> Self {
        Self {
            reply,
            changed: false,
        }
    }

    fn write(reply: String) -> Self {
        Self {
            reply,
            changed: true,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SettlementConfig> {
    let Some(path) = path else {
        return Ok(SettlementConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    SettlementConfig::from_json(&json)
        .with_context(|| format!("invalid settlement config {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let engine = SettlementEngine::new(config);
    let caller = Caller {
        user_id: args.user_id,
        username: parse_username(&args.username).to_string(),
    };

    let mut store = snapshot::load(&args.ledger)
        .with_context(|| format!("failed to load ledger {}", args.ledger.display()))?;

    let outcome = execute(&args.command, &caller, &mut store, &engine, &args.currency)?;

    if outcome.changed {
        snapshot::save(&store, &args.ledger)
            .with_context(|| format!("failed to save ledger {}", args.ledger.display()))?;
    }
    print!("{}", outcome.reply);
    Ok(())
}

fn require_room(store: &InMemoryRoomStore, room_id: &str) -> Result<Room> {
    store
        .get_room(room_id)
        .with_context(|| format!("room not found: {}", room_id))
}

fn execute(
    command: &Command,
    caller: &Caller,
    store: &mut InMemoryRoomStore,
    engine: &SettlementEngine,
    currency: &str,
) -> Result<Outcome> {
    match command {
        Command::CreateRoom => {
            let room_id = generate_room_id(&*store);
            store.insert_room(Room::new(
                room_id.clone(),
                caller.user_id,
                caller.username.clone(),
            ))?;
            info!(room = %room_id, owner = %caller.username, "room created");
            Ok(Outcome::write(format!(
                "room created: {}\n\ninvite players with `stac invite {} @username`.\n",
                room_id, room_id
            )))
        }

        Command::DeleteRoom { room } => {
            let existing = require_room(store, room)?;
            if !existing.is_owner(caller.user_id) {
                bail!("only the room owner can delete room {}", room);
            }
            store.delete_room(room);
            info!(room = %room, "room deleted");
            Ok(Outcome::write(format!("room {} deleted.\n", room)))
        }

        Command::Invite { room, player } => {
            if !require_room(store, room)?.is_owner(caller.user_id) {
                bail!("only the room owner can invite players");
            }
            let player = parse_username(player).to_string();
            store.update_room(room, |r| r.invite(&player))?;
            Ok(Outcome::write(format!(
                "@{} invited to room {}.\nthey can join with `stac join {}`.\n",
                player, room, room
            )))
        }

        Command::Join { room } => {
            store.update_room(room, |r| r.join(&caller.username, caller.user_id))?;
            Ok(Outcome::write(format!(
                "@{} joined room {}.\n",
                caller.username, room
            )))
        }

        Command::BuyIn { room, amount } => {
            let cents = parse_amount(amount)?;
            let total = store.update_room(room, |r| {
                r.add_buy_in(caller.user_id, &caller.username, cents)
            })?;
            Ok(Outcome::write(format!(
                "added {}{} buy-in\n@{} total: {}{}\n",
                currency,
                format_cents(cents),
                caller.username,
                currency,
                format_cents(total)
            )))
        }

        Command::RemoveBuyIn { room, amount } => {
            let cents = parse_amount(amount)?;
            let total = store.update_room(room, |r| {
                r.remove_buy_in(caller.user_id, &caller.username, cents)
            })?;
            Ok(Outcome::write(format!(
                "removed {}{} buy-in\n@{} total: {}{}\n",
                currency,
                format_cents(cents),
                caller.username,
                currency,
                format_cents(total)
            )))
        }

        Command::CashOut { room, amount } => {
            let cents = parse_amount(amount)?;
            let pnl = store.update_room(room, |r| {
                r.record_cash_out(caller.user_id, &caller.username, cents)
            })?;
            Ok(Outcome::write(format!(
                "cash-out recorded: {}{}\n@{} result: {}\n",
                currency,
                format_cents(cents),
                caller.username,
                format_signed(pnl)
            )))
        }

        Command::Room { room } => {
            let existing = require_room(store, room)?;
            if !existing.is_member(caller.user_id, &caller.username) {
                bail!("you don't have access to room {}", room);
            }
            Ok(Outcome::read(report::render_room(&existing, currency)))
        }

        Command::Summary { room } => {
            let existing = require_room(store, room)?;
            if !existing.has_access(caller.user_id, &caller.username) {
                bail!("you don't have access to room {}", room);
            }
            Ok(Outcome::read(report::render_summary(&existing, currency)))
        }

        Command::Settle { room } => settle(room, caller, store, engine, currency),

        Command::MyRooms => {
            let rooms = store.rooms_for_user(caller.user_id, &caller.username);
            if rooms.is_empty() {
                return Ok(Outcome::read("you are not in any rooms.\n".to_string()));
            }
            let lines: Vec<String> = rooms
                .iter()
                .map(|(id, role)| match role {
                    RoomRole::Owner => format!("{}  (owner)", id),
                    RoomRole::Player => format!("{}  (player)", id),
                })
                .collect();
            Ok(Outcome::read(format!("your rooms:\n{}\n", lines.join("\n"))))
        }
    }
}

fn settle(
    room_id: &str,
    caller: &Caller,
    store: &mut InMemoryRoomStore,
    engine: &SettlementEngine,
    currency: &str,
) -> Result<Outcome> {
    let room = require_room(store, room_id)?;
    if !room.has_access(caller.user_id, &caller.username) {
        bail!("you don't have access to room {}", room_id);
    }

    let result = match engine.settle_room(&*store, room_id) {
        Ok(result) => result,
        Err(SettlementError::PendingCashouts(pending)) => {
            return Ok(Outcome::read(report::render_pending(room_id, &pending)));
        }
        Err(err) => return Err(err.into()),
    };

    let mut reply = report::render_settlement(
        room_id,
        &result,
        currency,
        engine.config().mismatch_tolerance,
    );

    if room.is_owner(caller.user_id) && !room.is_settled() {
        store.update_room(room_id, |r| {
            r.mark_settled();
            Ok(())
        })?;
        info!(room = %room_id, transfers = result.settlements.len(), "room settled");
        reply.push_str("\nroom marked as settled.\n");
        return Ok(Outcome::write(reply));
    }
    Ok(Outcome::read(reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(user_id: i64, username: &str) -> Caller {
        Caller {
            user_id,
            username: username.to_string(),
        }
    }

    fn run(command: Command, who: &Caller, store: &mut InMemoryRoomStore) -> Result<Outcome> {
        execute(&command, who, store, &SettlementEngine::default(), "$")
    }

    #[test]
    fn parses_global_options_and_subcommand() {
        let args = Args::parse_from([
            "stac",
            "--user-id",
            "42",
            "--username",
            "@alice",
            "--ledger",
            "/tmp/ledger.json",
            "-vv",
            "buy-in",
            "abc123",
            "12.50",
        ]);

        assert_eq!(args.user_id, 42);
        assert_eq!(args.username, "@alice");
        assert_eq!(args.ledger, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(args.verbose, 2);
        assert_eq!(
            args.command,
            Command::BuyIn {
                room: "abc123".to_string(),
                amount: "12.50".to_string(),
            }
        );
    }

    fn invite(room: &str, player: &str) -> Command {
        Command::Invite {
            room: room.to_string(),
            player: player.to_string(),
        }
    }

    fn join(room: &str) -> Command {
        Command::Join {
            room: room.to_string(),
        }
    }

    fn buy_in(room: &str, amount: &str) -> Command {
        Command::BuyIn {
            room: room.to_string(),
            amount: amount.to_string(),
        }
    }

    fn cash_out(room: &str, amount: &str) -> Command {
        Command::CashOut {
            room: room.to_string(),
            amount: amount.to_string(),
        }
    }

    fn settle_cmd(room: &str) -> Command {
        Command::Settle {
            room: room.to_string(),
        }
    }

    /// New room owned by user 1, returning its id
    fn create_room(store: &mut InMemoryRoomStore) -> String {
        run(Command::CreateRoom, &caller(1, "owner"), store).unwrap();
        store.room_ids().remove(0)
    }

    #[test]
    fn full_session_settles_and_closes_room() {
        let mut store = InMemoryRoomStore::new();
        let owner = caller(1, "owner");
        let alice = caller(2, "alice");

        let created = run(Command::CreateRoom, &owner, &mut store).unwrap();
        assert!(created.changed);
        let room = store.room_ids().remove(0);

        run(invite(&room, "@alice"), &owner, &mut store).unwrap();
        run(join(&room), &alice, &mut store).unwrap();
        run(buy_in(&room, "100"), &owner, &mut store).unwrap();
        run(buy_in(&room, "100"), &alice, &mut store).unwrap();
        run(cash_out(&room, "150"), &owner, &mut store).unwrap();

        let blocked = run(settle_cmd(&room), &owner, &mut store).unwrap();
        assert!(blocked.reply.contains("@alice"));
        assert!(!blocked.changed);

        run(cash_out(&room, "50"), &alice, &mut store).unwrap();

        // A player can view the settlement without closing the room
        let viewed = run(settle_cmd(&room), &alice, &mut store).unwrap();
        assert!(!viewed.changed);
        assert!(!store.get_room(&room).unwrap().is_settled());

        let settled = run(settle_cmd(&room), &owner, &mut store).unwrap();
        assert!(settled.changed);
        assert!(settled.reply.contains("@owner wins $50.00 in total"));
        assert!(settled.reply.contains("@alice owes $50.00"));
        assert!(store.get_room(&room).unwrap().is_settled());

        let late = run(buy_in(&room, "10"), &alice, &mut store);
        assert!(late.is_err());
    }

    #[test]
    fn only_owner_invites_and_deletes() {
        let mut store = InMemoryRoomStore::new();
        let owner = caller(1, "owner");
        let stranger = caller(9, "mallory");
        let room = create_room(&mut store);

        assert!(run(invite(&room, "x"), &stranger, &mut store).is_err());
        let delete = Command::DeleteRoom { room: room.clone() };
        assert!(run(delete, &stranger, &mut store).is_err());
        let summary = Command::Summary { room: room.clone() };
        assert!(run(summary, &stranger, &mut store).is_err());

        run(Command::DeleteRoom { room }, &owner, &mut store).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn room_info_visible_to_invited_players() {
        let mut store = InMemoryRoomStore::new();
        let owner = caller(1, "owner");
        let room = create_room(&mut store);
        run(invite(&room, "alice"), &owner, &mut store).unwrap();
        run(invite(&room, "bob"), &owner, &mut store).unwrap();
        run(join(&room), &caller(2, "alice"), &mut store).unwrap();

        // bob has not joined yet but is on the list
        let show = Command::Room { room: room.clone() };
        let info = run(show, &caller(3, "bob"), &mut store).unwrap();
        assert!(!info.changed);
        assert!(info.reply.contains("[joined]  @alice"));
        assert!(info.reply.contains("[pending] @bob"));

        let stranger = run(Command::Room { room }, &caller(9, "mallory"), &mut store);
        assert!(stranger.is_err());
    }

    #[test]
    fn rejects_malformed_amounts() {
        let mut store = InMemoryRoomStore::new();
        let owner = caller(1, "owner");
        let room = create_room(&mut store);

        assert!(run(buy_in(&room, "-5"), &owner, &mut store).is_err());
        assert!(run(buy_in(&room, "1.234"), &owner, &mut store).is_err());
        assert!(run(cash_out(&room, "92233720368547758"), &owner, &mut store).is_err());
    }

    #[test]
    fn my_rooms_lists_roles() {
        let mut store = InMemoryRoomStore::new();
        let owner = caller(1, "owner");
        let alice = caller(2, "alice");
        let room = create_room(&mut store);
        run(invite(&room, "alice"), &owner, &mut store).unwrap();
        run(join(&room), &alice, &mut store).unwrap();

        let reply = run(Command::MyRooms, &alice, &mut store).unwrap().reply;
        assert!(reply.contains(&format!("{}  (player)", room)));

        let none = run(Command::MyRooms, &caller(3, "carol"), &mut store).unwrap().reply;
        assert_eq!(none, "you are not in any rooms.\n");
    }

    #[test]
    fn missing_config_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), SettlementConfig::default());
    }
}
