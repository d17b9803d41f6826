//! Room model
//!
//! A room is one poker session: an owner plus the players they invited.
//! The room owns every player ledger and enforces the membership rules for
//! buy-ins and cash-outs. Settlement itself lives in `crate::settlement`
//! and only ever reads a room.

use crate::core::money::parse_username;
use crate::models::player::{LedgerError, PlayerLedger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during room operations
#[derive(Debug, Error, PartialEq)]
pub enum RoomError {
    #[error("Room has already been settled")]
    AlreadySettled,

    #[error("@{0} is already in this room")]
    AlreadyInRoom(String),

    #[error("@{0} has not been invited to this room")]
    NotInvited(String),

    #[error("@{0} has already joined this room")]
    AlreadyJoined(String),

    #[error("@{0} is not a member of this room")]
    NotAMember(String),

    #[error("@{0} needs to join the room first")]
    NotJoined(String),

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A poker session and the ledgers of everyone in it
///
/// # Example
/// ```
/// use stac_ledger_core::Room;
///
/// let mut room = Room::new("abc123".to_string(), 1, "owner".to_string());
/// room.invite("@alice").unwrap();
/// room.join("alice", 2).unwrap();
///
/// room.add_buy_in(2, "alice", 10_000).unwrap();
/// room.record_cash_out(2, "alice", 12_500).unwrap();
/// assert_eq!(room.player("alice").unwrap().pnl(), 2_500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    id: String,
    owner_id: i64,
    owner_username: String,

    #[serde(default)]
    created_at: DateTime<Utc>,

    /// Set once the owner has settled the room; blocks further changes
    settled: bool,

    /// Player ledgers in invite order
    players: Vec<PlayerLedger>,

    /// Next buy-in event sequence number
    next_sequence: u64,
}

impl Room {
    pub fn new(id: String, owner_id: i64, owner_username: String) -> Self {
        Self {
            id,
            owner_id,
            owner_username,
            created_at: Utc::now(),
            settled: false,
            players: Vec::new(),
            next_sequence: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn owner_username(&self) -> &str {
        &self.owner_username
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn is_owner(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    pub fn players(&self) -> &[PlayerLedger] {
        &self.players
    }

    pub fn player(&self, username: &str) -> Option<&PlayerLedger> {
        self.players.iter().find(|p| p.id() == username)
    }

    /// Look up a player by chat user id or username
    pub fn find_player(&self, user_id: i64, username: &str) -> Option<&PlayerLedger> {
        self.players.iter().find(|p| p.matches(user_id, username))
    }

    /// Players who take part in settlement, in invite order
    pub fn active_players(&self) -> Vec<PlayerLedger> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .cloned()
            .collect()
    }

    /// Usernames of active players whose cash-out is still missing
    pub fn pending_cashouts(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|p| p.is_pending_cash_out())
            .map(|p| p.id().to_string())
            .collect()
    }

    /// Sum of all buy-ins (cents)
    pub fn total_buy_in(&self) -> i64 {
        self.players.iter().map(PlayerLedger::buy_in).sum()
    }

    /// Owner, or anyone on the player list (invited or joined)
    pub fn is_member(&self, user_id: i64, username: &str) -> bool {
        self.is_owner(user_id) || self.find_player(user_id, username).is_some()
    }

    /// Owner, or a player who has joined
    pub fn has_access(&self, user_id: i64, username: &str) -> bool {
        self.is_owner(user_id)
            || self
                .find_player(user_id, username)
                .is_some_and(PlayerLedger::is_joined)
    }

    /// Invite a player by username (a leading `@` is ignored)
    pub fn invite(&mut self, username: &str) -> Result<(), RoomError> {
        self.ensure_open()?;
        let username = parse_username(username);
        if username.is_empty() {
            return Err(RoomError::EmptyUsername);
        }
        if self.player(username).is_some() {
            return Err(RoomError::AlreadyInRoom(username.to_string()));
        }
        self.players.push(PlayerLedger::invited(username.to_string()));
        tracing::debug!(room = %self.id, player = username, "player invited");
        Ok(())
    }

    /// Accept an invite
    pub fn join(&mut self, username: &str, user_id: i64) -> Result<(), RoomError> {
        let username = parse_username(username);
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id() == username)
            .ok_or_else(|| RoomError::NotInvited(username.to_string()))?;
        if player.is_joined() {
            return Err(RoomError::AlreadyJoined(username.to_string()));
        }
        player.join(user_id);
        tracing::debug!(room = %self.id, player = username, user_id, "player joined");
        Ok(())
    }

    /// Record an additional buy-in, returning the player's new total
    pub fn add_buy_in(
        &mut self,
        user_id: i64,
        username: &str,
        amount: i64,
    ) -> Result<i64, RoomError> {
        self.ensure_open()?;
        let index = self.member_index(user_id, username)?;
        let player = &mut self.players[index];
        let total = player.add_buy_in(amount, self.next_sequence)?;
        self.next_sequence += 1;
        tracing::info!(room = %self.id, player = player.id(), amount, total, "buy-in added");
        Ok(total)
    }

    /// Take back part of a buy-in, returning the player's new total
    pub fn remove_buy_in(
        &mut self,
        user_id: i64,
        username: &str,
        amount: i64,
    ) -> Result<i64, RoomError> {
        self.ensure_open()?;
        let index = self.member_index(user_id, username)?;
        let player = &mut self.players[index];
        let total = player.remove_buy_in(amount, self.next_sequence)?;
        self.next_sequence += 1;
        tracing::info!(room = %self.id, player = player.id(), amount, total, "buy-in removed");
        Ok(total)
    }

    /// Record a player's final chip value, returning their profit or loss
    pub fn record_cash_out(
        &mut self,
        user_id: i64,
        username: &str,
        amount: i64,
    ) -> Result<i64, RoomError> {
        self.ensure_open()?;
        let index = self.member_index(user_id, username)?;
        let player = &mut self.players[index];
        let pnl = player.record_cash_out(amount)?;
        tracing::info!(room = %self.id, player = player.id(), amount, pnl, "cash-out recorded");
        Ok(pnl)
    }

    pub fn mark_settled(&mut self) {
        self.settled = true;
    }

    fn ensure_open(&self) -> Result<(), RoomError> {
        if self.settled {
            return Err(RoomError::AlreadySettled);
        }
        Ok(())
    }

    /// Resolve the ledger a money operation applies to
    ///
    /// The owner always acts on their own ledger (created on first use).
    /// Anyone else must have been invited and have joined.
    fn member_index(&mut self, user_id: i64, username: &str) -> Result<usize, RoomError> {
        let username = parse_username(username);
        let is_owner = self.is_owner(user_id);

        let index = match self.players.iter().position(|p| p.matches(user_id, username)) {
            Some(index) => {
                if !self.players[index].is_joined() {
                    return Err(RoomError::NotJoined(self.players[index].id().to_string()));
                }
                index
            }
            None if is_owner => {
                let owner = self.owner_username.clone();
                match self.players.iter().position(|p| p.id() == owner) {
                    Some(index) => index,
                    None => {
                        self.players.push(PlayerLedger::joined(owner, user_id));
                        self.players.len() - 1
                    }
                }
            }
            None => return Err(RoomError::NotAMember(username.to_string())),
        };

        Ok(index)
    }
}
