//! Room storage
//!
//! The settlement engine only needs "give me the room with this id".
//! `RoomStore` is that seam; `InMemoryRoomStore` is the implementation used
//! by the CLI (persisted through [`snapshot`]) and by tests.

pub mod snapshot;

use crate::models::room::{Room, RoomError};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

pub use snapshot::{SnapshotError, StoreSnapshot};

/// Length of generated room ids
pub const ROOM_ID_LEN: usize = 6;

/// Errors that can occur during store operations
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Room already exists: {0}")]
    RoomExists(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error(transparent)]
    Room(#[from] RoomError),
}

/// How a user relates to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomRole {
    Owner,
    Player,
}

/// Record store for rooms
///
/// Reads return owned snapshots; a room is only changed through
/// [`RoomStore::put_room`] or [`RoomStore::update_room`].
pub trait RoomStore {
    fn get_room(&self, room_id: &str) -> Option<Room>;

    /// Insert or replace a room
    fn put_room(&mut self, room: Room);

    /// Returns true if a room was removed
    fn delete_room(&mut self, room_id: &str) -> bool;

    /// All room ids in ascending order
    fn room_ids(&self) -> Vec<String>;

    fn contains_room(&self, room_id: &str) -> bool {
        self.get_room(room_id).is_some()
    }

    /// Insert a new room, refusing to overwrite an existing one
    fn insert_room(&mut self, room: Room) -> Result<(), StoreError> {
        if self.contains_room(room.id()) {
            return Err(StoreError::RoomExists(room.id().to_string()));
        }
        self.put_room(room);
        Ok(())
    }

    /// Apply a change to a stored room
    ///
    /// The room is written back only if `change` succeeds.
    fn update_room<T, F>(&mut self, room_id: &str, change: F) -> Result<T, StoreError>
    where
        Self: Sized,
        F: FnOnce(&mut Room) -> Result<T, RoomError>,
    {
        let mut room = self
            .get_room(room_id)
            .ok_or_else(|| StoreError::RoomNotFound(room_id.to_string()))?;
        let value = change(&mut room)?;
        self.put_room(room);
        Ok(value)
    }

    /// Rooms the user owns, then rooms they have joined
    fn rooms_for_user(&self, user_id: i64, username: &str) -> Vec<(String, RoomRole)> {
        let rooms: Vec<Room> = self
            .room_ids()
            .iter()
            .filter_map(|id| self.get_room(id))
            .collect();

        let mut result: Vec<(String, RoomRole)> = rooms
            .iter()
            .filter(|room| room.is_owner(user_id))
            .map(|room| (room.id().to_string(), RoomRole::Owner))
            .collect();

        for room in &rooms {
            let joined = room
                .find_player(user_id, username)
                .is_some_and(|p| p.is_joined());
            if joined && !result.iter().any(|(id, _)| id == room.id()) {
                result.push((room.id().to_string(), RoomRole::Player));
            }
        }
        result
    }
}

/// In-memory room store with deterministic iteration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryRoomStore {
    rooms: BTreeMap<String, Room>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }
}

impl FromIterator<Room> for InMemoryRoomStore {
    fn from_iter<I: IntoIterator<Item = Room>>(iter: I) -> Self {
        Self {
            rooms: iter
                .into_iter()
                .map(|room| (room.id().to_string(), room))
                .collect(),
        }
    }
}

impl RoomStore for InMemoryRoomStore {
    fn get_room(&self, room_id: &str) -> Option<Room> {
        self.rooms.get(room_id).cloned()
    }

    fn put_room(&mut self, room: Room) {
        self.rooms.insert(room.id().to_string(), room);
    }

    fn delete_room(&mut self, room_id: &str) -> bool {
        self.rooms.remove(room_id).is_some()
    }

    fn room_ids(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }

    fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }
}

/// Generate an unused room id of six lowercase alphanumeric characters
pub fn generate_room_id<S: RoomStore + ?Sized>(store: &S) -> String {
    loop {
        let candidate: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(ROOM_ID_LEN)
            .collect();
        if !store.contains_room(&candidate) {
            return candidate;
        }
    }
}

/// Room ids are exactly six characters of `[a-z0-9]`
pub fn is_valid_room_id(id: &str) -> bool {
    id.len() == ROOM_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
