//! The room registry: id -> live room task.
//!
//! Creation is idempotent under concurrency: the registry map is the only
//! shared state, one lock guards it, and the first creator wins — later
//! callers with the same id attach to the existing room. A handle whose
//! channel has closed belongs to a room that already tore itself down and
//! is replaced on the next lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::Rng;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::room::{self, RoomCommand, RoomHandle};

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 10;

#[derive(Clone, Default)]
pub struct RoomRegistry {
    inner: Arc<Mutex<HashMap<String, RoomHandle>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room with this id, spawning it on first reference.
    pub fn get_or_create(&self, id: &str) -> RoomHandle {
        let mut rooms = self.inner.lock().unwrap();
        if let Some(handle) = rooms.get(id) {
            if !handle.tx.is_closed() {
                return handle.clone();
            }
        }
        let handle = room::spawn(id.to_string(), self.clone());
        rooms.insert(id.to_string(), handle.clone());
        handle
    }

    /// Deregisters a finished room, but only the exact instance asking:
    /// the id may have been re-minted for a fresh room in the meantime.
    pub(crate) fn release(&self, id: &str, tx: &UnboundedSender<RoomCommand>) {
        let mut rooms = self.inner.lock().unwrap();
        if rooms.get(id).is_some_and(|h| h.tx.same_channel(tx)) {
            rooms.remove(id);
            debug!(room = %id, "room deregistered");
        }
    }

    /// Random fresh room id.
    pub fn mint_id(&self) -> String {
        let mut rng = rand::rng();
        (0..ID_LEN)
            .map(|_| ID_CHARSET[rng.random_range(0..ID_CHARSET.len())] as char)
            .collect()
    }

    /// Matchmaking pool scan. Preference order: a room where exactly one
    /// side is left to fill and the present side already hit ready, then
    /// any room with one side left, then any occupied room that is not
    /// full. Picks randomly within the best non-empty tier.
    pub fn find_open_room(&self) -> Option<String> {
        use std::sync::atomic::Ordering::Relaxed;

        let rooms = self.inner.lock().unwrap();
        // (id, watchers, sides taken, sides ready) for every live room
        let live: Vec<(String, usize, usize, usize)> = rooms
            .values()
            .filter(|h| !h.tx.is_closed())
            .map(|h| {
                (
                    h.id.clone(),
                    h.status.watchers.load(Relaxed),
                    h.status.sides_taken.load(Relaxed),
                    h.status.sides_ready.load(Relaxed),
                )
            })
            .collect();
        drop(rooms);

        let tiers: [Vec<&String>; 3] = [
            live.iter()
                .filter(|(_, _, sides, ready)| *sides == 1 && *ready == 1)
                .map(|(id, ..)| id)
                .collect(),
            live.iter()
                .filter(|(_, _, sides, _)| *sides == 1)
                .map(|(id, ..)| id)
                .collect(),
            live.iter()
                .filter(|(_, watchers, sides, _)| *watchers > 0 && *sides < 2)
                .map(|(id, ..)| id)
                .collect(),
        ];

        for candidates in tiers {
            if !candidates.is_empty() {
                let mut rng = rand::rng();
                let pick = candidates[rng.random_range(0..candidates.len())];
                return Some(pick.clone());
            }
        }
        None
    }
}
