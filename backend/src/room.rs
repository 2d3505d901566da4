//! Rooms: two sides, any number of watchers, one board.
//!
//! A room is a tokio task draining a [`RoomCommand`] queue. Inbound
//! connection actions, countdown expiry, and transit/cooldown ticks all
//! arrive on the same queue, so every board mutation is applied on one
//! task and two processes can never interleave on the same piece or
//! square index. Timer ticks carry the board epoch they were spawned
//! under; disabling the board bumps the epoch and aborts the timer tasks,
//! which makes disable terminal — stale ticks still in the queue no
//! longer match and are dropped before touching anything.
//!
//! A room tears itself down (and deregisters) as soon as its watcher set
//! becomes empty; there is no reconnect grace period.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, error, trace};
use uuid::Uuid;

use chess_engine::constants::START_WAIT_SECS;
use chess_engine::{Board, Color, EngineResult, MoveRejected, PieceId, Square};
use shared::protocol::ServerEvent;

use crate::process;
use crate::registry::RoomRegistry;

const SIDES: [Color; 2] = [Color::White, Color::Black];

/// One attached watcher: its connection id and the channel events are
/// pushed down.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: Uuid,
    pub tx: UnboundedSender<ServerEvent>,
}

/// Everything a room reacts to, inbound actions and timer ticks alike.
#[derive(Debug, Clone)]
pub enum RoomCommand {
    Join {
        conn: Connection,
    },
    Leave {
        conn_id: Uuid,
    },
    ChooseSide {
        conn_id: Uuid,
        side: Color,
    },
    Ready {
        conn_id: Uuid,
    },
    MoveRequest {
        conn_id: Uuid,
        piece: PieceId,
        to: Square,
    },
    CountdownElapsed {
        epoch: u64,
    },
    TransitTick {
        id: PieceId,
        from: Square,
        to: Square,
        ratio: f32,
        epoch: u64,
    },
    TransitDone {
        id: PieceId,
        to: Square,
        epoch: u64,
    },
    CooldownTick {
        id: PieceId,
        remaining: f32,
        epoch: u64,
    },
    CooldownDone {
        id: PieceId,
        epoch: u64,
    },
}

/// Cheap occupancy counters a room keeps current so the matchmaking scan
/// can read room state without a round trip through its task.
#[derive(Debug, Default)]
pub struct RoomStatus {
    pub watchers: AtomicUsize,
    pub sides_taken: AtomicUsize,
    pub sides_ready: AtomicUsize,
}

/// Handle to a live room task.
#[derive(Clone)]
pub struct RoomHandle {
    pub id: String,
    pub tx: UnboundedSender<RoomCommand>,
    pub status: Arc<RoomStatus>,
}

struct Room {
    id: String,
    board: Board,
    /// Bumped whenever the board disables or re-arms; ticks from older
    /// epochs are stale and dropped.
    epoch: u64,
    watchers: HashMap<Uuid, UnboundedSender<ServerEvent>>,
    sides: HashMap<Color, Uuid>,
    ready: HashSet<Color>,
    processes: Vec<AbortHandle>,
    tx: UnboundedSender<RoomCommand>,
    status: Arc<RoomStatus>,
    joined_once: bool,
}

/// Spawns a room task and returns its handle.
pub fn spawn(id: String, registry: RoomRegistry) -> RoomHandle {
    let (tx, mut rx) = unbounded_channel();
    let status = Arc::new(RoomStatus::default());
    let handle = RoomHandle {
        id: id.clone(),
        tx: tx.clone(),
        status: status.clone(),
    };

    let mut room = Room {
        id,
        board: Board::new(),
        epoch: 0,
        watchers: HashMap::new(),
        sides: HashMap::new(),
        ready: HashSet::new(),
        processes: Vec::new(),
        tx,
        status,
        joined_once: false,
    };

    tokio::spawn(async move {
        debug!(room = %room.id, "room created");
        while let Some(cmd) = rx.recv().await {
            if let Err(err) = room.apply(cmd) {
                error!(room = %room.id, %err, "board state corrupted; shutting room down");
                break;
            }
            room.flush_events();
            room.publish_status();
            if room.joined_once && room.watchers.is_empty() {
                debug!(room = %room.id, "last watcher left, tearing down");
                break;
            }
        }
        room.abort_processes();
        registry.release(&room.id, &room.tx);
    });

    handle
}

impl Room {
    fn apply(&mut self, cmd: RoomCommand) -> EngineResult<()> {
        match cmd {
            RoomCommand::Join { conn } => self.join(conn),
            RoomCommand::Leave { conn_id } => self.leave(conn_id),
            RoomCommand::ChooseSide { conn_id, side } => self.choose_side(conn_id, side),
            RoomCommand::Ready { conn_id } => self.ready(conn_id)?,
            RoomCommand::MoveRequest { conn_id, piece, to } => {
                self.move_request(conn_id, piece, to)?
            }
            RoomCommand::CountdownElapsed { epoch } => {
                // both sides must still be ready: a disconnect or side swap
                // during the countdown cancels the start
                if epoch == self.epoch && self.ready.len() == SIDES.len() {
                    self.board.activate();
                }
            }
            RoomCommand::TransitTick {
                id,
                from,
                to,
                ratio,
                epoch,
            } => {
                if epoch == self.epoch {
                    self.board.transit_progress(&id, from, to, ratio);
                }
            }
            RoomCommand::TransitDone { id, to, epoch } => {
                if epoch == self.epoch {
                    if let Some(cooling) = self.board.resolve(&id, to)? {
                        if !self.board.disabled() {
                            let handle =
                                process::spawn_cooldown(self.tx.clone(), cooling, self.epoch);
                            self.push_process(handle);
                        }
                    }
                }
            }
            RoomCommand::CooldownTick {
                id,
                remaining,
                epoch,
            } => {
                if epoch == self.epoch {
                    self.board.cooldown_tick(&id, remaining);
                }
            }
            RoomCommand::CooldownDone { id, epoch } => {
                if epoch == self.epoch {
                    self.board.cooldown_cleared(&id);
                }
            }
        }
        Ok(())
    }

    fn join(&mut self, conn: Connection) {
        if self.watchers.contains_key(&conn.id) {
            return;
        }
        // replay claimed sides and pending ready acks to the newcomer;
        // board history is not replayed, a mid-game joiner sees events from
        // here on
        for side in self.sides.keys() {
            let _ = conn.tx.send(ServerEvent::SideTaken { side: *side });
        }
        for side in &self.ready {
            let _ = conn.tx.send(ServerEvent::ReadyPending { side: *side });
        }
        debug!(room = %self.id, conn = %conn.id, "watcher joined");
        self.watchers.insert(conn.id, conn.tx);
        self.joined_once = true;
    }

    fn leave(&mut self, conn_id: Uuid) {
        if self.watchers.remove(&conn_id).is_none() {
            return;
        }
        debug!(room = %self.id, conn = %conn_id, "watcher left");

        if let Some(side) = self.side_of(conn_id) {
            self.sides.remove(&side);
            self.ready.remove(&side);
            self.broadcast(ServerEvent::SideFree { side });

            // only a mid-game disconnect touches the board; before a game
            // starts vacating the side is the whole story
            if !self.board.disabled() {
                debug!(room = %self.id, %side, "side disconnected mid-game");
                self.ready.clear();
                self.board.disable();
                self.broadcast(ServerEvent::PlayerDisconnected { side });
            }
        }
    }

    fn choose_side(&mut self, conn_id: Uuid, side: Color) {
        if !self.watchers.contains_key(&conn_id) {
            return;
        }
        if self.sides.contains_key(&side) {
            trace!(room = %self.id, %side, "side already taken");
            return;
        }
        // a connection holds at most one side; claiming a new one vacates
        // the old and voids its ready ack
        if let Some(old) = self.side_of(conn_id) {
            self.sides.remove(&old);
            self.ready.remove(&old);
            self.broadcast(ServerEvent::SideFree { side: old });
        }
        self.sides.insert(side, conn_id);
        self.broadcast(ServerEvent::SideTaken { side });
    }

    fn ready(&mut self, conn_id: Uuid) -> EngineResult<()> {
        let Some(side) = self.side_of(conn_id) else {
            return Ok(());
        };
        if !self.board.disabled() {
            return Ok(()); // game already running
        }
        if self.ready.insert(side) {
            self.broadcast(ServerEvent::ReadyPending { side });
        }
        if self.ready.len() == SIDES.len() {
            self.begin_start_sequence()?;
        }
        Ok(())
    }

    /// Both sides confirmed: broadcast the countdown, re-arm the board
    /// (piece placement events flush right after), and activate once the
    /// countdown elapses.
    fn begin_start_sequence(&mut self) -> EngineResult<()> {
        debug!(room = %self.id, "both sides ready, starting countdown");
        self.epoch += 1;
        self.abort_processes();
        self.broadcast(ServerEvent::Countdown {
            seconds: START_WAIT_SECS,
        });
        self.board.setup_pieces()?;
        let handle = process::spawn_countdown(self.tx.clone(), self.epoch);
        self.push_process(handle);
        Ok(())
    }

    fn move_request(&mut self, conn_id: Uuid, piece: PieceId, to: Square) -> EngineResult<()> {
        let Some(side) = self.side_of(conn_id) else {
            return Ok(()); // watchers without a side cannot move pieces
        };
        match self.board.request_move(&piece, to, side) {
            Ok(orders) => {
                for order in orders {
                    let handle = process::spawn_transit(self.tx.clone(), order, self.epoch);
                    self.push_process(handle);
                }
            }
            Err(MoveRejected::Internal(err)) => return Err(err),
            Err(reject) => {
                // rejected and race-lost actions are silently refused
                trace!(room = %self.id, %reject, "move rejected");
            }
        }
        Ok(())
    }

    /// Drains board events and fans them out in emission order. Disable and
    /// game-over fallout is handled here so it applies no matter which code
    /// path disabled the board.
    fn flush_events(&mut self) {
        for ev in self.board.drain_events() {
            match &ev {
                chess_engine::BoardEvent::GameOver { winner } => {
                    debug!(room = %self.id, %winner, "game over");
                    self.ready.clear();
                }
                chess_engine::BoardEvent::BoardDisabled => {
                    self.epoch += 1;
                    self.abort_processes();
                }
                _ => {}
            }
            self.broadcast(ServerEvent::from(ev));
        }
    }

    fn broadcast(&self, ev: ServerEvent) {
        for tx in self.watchers.values() {
            // a closed channel means the connection is going away; its Leave
            // command is already in flight
            let _ = tx.send(ev.clone());
        }
    }

    fn side_of(&self, conn_id: Uuid) -> Option<Color> {
        SIDES
            .into_iter()
            .find(|side| self.sides.get(side) == Some(&conn_id))
    }

    fn push_process(&mut self, handle: AbortHandle) {
        self.processes.retain(|h| !h.is_finished());
        self.processes.push(handle);
    }

    fn abort_processes(&mut self) {
        for handle in self.processes.drain(..) {
            handle.abort();
        }
    }

    fn publish_status(&self) {
        self.status
            .watchers
            .store(self.watchers.len(), Ordering::Relaxed);
        self.status
            .sides_taken
            .store(self.sides.len(), Ordering::Relaxed);
        self.status
            .sides_ready
            .store(self.ready.len(), Ordering::Relaxed);
    }
}
