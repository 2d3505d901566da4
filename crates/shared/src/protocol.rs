//! Room-scoped wire protocol.
//!
//! Messages travel as JSON text frames over a per-connection bidirectional
//! channel. Client actions carry an `action` tag, server events an `event`
//! tag, both kebab-cased. Board events embed unchanged: the server fans
//! them out verbatim, so the board's own event vocabulary is the bulk of
//! the outbound surface.

use serde::{Deserialize, Serialize};

use chess_engine::{BoardEvent, Color, PieceId, Square};

/// Client -> server actions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Attach to a room as a watcher. A connection may join one room; later
    /// joins on the same connection are ignored.
    Join { room: String },
    /// Claim an unclaimed side. Claiming a new side vacates the old one.
    ChooseSide { side: Color },
    /// Signal readiness to start; requires holding a side.
    Ready,
    /// Ask the board to move a piece. Runs the full validation pipeline;
    /// rejections are silent.
    MoveRequest { piece: PieceId, to: Square },
    /// Detach from the room (same policy as a dropped connection).
    Leave,
}

/// Server -> watcher events, broadcast in emission order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    SideTaken { side: Color },
    SideFree { side: Color },
    ReadyPending { side: Color },
    Countdown { seconds: u64 },
    PlayerDisconnected { side: Color },
    /// Any board state change, re-emitted verbatim.
    #[serde(untagged)]
    Board(BoardEvent),
}

impl From<BoardEvent> for ServerEvent {
    fn from(ev: BoardEvent) -> Self {
        ServerEvent::Board(ev)
    }
}
