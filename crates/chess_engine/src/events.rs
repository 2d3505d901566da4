//! Domain events emitted by the board.
//!
//! Every observable state change becomes one of these. The board appends
//! them to an internal queue in emission order; the owning room drains the
//! queue after each operation and fans the events out verbatim. For a
//! single committed move the order is always `MoveCommitted`, then
//! `MoveProgress` with strictly increasing ratio, then `MoveResolved`
//! followed by any capture/game-over fallout.

use serde::{Deserialize, Serialize};

use crate::piece::{Color, PieceId};
use crate::square::Square;

/// A board state change, in the shape it is broadcast to watchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum BoardEvent {
    /// A piece entered play (setup or promotion).
    PieceAdded { id: PieceId, square: Square },
    /// A piece left play (capture or promotion).
    PieceRemoved { id: PieceId },
    /// A move passed validation; the piece is now in transit and occupies
    /// no square until `MoveResolved`.
    MoveCommitted {
        id: PieceId,
        from: Square,
        to: Square,
    },
    /// Transit interpolation tick; `ratio` grows strictly to 1.0.
    MoveProgress {
        id: PieceId,
        from: Square,
        to: Square,
        ratio: f32,
    },
    /// The piece landed on its destination.
    MoveResolved { id: PieceId, to: Square },
    /// Post-move cooldown tick; `remaining` shrinks toward 0.
    CooldownTick { id: PieceId, remaining: f32 },
    /// The piece may be selected again.
    CooldownCleared { id: PieceId },
    /// The board accepts move requests from now on.
    BoardActivated,
    /// Hard stop: no further process may mutate or emit for this board.
    BoardDisabled,
    /// A king was captured.
    GameOver { winner: Color },
}
