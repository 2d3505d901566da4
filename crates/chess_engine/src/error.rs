//! Error types for the game engine.
//!
//! Two severities exist. A [`MoveRejected`] is the normal outcome of an
//! illegal or stale request: the board is untouched, no event is emitted,
//! and the caller may simply drop it. An [`EngineError`] is corruption of
//! the piece/occupancy indices, which validation is supposed to make
//! impossible; it is fatal to the owning room and must be surfaced loudly
//! rather than swallowed.

use thiserror::Error;

use crate::piece::PieceId;
use crate::square::Square;

/// Invariant-violation class failures; fatal to the owning room.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A piece id that does not encode a valid color and kind.
    #[error("invalid piece id: {0}")]
    InvalidPieceId(String),

    /// Attempt to place a piece on an occupied square during setup.
    #[error("square {square} is already occupied")]
    SquareOccupied { square: Square },

    /// The piece/occupancy indices disagree with each other.
    #[error("board index corruption: {detail}")]
    IndexCorruption { detail: String },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Why a move request was refused. These are silent rejections: nothing
/// was mutated and no event was emitted, except for [`MoveRejected::Internal`]
/// which wraps a fatal [`EngineError`].
#[derive(Error, Debug)]
pub enum MoveRejected {
    #[error("board is disabled")]
    BoardDisabled,

    /// Unknown piece; also the race-lost case where the piece was captured
    /// between request and evaluation.
    #[error("unknown piece: {0}")]
    UnknownPiece(PieceId),

    #[error("piece {0} is not controlled by the requesting side")]
    WrongSide(PieceId),

    #[error("illegal destination {to} for {id}")]
    IllegalDestination { id: PieceId, to: Square },

    /// Not a rejection: index corruption detected mid-pipeline.
    #[error(transparent)]
    Internal(#[from] EngineError),
}
