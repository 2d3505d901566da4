//! Authoritative game state for server-side real-time chess.
//!
//! Unlike turn-based chess, pieces here move continuously across the board
//! and are immobilized for a fixed cooldown after arriving. The engine is
//! therefore built around three ideas:
//!
//! - The [`Board`] is the single source of truth. It owns every piece, the
//!   square occupancy index, and the per-color destination reservations
//!   that stop two friendly pieces from racing to the same square.
//! - Every state change is reported as a [`BoardEvent`]. The board never
//!   talks to the network itself; the owning room drains the event queue
//!   and fans it out to watchers.
//! - Time-extended work (piece transit, post-move cooldown) is described by
//!   a pure [`Progression`] plan. The async driver that sleeps between
//!   steps lives in the server crate; this crate only does the math, which
//!   keeps the whole rule set synchronously testable.
//!
//! The engine is deliberately not a full chess rules implementation: there
//! is no check or checkmate detection, no en passant, and no draw handling.
//! A game ends when a king is captured.

pub mod board;
pub mod constants;
pub mod error;
pub mod events;
pub mod piece;
pub mod progress;
pub mod square;

pub use board::{Board, TransitOrder};
pub use error::{EngineError, EngineResult, MoveRejected};
pub use events::BoardEvent;
pub use piece::{Color, Piece, PieceId, PieceKind};
pub use progress::Progression;
pub use square::Square;
