//! Real-time chess server.
//!
//! Each room runs as one tokio task owning a board; all mutation for a
//! room happens on that task, so rooms are serialized internally and fully
//! parallel across each other. Piece transits and cooldowns run as
//! separate timer tasks that feed ticks back into the owning room's
//! command queue, where they are applied (or dropped as stale) against the
//! board. The HTTP layer is a thin axum surface: room minting, a
//! matchmaking scan, and the websocket channel every action and event
//! travels over.

pub mod api;
pub mod process;
pub mod registry;
pub mod room;
