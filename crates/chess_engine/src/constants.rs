//! Tunable game constants.
//!
//! Speeds are expressed as "ratio advanced per tick": a transit over one
//! square finishes in `1.0 / PIECE_SPEED` ticks, and diagonal moves cover
//! each axis as fast as straight moves (duration scales with Chebyshev
//! distance, not Euclidean).

/// Ratio advanced per transit tick for a one-square move.
pub const PIECE_SPEED: f32 = 0.2;

/// Milliseconds between transit progress ticks.
pub const TRANSIT_TICK_MS: u64 = 50;

/// Ratio advanced per cooldown tick (cooldown is fixed-length).
pub const COOLDOWN_SPEED: f32 = 0.1;

/// Milliseconds between cooldown ticks.
pub const COOLDOWN_TICK_MS: u64 = 100;

/// Seconds between both sides confirming start and the board activating.
pub const START_WAIT_SECS: u64 = 3;

/// Files and ranks both run 1..=BOARD_SIZE.
pub const BOARD_SIZE: u8 = 8;
