//! Board coordinates and algebraic notation.
//!
//! A [`Square`] is a (file, rank) pair with both components in 1..=8.
//! Construction is checked, so holding a `Square` is proof the coordinate
//! is on the grid; off-grid input is rejected at the parsing boundary
//! before it can reach any board mutation.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::constants::BOARD_SIZE;

const FILE_LETTERS: &str = "abcdefgh";

/// A board coordinate. File `1` is the a-file, rank `1` is White's back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

/// Error parsing algebraic notation into a [`Square`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid square notation: {input:?}")]
pub struct ParseSquareError {
    input: String,
}

impl Square {
    /// Builds a square, rejecting off-grid coordinates.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if (1..=BOARD_SIZE).contains(&file) && (1..=BOARD_SIZE).contains(&rank) {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// Chebyshev distance: the number of king steps between two squares.
    /// Transit duration is proportional to this, so diagonal moves advance
    /// both axes at full speed.
    pub fn chebyshev(self, other: Square) -> u8 {
        self.file
            .abs_diff(other.file)
            .max(self.rank.abs_diff(other.rank))
    }

    /// The square offset by (Δfile, Δrank), or `None` if that leaves the grid.
    pub fn offset(self, dfile: i8, drank: i8) -> Option<Square> {
        let file = i16::from(self.file) + i16::from(dfile);
        let rank = i16::from(self.rank) + i16::from(drank);
        if (1..=i16::from(BOARD_SIZE)).contains(&file) && (1..=i16::from(BOARD_SIZE)).contains(&rank)
        {
            Square::new(file as u8, rank as u8)
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = FILE_LETTERS
            .as_bytes()
            .get(usize::from(self.file) - 1)
            .copied()
            .unwrap_or(b'?') as char;
        write!(f, "{}{}", letter, self.rank)
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError {
            input: s.to_string(),
        };

        let mut chars = s.chars();
        let file_char = chars.next().ok_or_else(err)?;
        let rank_char = chars.next().ok_or_else(err)?;
        if chars.next().is_some() {
            return Err(err());
        }

        let file = FILE_LETTERS.find(file_char).ok_or_else(err)? as u8 + 1;
        let rank = rank_char.to_digit(10).ok_or_else(err)? as u8;

        Square::new(file, rank).ok_or_else(err)
    }
}

// On the wire a square is its algebraic name ("e4"), matching the notation
// used in piece ids and log lines.
impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
