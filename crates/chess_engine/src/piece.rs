//! Pieces: identity, per-type movement geometry, and mobility state.
//!
//! Legality is split in two layers. The board enforces the shared
//! preconditions (piece on a square, no cooldown, destination not held or
//! reserved by the same color); [`Piece::geometry_allows`] then answers the
//! per-type question "can this kind of piece travel from here to there on
//! this board", dispatched by a `match` on [`PieceKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::square::Square;

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank direction pawns of this color advance in.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank the back-row pieces start on.
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }

    /// Rank the pawns start on.
    pub fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Farthest rank; a pawn arriving here promotes.
    pub fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Color::White),
            "black" => Ok(Color::Black),
            _ => Err(()),
        }
    }
}

/// Piece type tag; all per-type behavior dispatches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Rook => "rook",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        };
        f.write_str(name)
    }
}

impl FromStr for PieceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pawn" => Ok(PieceKind::Pawn),
            "rook" => Ok(PieceKind::Rook),
            "knight" => Ok(PieceKind::Knight),
            "bishop" => Ok(PieceKind::Bishop),
            "queen" => Ok(PieceKind::Queen),
            "king" => Ok(PieceKind::King),
            _ => Err(()),
        }
    }
}

/// Stable piece identity of the form `<color>-<kind>-<discriminator>`,
/// e.g. `white-rook-1`. The color and kind are recoverable from the id,
/// which is what [`crate::Board::add_piece`] relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    pub fn new(color: Color, kind: PieceKind, discriminator: &str) -> Self {
        PieceId(format!("{color}-{kind}-{discriminator}"))
    }

    /// Recovers the color and kind encoded in the id, or `None` when the id
    /// is malformed.
    pub fn parse_parts(&self) -> Option<(Color, PieceKind)> {
        let mut parts = self.0.splitn(3, '-');
        let color = parts.next()?.parse().ok()?;
        let kind = parts.next()?.parse().ok()?;
        parts.next()?;
        Some((color, kind))
    }

    /// The instance discriminator, e.g. `"1"` in `white-rook-1`.
    pub fn discriminator(&self) -> Option<&str> {
        self.0.splitn(3, '-').nth(2)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PieceId {
    fn from(s: &str) -> Self {
        PieceId(s.to_string())
    }
}

impl From<String> for PieceId {
    fn from(s: String) -> Self {
        PieceId(s)
    }
}

/// A piece owned by a board. `square` is `None` while the piece is in
/// transit between squares; a transiting piece occupies nothing and cannot
/// be selected or captured.
#[derive(Debug, Clone)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub color: Color,
    pub square: Option<Square>,
    /// Set after the first completed move; gates pawn double-steps and
    /// castling eligibility.
    pub moved: bool,
    /// Remaining cooldown ratio; the piece may only be selected at 0.
    pub cooldown_remaining: f32,
}

impl Piece {
    pub(crate) fn new(id: PieceId, kind: PieceKind, color: Color, square: Square) -> Self {
        Piece {
            id,
            kind,
            color,
            square: Some(square),
            moved: false,
            cooldown_remaining: 0.0,
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.cooldown_remaining == 0.0
    }

    pub fn in_transit(&self) -> bool {
        self.square.is_none()
    }

    /// Per-type movement geometry from `from` to `to`, given current board
    /// occupancy. Shared preconditions (mobility, same-color occupancy and
    /// reservations) are the board's job and are not re-checked here.
    pub fn geometry_allows(&self, board: &Board, from: Square, to: Square) -> bool {
        let dfile = i16::from(to.file()) - i16::from(from.file());
        let drank = i16::from(to.rank()) - i16::from(from.rank());

        match self.kind {
            PieceKind::Pawn => self.pawn_geometry(board, from, to),
            PieceKind::Rook => (dfile == 0 || drank == 0) && path_clear(board, from, to),
            PieceKind::Knight => {
                (dfile.abs() == 1 && drank.abs() == 2) || (dfile.abs() == 2 && drank.abs() == 1)
            }
            PieceKind::Bishop => dfile.abs() == drank.abs() && path_clear(board, from, to),
            PieceKind::Queen => {
                (dfile == 0 || drank == 0 || dfile.abs() == drank.abs())
                    && path_clear(board, from, to)
            }
            PieceKind::King => {
                if dfile.abs() <= 1 && drank.abs() <= 1 {
                    return true;
                }
                self.castling_geometry(board, from, to)
            }
        }
    }

    fn pawn_geometry(&self, board: &Board, from: Square, to: Square) -> bool {
        let dir = i16::from(self.color.forward());
        let dfile = i16::from(to.file()) - i16::from(from.file());
        let drank = i16::from(to.rank()) - i16::from(from.rank());

        let enemy_at_dest = board
            .piece_at(to)
            .is_some_and(|p| p.color != self.color);

        if board.piece_at(to).is_none() {
            // forward one
            if dfile == 0 && drank == dir {
                return true;
            }
            // forward two from the start rank, intermediate square empty
            if dfile == 0 && drank == 2 * dir && !self.moved {
                return from
                    .offset(0, self.color.forward())
                    .is_some_and(|mid| board.piece_at(mid).is_none());
            }
        }

        // diagonal capture only
        enemy_at_dest && dfile.abs() == 1 && drank == dir
    }

    /// Castling: two files sideways on the home rank, with an unmoved rook
    /// on the matching corner and nothing in between. Whether the king's
    /// path is under attack is deliberately not checked.
    fn castling_geometry(&self, board: &Board, from: Square, to: Square) -> bool {
        if self.moved || to.rank() != from.rank() || from.file().abs_diff(to.file()) != 2 {
            return false;
        }

        let dir: i8 = if to.file() > from.file() { 1 } else { -1 };
        let corner_file = if dir > 0 { 8 } else { 1 };
        let Some(corner) = Square::new(corner_file, from.rank()) else {
            return false;
        };

        match board.piece_at(corner) {
            Some(rook) => {
                rook.kind == PieceKind::Rook
                    && rook.color == self.color
                    && !rook.moved
                    && path_clear(board, from, corner)
            }
            None => false,
        }
    }
}

/// True when every square strictly between `from` and `to` along a straight
/// line (file, rank, or diagonal) is empty. Callers guarantee the two
/// squares are actually in line.
fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let dfile = (i16::from(to.file()) - i16::from(from.file())).signum();
    let drank = (i16::from(to.rank()) - i16::from(from.rank())).signum();

    let mut file = i16::from(from.file()) + dfile;
    let mut rank = i16::from(from.rank()) + drank;

    while (file, rank) != (i16::from(to.file()), i16::from(to.rank())) {
        match Square::new(file as u8, rank as u8) {
            Some(square) if board.piece_at(square).is_none() => {}
            _ => return false,
        }
        file += dfile;
        rank += drank;
    }
    true
}
