//! The board: single source of truth for one match.
//!
//! The board owns three indices that must stay consistent:
//!
//! - `pieces`: piece id -> piece (the authoritative record),
//! - `occupancy`: square -> piece id, the inverse of each piece's `square`
//!   field for every piece not in transit,
//! - `reservations`: (square, color) pairs some piece of that color is
//!   currently moving toward. A reservation exists exactly as long as the
//!   transit is live and blocks a second same-color piece from targeting
//!   the square; enemy pieces are never blocked (collisions resolve as
//!   captures on arrival).
//!
//! Mutations go through the request/commit/resolve pipeline and every
//! observable change is appended to an internal [`BoardEvent`] queue the
//! caller drains. The board never spawns timers: committing a move returns
//! a [`TransitOrder`] and the caller drives progress ticks back in.

use std::collections::{HashMap, HashSet};

use crate::constants::BOARD_SIZE;
use crate::error::{EngineError, EngineResult, MoveRejected};
use crate::events::BoardEvent;
use crate::piece::{Color, Piece, PieceId, PieceKind};
use crate::square::Square;

/// A transit the caller must now drive: the piece has left `from` and
/// reserved `to`, and occupies nothing until the transit resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitOrder {
    pub id: PieceId,
    pub from: Square,
    pub to: Square,
}

/// Authoritative state of one game. Created disabled; `setup_pieces` plus
/// `activate` arm it for play, `disable` is a hard stop.
pub struct Board {
    pieces: HashMap<PieceId, Piece>,
    occupancy: HashMap<Square, PieceId>,
    reservations: HashSet<(Square, Color)>,
    disabled: bool,
    events: Vec<BoardEvent>,
}

impl Board {
    pub fn new() -> Self {
        Board {
            pieces: HashMap::new(),
            occupancy: HashMap::new(),
            reservations: HashSet::new(),
            disabled: true,
            events: Vec::new(),
        }
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn piece(&self, id: &PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.occupancy.get(&square).and_then(|id| self.pieces.get(id))
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_reserved(&self, square: Square, color: Color) -> bool {
        self.reservations.contains(&(square, color))
    }

    /// Drains the queued events in emission order.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Places a piece, deriving its color and kind from the id. Used during
    /// (re)setup and promotion only.
    pub fn add_piece(&mut self, id: PieceId, square: Square) -> EngineResult<()> {
        let (color, kind) = id
            .parse_parts()
            .ok_or_else(|| EngineError::InvalidPieceId(id.to_string()))?;
        if self.occupancy.contains_key(&square) {
            return Err(EngineError::SquareOccupied { square });
        }

        self.occupancy.insert(square, id.clone());
        self.pieces
            .insert(id.clone(), Piece::new(id.clone(), kind, color, square));
        self.events.push(BoardEvent::PieceAdded { id, square });
        Ok(())
    }

    /// Re-arms the board with the standard 32-piece layout, discarding all
    /// previous pieces, reservations, and cooldowns. The board stays
    /// disabled until `activate`.
    pub fn setup_pieces(&mut self) -> EngineResult<()> {
        self.pieces.clear();
        self.occupancy.clear();
        self.reservations.clear();

        const BACK_ROW: [(PieceKind, u8, &str); 8] = [
            (PieceKind::Rook, 1, "1"),
            (PieceKind::Knight, 2, "1"),
            (PieceKind::Bishop, 3, "1"),
            (PieceKind::Queen, 4, "1"),
            (PieceKind::King, 5, "1"),
            (PieceKind::Bishop, 6, "2"),
            (PieceKind::Knight, 7, "2"),
            (PieceKind::Rook, 8, "2"),
        ];

        for color in [Color::White, Color::Black] {
            for (kind, file, discriminator) in BACK_ROW {
                let square = Square::new(file, color.back_rank()).ok_or_else(|| {
                    EngineError::IndexCorruption {
                        detail: "standard layout square off grid".to_string(),
                    }
                })?;
                self.add_piece(PieceId::new(color, kind, discriminator), square)?;
            }
            for file in 1..=BOARD_SIZE {
                let square = Square::new(file, color.pawn_rank()).ok_or_else(|| {
                    EngineError::IndexCorruption {
                        detail: "standard layout square off grid".to_string(),
                    }
                })?;
                self.add_piece(
                    PieceId::new(color, PieceKind::Pawn, &file.to_string()),
                    square,
                )?;
            }
        }
        Ok(())
    }

    pub fn activate(&mut self) {
        if self.disabled {
            self.disabled = false;
            self.events.push(BoardEvent::BoardActivated);
        }
    }

    /// Hard stop. Live transit and cooldown ticks arriving after this point
    /// mutate nothing and emit nothing.
    pub fn disable(&mut self) {
        if !self.disabled {
            self.disabled = true;
            self.events.push(BoardEvent::BoardDisabled);
        }
    }

    /// Shared legality preconditions plus per-type geometry. Pure with
    /// respect to board state: calling it never mutates anything.
    pub fn is_legal_destination(&self, piece: &Piece, to: Square) -> bool {
        let Some(from) = piece.square else {
            return false; // already in transit
        };
        if !piece.is_mobile() {
            return false;
        }
        if self.piece_at(to).is_some_and(|p| p.color == piece.color) {
            return false;
        }
        // race guard: a same-color piece is already moving there
        if self.is_reserved(to, piece.color) {
            return false;
        }
        piece.geometry_allows(self, from, to)
    }

    /// The authorization and validation pipeline. Each step is a hard
    /// rejection with no mutation; on success the move (and, for castling,
    /// the rook's companion move) is committed and the transits to drive
    /// are returned. Off-grid destinations cannot reach this point: they
    /// are unrepresentable as [`Square`] and die at the parsing boundary.
    pub fn request_move(
        &mut self,
        id: &PieceId,
        to: Square,
        side: Color,
    ) -> Result<Vec<TransitOrder>, MoveRejected> {
        if self.disabled {
            return Err(MoveRejected::BoardDisabled);
        }
        let piece = self
            .pieces
            .get(id)
            .ok_or_else(|| MoveRejected::UnknownPiece(id.clone()))?;
        if piece.color != side {
            return Err(MoveRejected::WrongSide(id.clone()));
        }
        if !self.is_legal_destination(piece, to) {
            return Err(MoveRejected::IllegalDestination {
                id: id.clone(),
                to,
            });
        }

        let piece = self
            .pieces
            .get(id)
            .ok_or_else(|| MoveRejected::UnknownPiece(id.clone()))?;
        let from = piece.square.ok_or_else(|| EngineError::IndexCorruption {
            detail: format!("{id} passed validation without a square"),
        })?;
        let castling = piece.kind == PieceKind::King && from.file().abs_diff(to.file()) == 2;

        let mut orders = vec![self.commit(id.clone(), from, to)?];

        if castling {
            // the rook's move was validated as part of castling geometry and
            // goes through the same pipeline, so it gets its own transit and
            // cooldown
            let dir: i8 = if to.file() > from.file() { 1 } else { -1 };
            let corner_file = if dir > 0 { BOARD_SIZE } else { 1 };
            let corner = Square::new(corner_file, from.rank()).ok_or_else(|| {
                EngineError::IndexCorruption {
                    detail: "castling corner off grid".to_string(),
                }
            })?;
            let rook_id = self.occupancy.get(&corner).cloned().ok_or_else(|| {
                EngineError::IndexCorruption {
                    detail: format!("castling rook missing from {corner}"),
                }
            })?;
            let rook_to = Square::new((i16::from(to.file()) - i16::from(dir)) as u8, from.rank())
                .ok_or_else(|| EngineError::IndexCorruption {
                    detail: "castling rook destination off grid".to_string(),
                })?;
            orders.push(self.commit(rook_id, corner, rook_to)?);
        }

        Ok(orders)
    }

    /// Vacates the source square, reserves the destination, and marks the
    /// piece in transit. From here until `resolve` the piece occupies no
    /// square at all.
    fn commit(&mut self, id: PieceId, from: Square, to: Square) -> EngineResult<TransitOrder> {
        let piece = self
            .pieces
            .get_mut(&id)
            .ok_or_else(|| EngineError::IndexCorruption {
                detail: format!("committing move for unknown piece {id}"),
            })?;
        let color = piece.color;
        piece.square = None;

        self.occupancy.remove(&from);
        self.reservations.insert((to, color));
        self.events.push(BoardEvent::MoveCommitted {
            id: id.clone(),
            from,
            to,
        });
        Ok(TransitOrder { id, from, to })
    }

    /// Transit interpolation tick. Emits nothing once the board is disabled
    /// or the piece is gone.
    pub fn transit_progress(&mut self, id: &PieceId, from: Square, to: Square, ratio: f32) {
        if self.disabled {
            return;
        }
        if self.pieces.get(id).is_some_and(Piece::in_transit) {
            self.events.push(BoardEvent::MoveProgress {
                id: id.clone(),
                from,
                to,
                ratio,
            });
        }
    }

    /// Lands a transiting piece on its destination: capture, game-over on
    /// king capture, reservation release, post-move hooks (promotion,
    /// `moved` flags), and cooldown engagement.
    ///
    /// Returns the piece whose cooldown process should now run (the new
    /// queen when the move promoted), or `None` when the board was disabled
    /// before arrival.
    pub fn resolve(&mut self, id: &PieceId, to: Square) -> EngineResult<Option<PieceId>> {
        if self.disabled {
            return Ok(None);
        }
        let (color, kind) = {
            let piece = self
                .pieces
                .get(id)
                .ok_or_else(|| EngineError::IndexCorruption {
                    detail: format!("resolving move for unknown piece {id}"),
                })?;
            (piece.color, piece.kind)
        };

        self.events.push(BoardEvent::MoveResolved {
            id: id.clone(),
            to,
        });

        if let Some(occupant_id) = self.occupancy.get(&to).cloned() {
            let occupant =
                self.pieces
                    .get(&occupant_id)
                    .ok_or_else(|| EngineError::IndexCorruption {
                        detail: format!("occupancy names missing piece {occupant_id} at {to}"),
                    })?;
            if occupant.color == color {
                // validation and reservations exist precisely to prevent this
                return Err(EngineError::IndexCorruption {
                    detail: format!("{id} resolved onto same-color piece {occupant_id} at {to}"),
                });
            }
            let occupant_kind = occupant.kind;
            self.remove_piece(&occupant_id);
            if occupant_kind == PieceKind::King {
                self.events.push(BoardEvent::GameOver { winner: color });
                self.disable();
            }
        }

        self.reservations.remove(&(to, color));
        self.occupancy.insert(to, id.clone());

        let needs_promotion;
        {
            let piece = self
                .pieces
                .get_mut(id)
                .ok_or_else(|| EngineError::IndexCorruption {
                    detail: format!("piece {id} vanished during resolve"),
                })?;
            piece.square = Some(to);
            if matches!(kind, PieceKind::Pawn | PieceKind::Rook | PieceKind::King) {
                piece.moved = true;
            }
            needs_promotion = kind == PieceKind::Pawn && to.rank() == color.promotion_rank();
        }

        let cooldown_target = if needs_promotion {
            self.promote(id, to, color)?
        } else {
            id.clone()
        };

        // cooldown engages immediately; the async ticks only count it down
        if let Some(piece) = self.pieces.get_mut(&cooldown_target) {
            piece.cooldown_remaining = 1.0;
        }
        Ok(Some(cooldown_target))
    }

    /// Cooldown countdown tick.
    pub fn cooldown_tick(&mut self, id: &PieceId, remaining: f32) {
        if self.disabled {
            return;
        }
        if let Some(piece) = self.pieces.get_mut(id) {
            piece.cooldown_remaining = remaining;
            self.events.push(BoardEvent::CooldownTick {
                id: id.clone(),
                remaining,
            });
        }
    }

    /// Restores mobility at the end of a cooldown.
    pub fn cooldown_cleared(&mut self, id: &PieceId) {
        if self.disabled {
            return;
        }
        if let Some(piece) = self.pieces.get_mut(id) {
            piece.cooldown_remaining = 0.0;
            self.events.push(BoardEvent::CooldownCleared { id: id.clone() });
        }
    }

    /// Unconditional promotion: the pawn is removed and a fresh queen takes
    /// its square, inheriting nothing.
    fn promote(&mut self, pawn_id: &PieceId, square: Square, color: Color) -> EngineResult<PieceId> {
        let discriminator = format!("p{}", pawn_id.discriminator().unwrap_or("x"));
        self.remove_piece(pawn_id);
        let queen_id = PieceId::new(color, PieceKind::Queen, &discriminator);
        self.add_piece(queen_id.clone(), square)?;
        Ok(queen_id)
    }

    fn remove_piece(&mut self, id: &PieceId) {
        if let Some(piece) = self.pieces.remove(id) {
            if let Some(square) = piece.square {
                self.occupancy.remove(&square);
            }
            self.events.push(BoardEvent::PieceRemoved { id: id.clone() });
        }
    }

    #[cfg(test)]
    pub(crate) fn piece_mut_for_tests(&mut self, id: &str) -> &mut Piece {
        self.pieces
            .get_mut(&PieceId::from(id))
            .expect("test piece exists")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Progression;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn pid(s: &str) -> PieceId {
        PieceId::from(s)
    }

    fn active_board(pieces: &[(&str, &str)]) -> Board {
        let mut board = Board::new();
        for (id, square) in pieces {
            board.add_piece(pid(id), sq(square)).expect("setup piece");
        }
        board.activate();
        board.drain_events();
        board
    }

    /// Drives a committed transit to completion the way the async driver
    /// would: progress ticks from the transit plan, then resolve.
    fn run_transit(board: &mut Board, order: &TransitOrder) -> Option<PieceId> {
        for ratio in Progression::transit(order.from, order.to).ratios() {
            board.transit_progress(&order.id, order.from, order.to, ratio);
        }
        board.resolve(&order.id, order.to).expect("resolve")
    }

    #[test]
    fn standard_setup_is_a_bijection() {
        let mut board = Board::new();
        board.setup_pieces().unwrap();
        assert_eq!(board.piece_count(), 32);

        let added = board
            .drain_events()
            .into_iter()
            .filter(|ev| matches!(ev, BoardEvent::PieceAdded { .. }))
            .count();
        assert_eq!(added, 32);

        // square->piece and piece->square are mutual inverses
        for piece in board.pieces() {
            let square = piece.square.expect("no piece in transit at setup");
            assert_eq!(board.piece_at(square).map(|p| &p.id), Some(&piece.id));
        }
    }

    #[test]
    fn rearm_discards_previous_state() {
        let mut board = active_board(&[("white-rook-1", "d4")]);
        let orders = board
            .request_move(&pid("white-rook-1"), sq("d8"), Color::White)
            .unwrap();
        assert!(board.is_reserved(sq("d8"), Color::White));
        drop(orders);

        board.setup_pieces().unwrap();
        assert_eq!(board.piece_count(), 32);
        assert!(!board.is_reserved(sq("d8"), Color::White));
        assert_eq!(
            board.piece(&pid("white-rook-1")).unwrap().square,
            Some(sq("a1"))
        );
    }

    #[test]
    fn pipeline_rejects_before_mutating() {
        let mut board = active_board(&[("white-rook-1", "a1"), ("black-rook-1", "h8")]);

        assert!(matches!(
            board.request_move(&pid("white-knight-9"), sq("a4"), Color::White),
            Err(MoveRejected::UnknownPiece(_))
        ));
        assert!(matches!(
            board.request_move(&pid("white-rook-1"), sq("a4"), Color::Black),
            Err(MoveRejected::WrongSide(_))
        ));
        assert!(matches!(
            board.request_move(&pid("white-rook-1"), sq("b2"), Color::White),
            Err(MoveRejected::IllegalDestination { .. })
        ));

        board.disable();
        board.drain_events();
        assert!(matches!(
            board.request_move(&pid("white-rook-1"), sq("a4"), Color::White),
            Err(MoveRejected::BoardDisabled)
        ));

        // no mutation, no events from any rejection
        assert!(board.drain_events().is_empty());
        assert_eq!(board.piece(&pid("white-rook-1")).unwrap().square, Some(sq("a1")));
    }

    #[test]
    fn commit_opens_the_transit_window() {
        let mut board = active_board(&[("white-rook-1", "a1")]);
        let orders = board
            .request_move(&pid("white-rook-1"), sq("a4"), Color::White)
            .unwrap();
        assert_eq!(orders.len(), 1);

        // neither at the old square nor the new one
        let piece = board.piece(&pid("white-rook-1")).unwrap();
        assert!(piece.in_transit());
        assert!(board.piece_at(sq("a1")).is_none());
        assert!(board.piece_at(sq("a4")).is_none());
        assert!(board.is_reserved(sq("a4"), Color::White));

        let events = board.drain_events();
        assert_eq!(
            events,
            vec![BoardEvent::MoveCommitted {
                id: pid("white-rook-1"),
                from: sq("a1"),
                to: sq("a4"),
            }]
        );

        // a transiting piece cannot be re-selected
        assert!(matches!(
            board.request_move(&pid("white-rook-1"), sq("a5"), Color::White),
            Err(MoveRejected::IllegalDestination { .. })
        ));
    }

    #[test]
    fn reservation_blocks_same_color_until_resolve() {
        let mut board = active_board(&[("white-rook-1", "a1"), ("white-rook-2", "a8")]);
        let orders = board
            .request_move(&pid("white-rook-1"), sq("a4"), Color::White)
            .unwrap();

        // second friendly piece may not target the reserved square
        assert!(matches!(
            board.request_move(&pid("white-rook-2"), sq("a4"), Color::White),
            Err(MoveRejected::IllegalDestination { .. })
        ));

        run_transit(&mut board, &orders[0]);
        assert!(!board.is_reserved(sq("a4"), Color::White));
        // still blocked, but now by ordinary same-color occupancy
        assert!(matches!(
            board.request_move(&pid("white-rook-2"), sq("a4"), Color::White),
            Err(MoveRejected::IllegalDestination { .. })
        ));
        assert!(board
            .request_move(&pid("white-rook-2"), sq("a5"), Color::White)
            .is_ok());
    }

    #[test]
    fn enemy_may_target_a_reserved_square() {
        let mut board = active_board(&[("white-rook-1", "a1"), ("black-rook-1", "h4")]);
        board
            .request_move(&pid("white-rook-1"), sq("a4"), Color::White)
            .unwrap();
        // cross-color collisions resolve by capture, never by blocking
        assert!(board
            .request_move(&pid("black-rook-1"), sq("a4"), Color::Black)
            .is_ok());
    }

    #[test]
    fn legality_is_idempotent() {
        let board = active_board(&[("white-rook-1", "a1"), ("black-pawn-1", "a7")]);
        let piece = board.piece(&pid("white-rook-1")).unwrap();
        let first = board.is_legal_destination(piece, sq("a7"));
        let second = board.is_legal_destination(piece, sq("a7"));
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn rook_takes_pawn_across_the_board() {
        // white rook a1, black pawn a8, rook moves a1->a8
        let mut board = active_board(&[("white-rook-1", "a1"), ("black-pawn-1", "a8")]);
        let orders = board
            .request_move(&pid("white-rook-1"), sq("a8"), Color::White)
            .unwrap();
        let cooldown = run_transit(&mut board, &orders[0]);
        assert_eq!(cooldown, Some(pid("white-rook-1")));

        let events = board.drain_events();
        assert!(matches!(events[0], BoardEvent::MoveCommitted { .. }));

        let ratios: Vec<f32> = events
            .iter()
            .filter_map(|ev| match ev {
                BoardEvent::MoveProgress { ratio, .. } => Some(*ratio),
                _ => None,
            })
            .collect();
        assert!(!ratios.is_empty());
        assert!(ratios.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*ratios.last().unwrap(), 1.0);

        let tail: Vec<&BoardEvent> = events
            .iter()
            .filter(|ev| {
                matches!(
                    ev,
                    BoardEvent::MoveResolved { .. } | BoardEvent::PieceRemoved { .. }
                )
            })
            .collect();
        assert_eq!(
            tail,
            vec![
                &BoardEvent::MoveResolved {
                    id: pid("white-rook-1"),
                    to: sq("a8"),
                },
                &BoardEvent::PieceRemoved {
                    id: pid("black-pawn-1"),
                },
            ]
        );

        // rook is sole occupant, pawn is gone from both indices
        assert_eq!(
            board.piece_at(sq("a8")).map(|p| p.id.clone()),
            Some(pid("white-rook-1"))
        );
        assert!(board.piece(&pid("black-pawn-1")).is_none());
        assert_eq!(board.piece_count(), 1);
    }

    #[test]
    fn capturing_the_king_ends_the_game() {
        let mut board = active_board(&[("white-rook-1", "a1"), ("black-king-1", "a8")]);
        let orders = board
            .request_move(&pid("white-rook-1"), sq("a8"), Color::White)
            .unwrap();
        run_transit(&mut board, &orders[0]);

        let events = board.drain_events();
        let game_overs: Vec<&BoardEvent> = events
            .iter()
            .filter(|ev| matches!(ev, BoardEvent::GameOver { .. }))
            .collect();
        assert_eq!(
            game_overs,
            vec![&BoardEvent::GameOver {
                winner: Color::White
            }]
        );
        assert!(events.contains(&BoardEvent::BoardDisabled));
        assert!(board.disabled());

        // disabled board supersedes further requests
        assert!(matches!(
            board.request_move(&pid("white-rook-1"), sq("a1"), Color::White),
            Err(MoveRejected::BoardDisabled)
        ));
    }

    #[test]
    fn pawn_promotes_to_a_fresh_queen() {
        let mut board = active_board(&[("white-pawn-3", "c7")]);
        let orders = board
            .request_move(&pid("white-pawn-3"), sq("c8"), Color::White)
            .unwrap();
        let cooldown = run_transit(&mut board, &orders[0]);
        assert_eq!(cooldown, Some(pid("white-queen-p3")));

        assert!(board.piece(&pid("white-pawn-3")).is_none());
        let queen = board.piece(&pid("white-queen-p3")).expect("queen added");
        assert_eq!(queen.kind, PieceKind::Queen);
        assert_eq!(queen.color, Color::White);
        assert_eq!(queen.square, Some(sq("c8")));
        // cooldown applies as if the queen had just moved
        assert!(!queen.is_mobile());

        let events = board.drain_events();
        assert!(events.contains(&BoardEvent::PieceRemoved {
            id: pid("white-pawn-3")
        }));
        assert!(events.contains(&BoardEvent::PieceAdded {
            id: pid("white-queen-p3"),
            square: sq("c8"),
        }));
    }

    #[test]
    fn black_pawn_promotes_on_rank_one() {
        let mut board = active_board(&[("black-pawn-8", "h2")]);
        let orders = board
            .request_move(&pid("black-pawn-8"), sq("h1"), Color::Black)
            .unwrap();
        let cooldown = run_transit(&mut board, &orders[0]);
        assert_eq!(cooldown, Some(pid("black-queen-p8")));
        assert!(board.piece(&pid("black-queen-p8")).is_some());
    }

    #[test]
    fn castling_commits_the_rook_through_the_same_pipeline() {
        let mut board = active_board(&[("white-king-1", "e1"), ("white-rook-2", "h1")]);
        let orders = board
            .request_move(&pid("white-king-1"), sq("g1"), Color::White)
            .unwrap();
        assert_eq!(
            orders,
            vec![
                TransitOrder {
                    id: pid("white-king-1"),
                    from: sq("e1"),
                    to: sq("g1"),
                },
                TransitOrder {
                    id: pid("white-rook-2"),
                    from: sq("h1"),
                    to: sq("f1"),
                },
            ]
        );
        assert!(board.is_reserved(sq("g1"), Color::White));
        assert!(board.is_reserved(sq("f1"), Color::White));

        for order in &orders {
            run_transit(&mut board, order);
        }
        assert_eq!(board.piece(&pid("white-king-1")).unwrap().square, Some(sq("g1")));
        assert_eq!(board.piece(&pid("white-rook-2")).unwrap().square, Some(sq("f1")));
        assert!(board.piece(&pid("white-king-1")).unwrap().moved);
        assert!(board.piece(&pid("white-rook-2")).unwrap().moved);
    }

    #[test]
    fn queenside_castling_places_rook_beside_king() {
        let mut board = active_board(&[("white-king-1", "e1"), ("white-rook-1", "a1")]);
        let orders = board
            .request_move(&pid("white-king-1"), sq("c1"), Color::White)
            .unwrap();
        assert_eq!(orders[1].id, pid("white-rook-1"));
        assert_eq!(orders[1].to, sq("d1"));
    }

    #[test]
    fn disable_is_terminal_for_live_transits() {
        let mut board = active_board(&[("white-rook-1", "a1")]);
        let orders = board
            .request_move(&pid("white-rook-1"), sq("a8"), Color::White)
            .unwrap();
        board.transit_progress(&orders[0].id, orders[0].from, orders[0].to, 0.2);
        board.drain_events();

        board.disable();
        board.drain_events();

        // neither progress nor completion may emit or mutate now
        board.transit_progress(&orders[0].id, orders[0].from, orders[0].to, 0.4);
        assert_eq!(board.resolve(&orders[0].id, orders[0].to).unwrap(), None);
        assert!(board.drain_events().is_empty());
        assert!(board.piece(&pid("white-rook-1")).unwrap().in_transit());
    }

    #[test]
    fn disable_silences_cooldown_ticks() {
        let mut board = active_board(&[("white-rook-1", "a1")]);
        let orders = board
            .request_move(&pid("white-rook-1"), sq("a2"), Color::White)
            .unwrap();
        run_transit(&mut board, &orders[0]);
        board.drain_events();

        board.disable();
        board.drain_events();

        board.cooldown_tick(&pid("white-rook-1"), 0.5);
        board.cooldown_cleared(&pid("white-rook-1"));
        assert!(board.drain_events().is_empty());
        // cooldown state frozen at the value it had when the board stopped
        assert_eq!(
            board.piece(&pid("white-rook-1")).unwrap().cooldown_remaining,
            1.0
        );
    }

    #[test]
    fn cooldown_cycle_restores_mobility() {
        let mut board = active_board(&[("white-knight-1", "b1")]);
        let orders = board
            .request_move(&pid("white-knight-1"), sq("c3"), Color::White)
            .unwrap();
        run_transit(&mut board, &orders[0]);
        assert!(!board.piece(&pid("white-knight-1")).unwrap().is_mobile());

        board.cooldown_tick(&pid("white-knight-1"), 0.5);
        assert!(!board.piece(&pid("white-knight-1")).unwrap().is_mobile());
        board.cooldown_cleared(&pid("white-knight-1"));
        assert!(board.piece(&pid("white-knight-1")).unwrap().is_mobile());

        let events = board.drain_events();
        assert!(events.contains(&BoardEvent::CooldownTick {
            id: pid("white-knight-1"),
            remaining: 0.5,
        }));
        assert!(events.contains(&BoardEvent::CooldownCleared {
            id: pid("white-knight-1"),
        }));
    }

    #[test]
    fn resolving_onto_same_color_piece_is_index_corruption() {
        let mut board = active_board(&[("white-rook-1", "a1"), ("white-rook-2", "a8")]);
        let orders = board
            .request_move(&pid("white-rook-1"), sq("a4"), Color::White)
            .unwrap();
        // corrupt the indices behind the pipeline's back
        let err = board.resolve(&orders[0].id, sq("a8")).unwrap_err();
        assert!(matches!(err, EngineError::IndexCorruption { .. }));
    }

    #[test]
    fn two_racing_enemies_resolve_by_capture() {
        let mut board = active_board(&[("white-rook-1", "a1"), ("black-rook-1", "h4")]);
        let white = board
            .request_move(&pid("white-rook-1"), sq("a4"), Color::White)
            .unwrap();
        let black = board
            .request_move(&pid("black-rook-1"), sq("a4"), Color::Black)
            .unwrap();

        run_transit(&mut board, &white[0]);
        // black arrives second and captures the white rook on the square
        run_transit(&mut board, &black[0]);

        assert!(board.piece(&pid("white-rook-1")).is_none());
        assert_eq!(
            board.piece_at(sq("a4")).map(|p| p.id.clone()),
            Some(pid("black-rook-1"))
        );
    }
}
