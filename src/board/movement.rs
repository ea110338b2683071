use arrayvec::ArrayVec;

use super::{GameState, Position};
use crate::core::*;
use crate::geometry::castling_kept;

/******************************************\
|==========================================|
|                Move Spec                 |
|==========================================|
\******************************************/

/// A fully resolved move, ready to be turned into remove and place operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSpec {
    Normal {
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    },
    EnPassant {
        from: Square,
        to: Square,
    },
    Castle(CastleSide),
    /// A pass: only the side to move changes
    Null,
}

/******************************************\
|==========================================|
|              Position Delta              |
|==========================================|
\******************************************/

/// # Position Delta
///
/// Exactly what one applied move changed: the men lifted off the board, the
/// men put down, and the game state on either side of the move. Reverting a
/// delta puts the board back exactly as it was.
///
/// `snapshot` is the occupancy after the move, so any recorded delta can be
/// turned back into a full `Position` without replaying the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDelta {
    pub removed: ArrayVec<(Square, Man), 2>,
    pub placed: ArrayVec<(Square, Man), 2>,
    pub before: GameState,
    pub after: GameState,
    pub snapshot: [Option<Man>; Square::NUM],
}

impl PositionDelta {
    /// The position this delta leads to
    pub fn position(&self) -> Position {
        Position::from_parts(&self.snapshot, self.after)
    }

    /// Whether an opposing man was taken off the board
    pub fn is_capture(&self) -> bool {
        let us = self.before.active;
        self.removed.iter().any(|(_, man)| man.colour() != us)
    }
}

/******************************************\
|==========================================|
|               Make / Undo                |
|==========================================|
\******************************************/

impl Position {
    /// Lifts the men on `removes`, places `places`, and advances the game state.
    ///
    /// - Castling rights are masked by every square touched, so a king or rook
    ///   leaving home, or a rook captured at home, loses its rights for good.
    /// - The en passant target is set only after a two-square pawn advance.
    /// - The halfmove clock resets on a capture or pawn move.
    /// - The fullmove number advances after Black moves.
    ///
    /// The replaced game state is pushed for `undo_last`.
    pub fn apply_move(&mut self, removes: &[Square], places: &[(Square, Man)]) -> PositionDelta {
        let before = self.state;
        let us = before.active;

        let removed: ArrayVec<(Square, Man), 2> = removes
            .iter()
            .filter_map(|&sq| self.remove_man(sq).map(|man| (sq, man)))
            .collect();

        for &(sq, man) in places {
            self.add_man(sq, man);
        }
        let placed: ArrayVec<(Square, Man), 2> = places.iter().copied().collect();

        let mut castling = before.castling;
        for sq in removes.iter().chain(places.iter().map(|(sq, _)| sq)) {
            castling.mask(castling_kept(*sq));
        }

        let capture = removed.iter().any(|(_, man)| man.colour() != us);
        let pawn_moved = removed
            .iter()
            .any(|(_, man)| man.colour() == us && man.pt() == PieceType::Pawn);

        let en_passant = match (removed.as_slice(), placed.as_slice()) {
            ([(from, lifted)], [(to, put)])
                if lifted.pt() == PieceType::Pawn
                    && put.pt() == PieceType::Pawn
                    && from.file() == to.file()
                    && Square::rank_dist(*from, *to) == 2 =>
            {
                from.offset(0, us.forward())
            }
            _ => None,
        };

        let after = GameState {
            active: !us,
            castling,
            en_passant,
            halfmove: if capture || pawn_moved { 0 } else { before.halfmove.saturating_add(1) },
            fullmove: match us {
                Colour::White => before.fullmove,
                Colour::Black => before.fullmove.saturating_add(1),
            },
        };

        self.history.push(before);
        self.state = after;

        PositionDelta {
            removed,
            placed,
            before,
            after,
            snapshot: self.board,
        }
    }

    /// Restores the game state replaced by the most recent `apply_move`.
    ///
    /// Occupancy is the caller's business; `revert` does both.
    pub fn undo_last(&mut self) {
        debug_assert!(!self.history.is_empty(), "undo_last: no move to undo");
        if let Some(prev) = self.history.pop() {
            self.state = prev;
        }
    }

    /// Takes back `delta`, which must be the most recently applied move
    pub fn revert(&mut self, delta: &PositionDelta) {
        debug_assert_eq!(self.state, delta.after, "revert: delta is not the latest move");

        for &(sq, _) in delta.placed.iter().rev() {
            self.remove_man(sq);
        }
        for &(sq, man) in delta.removed.iter().rev() {
            self.add_man(sq, man);
        }

        self.undo_last();
    }

    /// Turns a resolved move into remove and place operations and applies it.
    ///
    /// No legality checks happen here; see `mover` for those.
    pub fn make(&mut self, spec: &MoveSpec) -> PositionDelta {
        let us = self.state.active;

        let mut removes = ArrayVec::<Square, 2>::new();
        let mut places = ArrayVec::<(Square, Man), 2>::new();

        match *spec {
            MoveSpec::Normal { from, to, promotion } => {
                debug_assert!(self.on(from).is_some(), "make: {from} is empty");
                removes.push(from);
                if self.on(to).is_some() {
                    removes.push(to);
                }
                if let Some(man) = self.on(from) {
                    places.push((to, promotion.map_or(man, |pt| man.promoted(pt))));
                }
            }

            MoveSpec::EnPassant { from, to } => {
                removes.push(from);
                removes.push(Square::from_parts(to.file(), from.rank()));
                if let Some(man) = self.on(from) {
                    places.push((to, man));
                }
            }

            MoveSpec::Castle(side) => {
                let home = Rank::Rank1.relative(us);
                let king_from = Square::from_parts(File::FileE, home);
                let rook_from = Square::from_parts(side.rook_from_file(), home);

                removes.push(king_from);
                removes.push(rook_from);
                if let (Some(king), Some(rook)) = (self.on(king_from), self.on(rook_from)) {
                    places.push((Square::from_parts(side.king_to_file(), home), king));
                    places.push((Square::from_parts(side.rook_to_file(), home), rook));
                }
            }

            MoveSpec::Null => {}
        }

        self.apply_move(&removes, &places)
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
