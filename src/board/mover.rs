//! Legality checks for moves read from movetext.
//!
//! Every entry point here takes a move that has already been matched
//! structurally and either applies it, returning its `PositionDelta`, or
//! leaves the position untouched and says why the move is illegal.
//!
//! Pins and discovered checks are found by trying the move on the live
//! board, asking whether the mover's king is attacked, and reverting.

use arrayvec::ArrayVec;
use thiserror::Error;

use super::attacks::slides_along;
use super::{MoveSpec, Position, PositionDelta, MAX_PER_INDEX};
use crate::core::*;
use crate::geometry;

/// Squares of the candidate men for one move
type Candidates = ArrayVec<Square, MAX_PER_INDEX>;

/******************************************\
|==========================================|
|              Mover Search                |
|==========================================|
\******************************************/

impl Position {
    /// Whether making `spec` would leave the mover's own king attacked
    pub fn move_exposes_king(&mut self, spec: &MoveSpec) -> bool {
        let us = self.active();
        let delta = self.make(spec);
        let exposed = self.is_king_in_check(us);
        self.revert(&delta);
        exposed
    }

    /// Finds the one man of kind `pt` that can legally move to `to`.
    ///
    /// Candidates come from the index list of the kind, filtered by the
    /// geometry tables, a clear path, and a speculative check test. The
    /// source hint then narrows the legal candidates to exactly one.
    ///
    /// With `strict`, the hint must be the minimal one standard algebraic
    /// notation calls for: none when the mover is unique, else the file,
    /// else the rank, else both.
    pub fn find_unique_mover(
        &mut self,
        pt: PieceType,
        to: Square,
        file: Option<File>,
        rank: Option<Rank>,
        strict: bool,
    ) -> Result<Square, MoveError> {
        debug_assert!(pt != PieceType::Pawn, "pawns are resolved by pawn_move");

        let us = self.active();
        let piece = Piece::from_parts(us, pt);
        let occupied = self.all_occupied_bb();

        if self.occupied_bb(us).contains(to) {
            return Err(MoveError::Occupied(to));
        }

        let reachable: Candidates = self
            .pieces_of(us, pt)
            .iter()
            .copied()
            .filter(|&from| geometry::sources(pt, us, to).contains(from))
            .collect();

        let candidates: Candidates = reachable
            .iter()
            .copied()
            .filter(|&from| {
                !pt.is_slider() || geometry::ray(from, to).is_some_and(|ray| ray.is_clear(occupied))
            })
            .collect();

        let legal: Candidates = candidates
            .iter()
            .copied()
            .filter(|&from| !self.move_exposes_king(&MoveSpec::Normal { from, to, promotion: None }))
            .collect();

        let hinted = |sq: &&Square| file.is_none_or(|f| f == sq.file()) && rank.is_none_or(|r| r == sq.rank());
        let matching: Candidates = legal.iter().filter(hinted).copied().collect();

        match matching.as_slice() {
            [from] => {
                if strict && (file, rank) != canonical_hint(*from, &legal) {
                    return Err(MoveError::SuperfluousDisambiguation { piece, from: *from, to });
                }
                Ok(*from)
            }
            [] if candidates.iter().any(|sq| hinted(&sq)) => Err(MoveError::KingLeftInCheck),
            [] if reachable.iter().any(|sq| hinted(&sq)) => Err(MoveError::PathBlocked { piece, to }),
            [] => Err(MoveError::NoPiece { piece, to }),
            many => Err(MoveError::Ambiguous { piece, to, count: many.len() }),
        }
    }
}

/// The minimal source hint standard algebraic notation needs for `from`
/// among the `legal` movers
fn canonical_hint(from: Square, legal: &[Square]) -> (Option<File>, Option<Rank>) {
    let others = || legal.iter().filter(move |&&sq| sq != from);

    if others().next().is_none() {
        (None, None)
    } else if others().all(|sq| sq.file() != from.file()) {
        (Some(from.file()), None)
    } else if others().all(|sq| sq.rank() != from.rank()) {
        (None, Some(from.rank()))
    } else {
        (Some(from.file()), Some(from.rank()))
    }
}

/******************************************\
|==========================================|
|            Checked Entry Points          |
|==========================================|
\******************************************/

impl Position {
    /// Applies `spec` unless it leaves the mover in check
    fn apply_checked(&mut self, spec: MoveSpec) -> Result<PositionDelta, MoveError> {
        let us = self.active();
        let delta = self.make(&spec);
        if self.is_king_in_check(us) {
            self.revert(&delta);
            return Err(MoveError::KingLeftInCheck);
        }
        Ok(delta)
    }

    /// Checks and applies a knight, bishop, rook, queen or king move.
    /// Pawn moves are passed on to `pawn_move`.
    pub fn piece_move(&mut self, san: &SanMove, strict: bool) -> Result<PositionDelta, MoveError> {
        if san.piece == PieceType::Pawn {
            return self.pawn_move(san, strict);
        }
        if san.promotion.is_some() {
            return Err(MoveError::BadPromotion(san.to));
        }

        let from = self.find_unique_mover(san.piece, san.to, san.file, san.rank, strict)?;

        let captures = self.on(san.to).is_some();
        if (san.capture && !captures) || (strict && captures && !san.capture) {
            return Err(MoveError::CaptureMismatch(san.to));
        }

        self.apply_checked(MoveSpec::Normal { from, to: san.to, promotion: None })
    }

    /// Checks and applies a pawn push, capture, en passant capture or promotion.
    ///
    /// A capture is recognised by the capture mark, or by a source file other
    /// than the destination file (long algebraic `e4d5`).
    pub fn pawn_move(&mut self, san: &SanMove, strict: bool) -> Result<PositionDelta, MoveError> {
        let us = self.active();
        let to = san.to;
        let pawn = Piece::from_parts(us, PieceType::Pawn);

        match (to.rank() == us.promotion_rank(), san.promotion) {
            (true, None) => return Err(MoveError::MissingPromotion(to)),
            (true, Some(pt)) if !PieceType::PROMOTIONS.contains(&pt) => {
                return Err(MoveError::BadPromotion(to));
            }
            (false, Some(_)) => return Err(MoveError::BadPromotion(to)),
            _ => {}
        }

        if self.occupied_bb(us).contains(to) {
            return Err(MoveError::Occupied(to));
        }

        let spec = if san.capture || san.changes_file() {
            let from = san
                .file
                .filter(|f| (*f as u8).abs_diff(to.file() as u8) == 1)
                .and_then(|f| to.offset(f as i8 - to.file() as i8, -us.forward()))
                .filter(|&from| san.hint_matches(from) && self.piece_on(from) == Some(pawn))
                .ok_or(MoveError::NoPiece { piece: pawn, to })?;

            match self.on(to) {
                Some(_) => MoveSpec::Normal { from, to, promotion: san.promotion },
                None if self.en_passant() == Some(to) => MoveSpec::EnPassant { from, to },
                None if to.rank() == Rank::Rank6.relative(us) => {
                    return Err(MoveError::IllegalEnPassant(to));
                }
                None => return Err(MoveError::CaptureMismatch(to)),
            }
        } else {
            if self.on(to).is_some() {
                return Err(match strict {
                    true => MoveError::CaptureMismatch(to),
                    false => MoveError::Occupied(to),
                });
            }

            let from = match *geometry::pawn_push_sources(us, to).as_slice() {
                [single, ..] if self.piece_on(single) == Some(pawn) => single,
                [single, double] if self.on(single).is_none() && self.piece_on(double) == Some(pawn) => double,
                _ => return Err(MoveError::NoPiece { piece: pawn, to }),
            };
            if !san.hint_matches(from) {
                return Err(MoveError::NoPiece { piece: pawn, to });
            }

            MoveSpec::Normal { from, to, promotion: san.promotion }
        };

        self.apply_checked(spec)
    }

    /// Checks and applies castling for the side to move.
    ///
    /// King and rook must stand on their home squares with the right still
    /// held, the squares between them must be empty, and the king may not
    /// start on, pass over or land on an attacked square.
    pub fn castle(&mut self, side: CastleSide) -> Result<PositionDelta, MoveError> {
        let us = self.active();
        let them = !us;
        let home = Rank::Rank1.relative(us);
        let king_from = Square::from_parts(File::FileE, home);
        let king_to = Square::from_parts(side.king_to_file(), home);
        let rook_from = Square::from_parts(side.rook_from_file(), home);

        let legal = self.castling().has(Castling::right(us, side))
            && self.piece_on(king_from) == Some(Piece::from_parts(us, PieceType::King))
            && self.piece_on(rook_from) == Some(Piece::from_parts(us, PieceType::Rook))
            && (geometry::between(king_from, rook_from) & self.all_occupied_bb()).is_empty()
            && !self.is_attacked(king_from, them)
            && !(geometry::between(king_from, king_to) | king_to.bb())
                .any(|sq| self.is_attacked(sq, them));

        match legal {
            true => Ok(self.make(&MoveSpec::Castle(side))),
            false => Err(MoveError::IllegalCastle(side)),
        }
    }

    /// Passes the move to the opponent. Not allowed while in check.
    pub fn null_move(&mut self) -> Result<PositionDelta, MoveError> {
        if self.is_king_in_check(self.active()) {
            return Err(MoveError::NullMoveInCheck);
        }
        Ok(self.make(&MoveSpec::Null))
    }

    /// Resolves a move that reads both as a bishop move and as a b-file pawn move.
    ///
    /// Both readings are tried on the live board; exactly one may be legal.
    pub fn bishop_or_pawn(
        &mut self,
        bishop: &SanMove,
        pawn: &SanMove,
        strict: bool,
    ) -> Result<PositionDelta, MoveError> {
        let mut legal = ArrayVec::<&SanMove, 2>::new();
        for san in [bishop, pawn] {
            if let Ok(delta) = self.piece_move(san, strict) {
                self.revert(&delta);
                legal.push(san);
            }
        }

        match legal.as_slice() {
            [san] => self.piece_move(san, strict),
            both => Err(MoveError::BishopOrPawnUnresolved { both_legal: !both.is_empty() }),
        }
    }

    /// Whether any man of the side to move can legally go to `to`.
    ///
    /// Used by the annotator to test captures of a checker and interpositions.
    pub(crate) fn can_reach(&mut self, to: Square, include_king: bool) -> bool {
        let us = self.active();
        let occupied = self.all_occupied_bb();
        let mut specs = ArrayVec::<MoveSpec, 32>::new();

        for pt in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ] {
            if pt == PieceType::King && !include_king {
                continue;
            }
            for &from in self.pieces_of(us, pt) {
                let reaches = match geometry::ray(from, to) {
                    Some(ray) if pt.is_slider() => {
                        slides_along(pt, ray.kind) && ray.is_clear(occupied)
                    }
                    _ => !pt.is_slider() && geometry::sources(pt, us, to).contains(from),
                };
                if reaches {
                    specs.push(MoveSpec::Normal { from, to, promotion: None });
                }
            }
        }

        let pawn = Piece::from_parts(us, PieceType::Pawn);
        match self.on(to) {
            Some(_) => {
                for from in geometry::pawn_capture_sources(us, to) {
                    if self.piece_on(from) == Some(pawn) {
                        specs.push(MoveSpec::Normal { from, to, promotion: promotion_for(us, to) });
                    }
                }
            }
            None => {
                match *geometry::pawn_push_sources(us, to).as_slice() {
                    [single, ..] if self.piece_on(single) == Some(pawn) => {
                        specs.push(MoveSpec::Normal { from: single, to, promotion: promotion_for(us, to) });
                    }
                    [single, double] if self.on(single).is_none() && self.piece_on(double) == Some(pawn) => {
                        specs.push(MoveSpec::Normal { from: double, to, promotion: None });
                    }
                    _ => {}
                }
            }
        }

        specs.iter().any(|spec| !self.move_exposes_king(spec))
    }
}

/// A queen when a pawn arriving on `to` must promote
fn promotion_for(us: Colour, to: Square) -> Option<PieceType> {
    (to.rank() == us.promotion_rank()).then_some(PieceType::Queen)
}

/******************************************\
|==========================================|
|               Move Errors                |
|==========================================|
\******************************************/

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("No {piece} can move to {to}")]
    NoPiece { piece: Piece, to: Square },

    #[error("{count} men of kind {piece} can move to {to}")]
    Ambiguous { piece: Piece, to: Square, count: usize },

    #[error("Every {piece} that could reach {to} is blocked")]
    PathBlocked { piece: Piece, to: Square },

    #[error("Move leaves the mover's king in check")]
    KingLeftInCheck,

    #[error("Disambiguation of {piece} from {from} to {to} is not the minimal one")]
    SuperfluousDisambiguation { piece: Piece, from: Square, to: Square },

    #[error("Castling {0} is not allowed")]
    IllegalCastle(CastleSide),

    #[error("No en passant capture on {0}")]
    IllegalEnPassant(Square),

    #[error("Promotion not allowed on {0}")]
    BadPromotion(Square),

    #[error("Pawn reaching {0} must promote")]
    MissingPromotion(Square),

    #[error("{0} is occupied")]
    Occupied(Square),

    #[error("Capture mark disagrees with the board on {0}")]
    CaptureMismatch(Square),

    #[error("Null move while in check")]
    NullMoveInCheck,

    #[error("Bishop or pawn reading unresolved (both legal: {both_legal})")]
    BishopOrPawnUnresolved { both_legal: bool },
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
