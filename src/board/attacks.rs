use super::Position;
use crate::core::*;
use crate::geometry::{self, LineKind};

/******************************************\
|==========================================|
|              Attack Queries              |
|==========================================|
\******************************************/

impl Position {
    /// The first man met walking outward from `sq` in `dir`
    #[inline]
    pub fn first_on_line(&self, sq: Square, dir: Direction) -> Option<(Square, Man)> {
        geometry::line(sq, dir)
            .iter()
            .find_map(|&s| self.on(s).map(|man| (s, man)))
    }

    /// Squares holding a man of colour `by` that attacks `sq`.
    ///
    /// Walks the eight lines out of `sq` and probes the knight, king and pawn
    /// source squares, so the cost does not depend on how full the board is.
    pub fn attackers(&self, sq: Square, by: Colour) -> Bitboard {
        let mut attackers = Bitboard::EMPTY;

        for dir in Direction::iter() {
            if let Some((from, man)) = self.first_on_line(sq, dir) {
                if man.colour() == by && slides_along(man.pt(), LineKind::of(dir)) {
                    attackers.set(from);
                }
            }
        }

        let leapers = [
            (geometry::knight(sq), PieceType::Knight),
            (geometry::king(sq), PieceType::King),
            (geometry::pawn_capture_sources(by, sq), PieceType::Pawn),
        ];
        for (squares, pt) in leapers {
            let piece = Piece::from_parts(by, pt);
            for from in squares {
                if self.piece_on(from) == Some(piece) {
                    attackers.set(from);
                }
            }
        }

        attackers
    }

    /// Whether any man of colour `by` attacks `sq`
    #[inline]
    pub fn is_attacked(&self, sq: Square, by: Colour) -> bool {
        !self.attackers(sq, by).is_empty()
    }

    /// Whether the king of `colour` stands attacked. A side without a king is never in check.
    #[inline]
    pub fn is_king_in_check(&self, colour: Colour) -> bool {
        self.king_square(colour)
            .is_some_and(|ksq| self.is_attacked(ksq, !colour))
    }

    /// Men giving check to the side to move
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        let us = self.active();
        self.king_square(us)
            .map_or(Bitboard::EMPTY, |ksq| self.attackers(ksq, !us))
    }
}

/// Whether a piece of type `pt` moves along `kind` lines
#[inline]
pub(crate) const fn slides_along(pt: PieceType, kind: LineKind) -> bool {
    match pt {
        PieceType::Queen => true,
        PieceType::Rook => kind.is_orthogonal(),
        PieceType::Bishop => !kind.is_orthogonal(),
        _ => false,
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::parse_fen(fen).unwrap()
    }

    #[test]
    fn test_slider_attacks_stop_at_first_man() {
        let p = pos("4k3/8/8/8/r2N3K/8/8/8 w - - 0 1");
        assert!(p.is_attacked(Square::C4, Colour::Black));
        assert!(p.is_attacked(Square::D4, Colour::Black));
        assert!(!p.is_attacked(Square::E4, Colour::Black));
        assert!(!p.is_king_in_check(Colour::White));
    }

    #[test]
    fn test_queen_and_bishop_lines() {
        let p = pos("4k3/8/8/8/8/2b5/8/4K2q w - - 0 1");
        assert!(p.is_king_in_check(Colour::White));
        assert_eq!(p.checkers(), Bitboard::from([Square::C3, Square::H1]));
        assert!(p.is_attacked(Square::A1, Colour::Black));
        assert!(p.is_attacked(Square::A5, Colour::Black));
        assert_eq!(p.first_on_line(Square::D1, Direction::E).map(|(sq, _)| sq), Some(Square::E1));
    }

    #[test]
    fn test_knight_king_pawn_attacks() {
        let p = pos("4k3/8/8/3p4/8/5n2/8/4K3 w - - 0 1");
        assert!(p.is_king_in_check(Colour::White));
        assert_eq!(p.attackers(Square::E1, Colour::Black), Square::F3.bb());
        assert_eq!(p.attackers(Square::E4, Colour::Black), Square::D5.bb());
        assert_eq!(p.attackers(Square::D4, Colour::Black), Square::F3.bb());
        assert!(p.is_attacked(Square::C4, Colour::Black));
        assert!(p.is_attacked(Square::D7, Colour::Black));
        assert!(p.is_attacked(Square::D2, Colour::White));
        assert!(!p.is_attacked(Square::E3, Colour::White));
    }

    #[test]
    fn test_white_pawn_attacks_forward() {
        let p = pos("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1");
        assert!(p.is_attacked(Square::D5, Colour::White));
        assert!(p.is_attacked(Square::F5, Colour::White));
        assert!(!p.is_attacked(Square::D3, Colour::White));
    }

    #[test]
    fn test_no_king_is_never_in_check() {
        let p = pos("8/8/8/8/8/8/8/q7 w - - 0 1");
        assert!(!p.is_king_in_check(Colour::White));
        assert!(p.checkers().is_empty());
    }
}
