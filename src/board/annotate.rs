use super::{MoveSpec, Position};
use crate::core::*;
use crate::geometry;

/******************************************\
|==========================================|
|               Check Marks                |
|==========================================|
\******************************************/

/// # Check Mark
///
/// The suffix a move earns for the position it leaves: `+` when the side to
/// move is in check and has a reply, `#` when it has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMark {
    Check,
    Mate,
}

impl std::fmt::Display for CheckMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckMark::Check => write!(f, "+"),
            CheckMark::Mate => write!(f, "#"),
        }
    }
}

impl Position {
    /// Whether the side to move is checked or mated, `None` when not in check.
    ///
    /// Stalemate is not told apart from an ordinary position. Replies are
    /// searched in order of how cheaply they are found: king steps, then
    /// capturing a lone checker, then blocking a lone sliding checker.
    pub fn check_mark(&mut self) -> Option<CheckMark> {
        let us = self.active();
        let ksq = self.king_square(us)?;
        let checkers = self.checkers();
        let checker = checkers.lsb()?;

        let escapes = self.king_can_step(ksq)
            || (!checkers.more_than_one()
                && (self.can_capture_checker(checker) || self.can_block(checker, ksq)));

        Some(match escapes {
            true => CheckMark::Check,
            false => CheckMark::Mate,
        })
    }

    /// Whether the king on `ksq` has a safe square to step to, captures included
    fn king_can_step(&mut self, ksq: Square) -> bool {
        let own = self.occupied_bb(self.active());
        (geometry::king(ksq) & !own)
            .any(|to| !self.move_exposes_king(&MoveSpec::Normal { from: ksq, to, promotion: None }))
    }

    /// Whether a man other than the king can take the checker on `checker`
    fn can_capture_checker(&mut self, checker: Square) -> bool {
        if self.can_reach(checker, false) {
            return true;
        }

        // A pawn that just made a double step may be taken en passant
        let us = self.active();
        let Some(target) = self.en_passant() else {
            return false;
        };
        if Square::from_parts(target.file(), checker.rank()) != checker {
            return false;
        }

        let pawn = Piece::from_parts(us, PieceType::Pawn);
        geometry::pawn_capture_sources(us, target).any(|from| {
            self.piece_on(from) == Some(pawn)
                && !self.move_exposes_king(&MoveSpec::EnPassant { from, to: target })
        })
    }

    /// Whether a man other than the king can step between a sliding checker and the king
    fn can_block(&mut self, checker: Square, ksq: Square) -> bool {
        let Some(ray) = geometry::ray(checker, ksq) else {
            return false;
        };
        ray.between.iter().any(|&sq| self.can_reach(sq, false))
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

    fn mark(fen: &str) -> Option<CheckMark> {
        let mut pos = Position::from_fen(fen).unwrap();
        let before = pos.clone();
        let mark = pos.check_mark();
        assert_eq!(pos, before, "check_mark must leave the position unchanged");
        mark
    }

    #[test]
    fn test_no_check() {
        assert_eq!(mark(crate::board::START_FEN), None);
        assert_eq!(mark("4k3/8/8/8/8/8/8/qN2K3 b - - 0 1"), None);
    }

    #[test]
    fn test_fools_mate() {
        assert_eq!(
            mark("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
            Some(CheckMark::Mate)
        );
    }

    #[test]
    fn test_back_rank() {
        assert_eq!(mark("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1"), Some(CheckMark::Mate));
        // the e2 rook can block on e8
        assert_eq!(mark("3R2k1/5ppp/8/8/8/8/4r3/6K1 b - - 0 1"), Some(CheckMark::Check));
        // the a8 rook can take on d8
        assert_eq!(mark("r2R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1"), Some(CheckMark::Check));
    }

    #[test]
    fn test_double_check_ignores_captures() {
        // rook e1 and knight f6 both check; the g8 knight could take f6 but not both
        assert_eq!(mark("3qkbn1/3p1p2/5N2/8/8/8/8/4R1K1 b - - 0 1"), Some(CheckMark::Mate));
    }

    #[test]
    fn test_pinned_defender() {
        // the f6 knight could take h5 or block on h7 but is pinned by the b2 bishop
        assert_eq!(mark("7k/8/5n2/7Q/8/8/1B6/2K3R1 b - - 0 1"), Some(CheckMark::Mate));
        assert_eq!(mark("7k/8/5n2/7Q/8/8/8/2K3R1 b - - 0 1"), Some(CheckMark::Check));
    }

    #[test]
    fn test_en_passant_takes_checker() {
        let fen = "8/8/8/2Pp4/4K3/8/8/7k w - d6 0 1";
        assert_eq!(mark(fen), Some(CheckMark::Check));

        let mut pos = Position::from_fen(fen).unwrap();
        assert!(pos.can_capture_checker(Square::D5));
        assert!(!pos.can_block(Square::D5, Square::E4));

        let mut pos = Position::from_fen("8/8/8/2Pp4/4K3/8/8/7k w - - 0 1").unwrap();
        assert!(!pos.can_capture_checker(Square::D5));
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckMark::Check.to_string(), "+");
        assert_eq!(CheckMark::Mate.to_string(), "#");
    }
}
