//! # Module: `lookup`
//!
//! Process-wide geometry tables and the accessors the position engine uses.
//!
//! - **Lines**: `line` gives the squares outward from a square in one direction.
//! - **Rays**: `ray` and `between` answer "are these squares colinear, and what
//!   lies between them".
//! - **Leapers**: `knight` and `king` move sets.
//! - **Pawns**: `pawn_attacks`, `pawn_capture_sources`, `pawn_push_sources`.
//! - **Candidates**: `sources` gives every square a piece kind could reach a
//!   destination from on an empty board.
//! - **Castling**: `castling_kept` gives the rights that survive a piece
//!   leaving or arriving on a square.

use std::sync::LazyLock;

use arrayvec::ArrayVec;

use super::Ray;
use super::init::*;
use crate::core::{Bitboard, Castling, Colour, Direction, PieceType, Rank, Square};

/******************************************\
|==========================================|
|                  Tables                  |
|==========================================|
\******************************************/

/// Outward lines, indexed by `[Square][Direction]`.
static LINES: LazyLock<Box<LineTable>> = LazyLock::new(init_line_table);

/// Rays between colinear squares, indexed by `from * 64 + to`.
static RAYS: LazyLock<RayTable> = LazyLock::new(|| init_ray_table(&LINES));

/// Knight move sets, indexed by `[Square]`.
static KNIGHT_ATTACKS: LazyLock<AttackTable> =
    LazyLock::new(|| init_pseudo_attacks(&KNIGHT_JUMPS));

/// King move sets, indexed by `[Square]`.
static KING_ATTACKS: LazyLock<AttackTable> = LazyLock::new(|| init_pseudo_attacks(&KING_STEPS));

/// Pawn capture targets, indexed by `[Colour][Square]`.
static PAWN_ATTACKS: LazyLock<[AttackTable; Colour::NUM]> = LazyLock::new(|| {
    [
        init_pawn_attacks(Colour::White),
        init_pawn_attacks(Colour::Black),
    ]
});

/// Empty-board rook moves, indexed by `[Square]`.
static ROOK_RAYS: LazyLock<AttackTable> = LazyLock::new(|| init_slider_table(&LINES, true));

/// Empty-board bishop moves, indexed by `[Square]`.
static BISHOP_RAYS: LazyLock<AttackTable> = LazyLock::new(|| init_slider_table(&LINES, false));

/// Castling rights kept per square, indexed by `[Square]`.
static CASTLING_KEPT: LazyLock<CastlingTable> = LazyLock::new(init_castling_table);

/// Forces every table to be built.
///
/// Optional: the accessors build tables on first use. Calling this up front
/// keeps the one-off cost out of the first game parsed.
pub fn init_all_tables() {
    LazyLock::force(&LINES);
    LazyLock::force(&RAYS);
    LazyLock::force(&KNIGHT_ATTACKS);
    LazyLock::force(&KING_ATTACKS);
    LazyLock::force(&PAWN_ATTACKS);
    LazyLock::force(&ROOK_RAYS);
    LazyLock::force(&BISHOP_RAYS);
    LazyLock::force(&CASTLING_KEPT);
}

/******************************************\
|==========================================|
|                Accessors                 |
|==========================================|
\******************************************/

/// Squares outward from `sq` in `dir`, nearest first
#[inline]
pub fn line(sq: Square, dir: Direction) -> &'static [Square] {
    &LINES[sq.index()][dir.index()]
}

/// The ray joining two squares, or `None` when they share no line (or are equal)
///
/// ## Examples
///
/// ```
/// use pgn::core::Square;
/// use pgn::geometry::{ray, LineKind};
///
/// let r = ray(Square::A1, Square::D4).unwrap();
/// assert_eq!(r.kind, LineKind::Diagonal);
/// assert_eq!(r.between.as_slice(), &[Square::B2, Square::C3]);
/// assert!(ray(Square::A1, Square::B3).is_none());
/// ```
#[inline]
pub fn ray(from: Square, to: Square) -> Option<&'static Ray> {
    RAYS[from.index() * Square::NUM + to.index()].as_ref()
}

/// Squares strictly between two colinear squares, empty otherwise
#[inline]
pub fn between(from: Square, to: Square) -> Bitboard {
    ray(from, to).map_or(Bitboard::EMPTY, |r| r.between_bb)
}

#[inline]
pub fn knight(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index()]
}

#[inline]
pub fn king(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index()]
}

/// Empty-board moves of a rook on `sq`
#[inline]
pub fn rook_rays(sq: Square) -> Bitboard {
    ROOK_RAYS[sq.index()]
}

/// Empty-board moves of a bishop on `sq`
#[inline]
pub fn bishop_rays(sq: Square) -> Bitboard {
    BISHOP_RAYS[sq.index()]
}

/// Squares a pawn of `colour` on `from` captures on
#[inline]
pub fn pawn_attacks(colour: Colour, from: Square) -> Bitboard {
    PAWN_ATTACKS[colour.index()][from.index()]
}

/// Squares a pawn of `colour` could capture onto `to` from
///
/// En passant uses the same sources: the capturing pawn moves onto the target
/// square exactly like a normal capture.
#[inline]
pub fn pawn_capture_sources(colour: Colour, to: Square) -> Bitboard {
    PAWN_ATTACKS[(!colour).index()][to.index()]
}

/// Squares a pawn of `colour` could push onto `to` from, single step first
///
/// The double step is only offered from the pawn's home rank.
pub fn pawn_push_sources(colour: Colour, to: Square) -> ArrayVec<Square, 2> {
    let mut sources = ArrayVec::new();
    let back = -colour.forward();

    if let Some(single) = to.offset(0, back) {
        sources.push(single);
        if to.rank() == Rank::Rank4.relative(colour) {
            if let Some(double) = single.offset(0, back) {
                sources.push(double);
            }
        }
    }

    sources
}

/// Every square a `pt` of `colour` could reach `to` from on an empty board
///
/// ## Examples
///
/// ```
/// use pgn::core::{Colour, PieceType, Square};
/// use pgn::geometry::sources;
///
/// let knights = sources(PieceType::Knight, Colour::White, Square::F3);
/// assert!(knights.contains(Square::G1));
/// ```
pub fn sources(pt: PieceType, colour: Colour, to: Square) -> Bitboard {
    match pt {
        PieceType::Pawn => {
            pawn_push_sources(colour, to).into_iter().collect::<Bitboard>()
                | pawn_capture_sources(colour, to)
        }
        PieceType::Knight => knight(to),
        PieceType::Bishop => bishop_rays(to),
        PieceType::Rook => rook_rays(to),
        PieceType::Queen => bishop_rays(to) | rook_rays(to),
        PieceType::King => king(to),
    }
}

/// Castling rights that survive a piece leaving or arriving on `sq`
///
/// e1 keeps no white right, a1 drops white's queen side, h1 drops white's
/// king side, and likewise for e8, a8 and h8.
#[inline]
pub fn castling_kept(sq: Square) -> Castling {
    CASTLING_KEPT[sq.index()]
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
