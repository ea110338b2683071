//! Builders for the geometry tables. Each function runs once, from the
//! `LazyLock` initialisers in `lookup`.

use arrayvec::ArrayVec;

use super::{LineKind, Ray};
use crate::core::*;

/// Bitboard per square
pub(super) type AttackTable = [Bitboard; Square::NUM];
/// Outward squares per square and direction, nearest first
pub(super) type LineTable = [[ArrayVec<Square, 7>; Direction::NUM]; Square::NUM];
/// Ray per ordered square pair, flattened as `from * 64 + to`
pub(super) type RayTable = Vec<Option<Ray>>;
/// Castling rights retained per square
pub(super) type CastlingTable = [Castling; Square::NUM];

#[rustfmt::skip]
pub(super) const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2),
    (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

#[rustfmt::skip]
pub(super) const KING_STEPS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1),
    (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

/// Move sets for a leaper given its (file, rank) steps
pub(super) fn init_pseudo_attacks(steps: &[(i8, i8)]) -> AttackTable {
    let mut attacks = [Bitboard::EMPTY; Square::NUM];
    for sq in Square::iter() {
        for &(df, dr) in steps {
            if let Some(to) = sq.offset(df, dr) {
                attacks[sq.index()].set(to);
            }
        }
    }
    attacks
}

/// Squares a pawn of `colour` attacks from each square
pub(super) fn init_pawn_attacks(colour: Colour) -> AttackTable {
    let dr = colour.forward();
    init_pseudo_attacks(&[(-1, dr), (1, dr)])
}

/// Every square reached by walking from each square in each direction
pub(super) fn init_line_table() -> Box<LineTable> {
    Box::new(std::array::from_fn(|i| {
        let from = unsafe { Square::from_unchecked(i as u8) };
        std::array::from_fn(|d| {
            let dir = unsafe { Direction::from_unchecked(d as u8) };
            let mut line = ArrayVec::new();
            let mut cur = from;
            while let Ok(next) = cur.add(dir) {
                line.push(next);
                cur = next;
            }
            line
        })
    }))
}

/// Rays for every colinear pair, derived from the line table
pub(super) fn init_ray_table(lines: &LineTable) -> RayTable {
    let mut table = vec![None; Square::NUM * Square::NUM];

    for from in Square::iter() {
        for dir in Direction::iter() {
            let line = &lines[from.index()][dir.index()];
            for (step, &to) in line.iter().enumerate() {
                let between: ArrayVec<Square, 6> = line[..step].iter().copied().collect();
                let between_bb = between.iter().copied().collect();
                table[from.index() * Square::NUM + to.index()] = Some(Ray {
                    kind: LineKind::of(dir),
                    direction: dir,
                    from,
                    to,
                    between,
                    between_bb,
                });
            }
        }
    }

    table
}

/// Empty-board slider moves along the orthogonal or diagonal directions
pub(super) fn init_slider_table(lines: &LineTable, orthogonal: bool) -> AttackTable {
    let mut attacks = [Bitboard::EMPTY; Square::NUM];
    for sq in Square::iter() {
        for dir in Direction::iter().filter(|d| d.is_orthogonal() == orthogonal) {
            for &to in &lines[sq.index()][dir.index()] {
                attacks[sq.index()].set(to);
            }
        }
    }
    attacks
}

/// Rights kept when a piece leaves or arrives on each square
pub(super) fn init_castling_table() -> CastlingTable {
    let mut table = [Castling::ALL; Square::NUM];

    for colour in Colour::iter() {
        let king = Square::E1.relative(colour);
        let queen_rook = Square::A1.relative(colour);
        let king_rook = Square::H1.relative(colour);

        table[king.index()] = !Castling::colour(colour);
        table[queen_rook.index()] = !Castling::right(colour, CastleSide::Queen);
        table[king_rook.index()] = !Castling::right(colour, CastleSide::King);
    }

    table
}
