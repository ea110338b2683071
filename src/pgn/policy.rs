//! # Movetext Policies
//!
//! The three flavours of PGN reading share one state machine. What differs
//! between them is collected in [`MoveTextPolicy`] and chosen at the type
//! level with the marker structs [`StrictPgn`], [`TextPgn`] and
//! [`IgnoreCasePgn`].

use super::lexer::Dialect;
use crate::board::{MoveError, Position, PositionDelta};
use crate::core::SanMove;

pub trait MoveTextPolicy {
    /// Grammar used to scan the movetext
    fn dialect() -> Dialect;

    /// Whether source hints must be exactly the minimal SAN disambiguation
    fn strict_disambiguation() -> bool;

    /// Checks and plays a move read from the movetext
    fn play_move(position: &mut Position, san: &SanMove) -> Result<PositionDelta, MoveError> {
        position.piece_move(san, Self::strict_disambiguation())
    }

    /// Settles a word that reads both as a bishop move and as a b-pawn move.
    ///
    /// Only the case-blind grammar produces such words; the other policies
    /// reject them.
    fn play_bishop_or_pawn(
        _position: &mut Position,
        _bishop: &SanMove,
        _pawn: &SanMove,
    ) -> Result<PositionDelta, MoveError> {
        Err(MoveError::BishopOrPawnUnresolved { both_legal: false })
    }
}

/// Import format exactly as the PGN standard writes it
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictPgn;

/// Tolerates the usual deviations found in hand-written and exported PGN
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPgn;

/// Like [`TextPgn`], reading letters regardless of case
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCasePgn;

impl MoveTextPolicy for StrictPgn {
    fn dialect() -> Dialect {
        Dialect::Strict
    }

    fn strict_disambiguation() -> bool {
        true
    }
}

impl MoveTextPolicy for TextPgn {
    fn dialect() -> Dialect {
        Dialect::Text
    }

    fn strict_disambiguation() -> bool {
        false
    }
}

impl MoveTextPolicy for IgnoreCasePgn {
    fn dialect() -> Dialect {
        Dialect::IgnoreCase
    }

    fn strict_disambiguation() -> bool {
        false
    }

    fn play_bishop_or_pawn(
        position: &mut Position,
        bishop: &SanMove,
        pawn: &SanMove,
    ) -> Result<PositionDelta, MoveError> {
        position.bishop_or_pawn(bishop, pawn, Self::strict_disambiguation())
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
