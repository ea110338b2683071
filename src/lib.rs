//! # PGN
//!
//! Reads chess games in Portable Game Notation and checks every move against
//! the board it is played on. Each game keeps its tags, its tokens and the
//! position after every token, and records malformed or illegal input
//! instead of giving up on it.
pub mod board;
pub mod core;
pub mod geometry;
pub mod pgn;

pub use board::{CheckMark, GameState, Position, PositionDelta};
pub use crate::core::*;
pub use pgn::{
    Dialect, Game, GameError, GameOptions, GameReader, IgnoreCasePgn, MoveTextPolicy, Outcome,
    ReaderOptions, StrictPgn, TextPgn, Token, TokenKind, read_games,
};
