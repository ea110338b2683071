//! # PGN Reading
//!
//! Tokens, the resumable scanner, the movetext state machine and the
//! streaming reader that splits a chunked stream into games.

pub mod game;
pub mod lexer;
pub mod policy;
pub mod reader;
pub mod token;

pub use game::{Game, GameError, GameOptions, Phase};
pub use lexer::{Dialect, Scan, Scanner};
pub use policy::{IgnoreCasePgn, MoveTextPolicy, StrictPgn, TextPgn};
pub use reader::{GameReader, ReadChunks, ReaderOptions, read_games};
pub use token::{Outcome, Token, TokenKind};
