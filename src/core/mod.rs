// Core module exports

// Primitive value types
pub mod bitboard;
pub mod macros;
pub mod piece;
pub mod san;
pub mod square;
pub mod types;

// Re-export common types for easier access
pub use bitboard::Bitboard;
pub use piece::{Man, ParsePieceError, Piece, PieceType};
pub use san::SanMove;
pub use square::{File, ParseFileError, ParseRankError, ParseSquareError, Rank, Square};
pub use types::{CastleSide, Castling, Colour, Direction, SquareAddError};
