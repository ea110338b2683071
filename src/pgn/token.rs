use crate::core::{CastleSide, Colour, SanMove};

/******************************************\
|==========================================|
|                 Outcome                  |
|==========================================|
\******************************************/

/// The result a game termination marker records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Winner(Colour),
    Draw,
    Unknown,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self {
            Outcome::Winner(Colour::White) => "1-0",
            Outcome::Winner(Colour::Black) => "0-1",
            Outcome::Draw => "1/2-1/2",
            Outcome::Unknown => "*",
        };
        write!(f, "{marker}")
    }
}

/******************************************\
|==========================================|
|                  Token                   |
|==========================================|
\******************************************/

/// What a token means to the movetext state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `[Name "Value"]` with escapes resolved in `value`
    Tag { name: String, value: String },
    Move(SanMove),
    /// A case-folded move that reads as a bishop move and as a b-file pawn move
    BishopOrPawn { bishop: SanMove, pawn: SanMove },
    Castles(CastleSide),
    NullMove,
    RavStart,
    RavEnd,
    /// `{...}`
    Comment,
    /// `;...` up to the end of the line
    CommentToEol,
    /// `%...` line
    Escape,
    /// `$n`
    Nag,
    /// `!`, `?`, `!!`, `??`, `!?`, `?!`
    Glyph,
    /// `+` or `#` after a move
    CheckIndicator,
    /// `<...>`
    Reserved,
    Termination(Outcome),
    /// Text that matches nothing in the grammar
    Other,
}

/// # Token
///
/// One unit of PGN text together with the exact source text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Whether the token changes or needs the board
    #[inline]
    pub fn needs_board(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Move(_)
                | TokenKind::BishopOrPawn { .. }
                | TokenKind::Castles(_)
                | TokenKind::NullMove
                | TokenKind::RavStart
                | TokenKind::Termination(_)
        )
    }

    /// Whether the token annotates the movetext without touching the board
    #[inline]
    pub fn is_annotation(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Comment
                | TokenKind::CommentToEol
                | TokenKind::Escape
                | TokenKind::Nag
                | TokenKind::Glyph
                | TokenKind::CheckIndicator
                | TokenKind::Reserved
        )
    }

    #[inline]
    pub fn is_tag(&self) -> bool {
        matches!(self.kind, TokenKind::Tag { .. })
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
