//! # PGN Scanner
//!
//! Splits PGN text into [`Token`]s. The scanner works on whatever part of the
//! input has arrived so far: a token is only produced once every byte that
//! could change it is in the buffer, otherwise the caller is asked for more.
//! This keeps the token stream identical however the input is chunked.
//!
//! Move numbers (`12.`, `12...`) are consumed without producing a token.

use super::token::{Outcome, Token, TokenKind};
use crate::core::*;

/******************************************\
|==========================================|
|                 Dialect                  |
|==========================================|
\******************************************/

/// The grammar the scanner accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Standard algebraic notation as the PGN standard writes it
    #[default]
    Strict,
    /// Strict plus common non-conformances: `0-0`, long algebraic moves,
    /// promotion without `=`, `<...>` reserved sequences and `--`/`Z0` null moves
    Text,
    /// Text with letters read regardless of case
    IgnoreCase,
}

impl Dialect {
    #[inline]
    const fn tolerant(self) -> bool {
        !matches!(self, Dialect::Strict)
    }

    #[inline]
    const fn folded(self) -> bool {
        matches!(self, Dialect::IgnoreCase)
    }

    fn castles(self) -> &'static [(&'static [u8], CastleSide)] {
        const STRICT: &[(&[u8], CastleSide)] = &[(b"O-O-O", CastleSide::Queen), (b"O-O", CastleSide::King)];
        const TEXT: &[(&[u8], CastleSide)] = &[
            (b"O-O-O", CastleSide::Queen),
            (b"O-O", CastleSide::King),
            (b"0-0-0", CastleSide::Queen),
            (b"0-0", CastleSide::King),
        ];
        const FOLDED: &[(&[u8], CastleSide)] = &[
            (b"o-o-o", CastleSide::Queen),
            (b"o-o", CastleSide::King),
            (b"0-0-0", CastleSide::Queen),
            (b"0-0", CastleSide::King),
        ];

        match self {
            Dialect::Strict => STRICT,
            Dialect::Text => TEXT,
            Dialect::IgnoreCase => FOLDED,
        }
    }

    fn null_moves(self) -> &'static [&'static [u8]] {
        match self {
            Dialect::Strict => &[],
            Dialect::Text => &[b"--", b"Z0"],
            Dialect::IgnoreCase => &[b"--", b"z0"],
        }
    }
}

/******************************************\
|==========================================|
|                 Scanner                  |
|==========================================|
\******************************************/

/// Result of one scanning step.
///
/// Byte counts are measured from the start of the buffer handed in; the
/// caller drops that many bytes before the next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// A complete token, and the bytes used up to its end
    Token(Token, usize),
    /// The buffer ends before the next token is decided; the given number of
    /// leading bytes (whitespace, move numbers) may be dropped
    NeedMore(usize),
    /// End of input with nothing left to scan
    Done,
}

/// What one position in the buffer turned out to hold
enum Step {
    Token(TokenKind, usize),
    Skip(usize),
    NeedMore,
}

/// # Scanner
///
/// Resumable PGN tokenizer for one [`Dialect`]. The only state carried
/// between calls is whether the next byte starts a line, which decides if
/// `%` opens an escape line.
#[derive(Debug, Clone)]
pub struct Scanner {
    dialect: Dialect,
    line_start: bool,
}

impl Scanner {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            line_start: true,
        }
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Scans the next token from `buf`.
    ///
    /// `at_eof` tells the scanner no input follows `buf`, so a token running
    /// to the end of the buffer is complete.
    pub fn next_token(&mut self, buf: &str, at_eof: bool) -> Scan {
        let bytes = buf.as_bytes();
        let mut at = 0;

        loop {
            while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                at += 1;
            }

            if at == bytes.len() {
                self.consume(bytes, at);
                return match at_eof {
                    true => Scan::Done,
                    false => Scan::NeedMore(at),
                };
            }

            let line_start = match at {
                0 => self.line_start,
                _ => bytes[at - 1] == b'\n',
            };

            match self.step(buf, at, line_start, at_eof) {
                Step::Token(kind, end) => {
                    self.consume(bytes, end);
                    return Scan::Token(Token::new(kind, &buf[at..end]), end);
                }
                Step::Skip(end) => at = end,
                Step::NeedMore => {
                    self.consume(bytes, at);
                    return Scan::NeedMore(at);
                }
            }
        }
    }

    /// Scans every token of a complete text
    pub fn tokenize(dialect: Dialect, text: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(dialect);
        let mut tokens = Vec::new();
        let mut rest = text;

        while let Scan::Token(token, used) = scanner.next_token(rest, true) {
            tokens.push(token);
            rest = &rest[used..];
        }
        tokens
    }

    #[inline]
    fn consume(&mut self, bytes: &[u8], used: usize) {
        if used > 0 {
            self.line_start = bytes[used - 1] == b'\n';
        }
    }

    fn step(&self, buf: &str, at: usize, line_start: bool, at_eof: bool) -> Step {
        let bytes = buf.as_bytes();

        match bytes[at] {
            b'%' if line_start => match find(bytes, at, b'\n') {
                Some(end) => Step::Token(TokenKind::Escape, end),
                None if at_eof => Step::Token(TokenKind::Escape, bytes.len()),
                None => Step::NeedMore,
            },
            b';' => match find(bytes, at, b'\n') {
                Some(end) => Step::Token(TokenKind::CommentToEol, end),
                None if at_eof => Step::Token(TokenKind::CommentToEol, bytes.len()),
                None => Step::NeedMore,
            },
            b'{' => match find(bytes, at, b'}') {
                Some(end) => Step::Token(TokenKind::Comment, end + 1),
                None if at_eof => Step::Token(TokenKind::Other, bytes.len()),
                None => Step::NeedMore,
            },
            b'<' if !self.dialect.tolerant() => Step::Token(TokenKind::Other, at + 1),
            // reserved sequences end on their line; an unclosed `<` is a lone stray byte
            b'<' => match bytes[at..].iter().position(|&b| b == b'>' || b == b'\n') {
                Some(i) if bytes[at + i] == b'>' => Step::Token(TokenKind::Reserved, at + i + 1),
                Some(_) => Step::Token(TokenKind::Other, at + 1),
                None if at_eof => Step::Token(TokenKind::Other, at + 1),
                None => Step::NeedMore,
            },
            b'[' => tag(buf, at, at_eof),
            b'(' => Step::Token(TokenKind::RavStart, at + 1),
            b')' => Step::Token(TokenKind::RavEnd, at + 1),
            b'*' => Step::Token(TokenKind::Termination(Outcome::Unknown), at + 1),
            b'$' => {
                let end = at + 1 + bytes[at + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
                match end {
                    _ if end == bytes.len() && !at_eof => Step::NeedMore,
                    _ if end == at + 1 => Step::Token(TokenKind::Other, end),
                    _ => Step::Token(TokenKind::Nag, end),
                }
            }
            b']' | b'}' | b'>' => Step::Token(TokenKind::Other, at + 1),
            _ => {
                let end = at + bytes[at..].iter().take_while(|&&b| !is_delimiter(b)).count();
                if end == bytes.len() && !at_eof {
                    return Step::NeedMore;
                }
                match self.word(&bytes[at..end]) {
                    (Some(kind), len) => Step::Token(kind, at + len),
                    (None, len) => Step::Skip(at + len),
                }
            }
        }
    }

    /// The first token of a complete word. `None` marks a move number.
    fn word(&self, w: &[u8]) -> (Option<TokenKind>, usize) {
        if let Some(outcome) = termination(w) {
            return (Some(TokenKind::Termination(outcome)), w.len());
        }

        let digits = w.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 {
            let dots = w[digits..].iter().take_while(|&&b| b == b'.').count();
            if dots > 0 || digits == w.len() {
                return (None, digits + dots);
            }
        }

        if let Some(len) = suffix(w, b"+#") {
            return (Some(TokenKind::CheckIndicator), len);
        }
        if let Some(len) = glyph(w) {
            return (Some(TokenKind::Glyph), len);
        }

        let folded;
        let w = match self.dialect.folded() {
            true => {
                folded = w.to_ascii_lowercase();
                folded.as_slice()
            }
            false => w,
        };

        for &(spelling, side) in self.dialect.castles() {
            if w.starts_with(spelling) && ends_move(w, spelling.len()) {
                return (Some(TokenKind::Castles(side)), spelling.len());
            }
        }
        for spelling in self.dialect.null_moves() {
            if w.starts_with(spelling) && ends_move(w, spelling.len()) {
                return (Some(TokenKind::NullMove), spelling.len());
            }
        }

        match self.san(w) {
            Some((kind, len)) => (Some(kind), len),
            None => (Some(TokenKind::Other), w.len()),
        }
    }

    /// Reads a move in standard or long algebraic notation
    fn san(&self, w: &[u8]) -> Option<(TokenKind, usize)> {
        let dialect = self.dialect;

        if dialect.folded() && w.first() == Some(&b'b') {
            let pawn = san_body(w, 0, PieceType::Pawn, dialect);
            let bishop = san_body(w, 1, PieceType::Bishop, dialect);

            return match (bishop, pawn) {
                (Some((bishop, b)), Some((pawn, p))) if b == p => {
                    Some((TokenKind::BishopOrPawn { bishop, pawn }, b))
                }
                (Some((bishop, b)), Some((_, p))) if b > p => Some((TokenKind::Move(bishop), b)),
                (_, Some((pawn, p))) => Some((TokenKind::Move(pawn), p)),
                (Some((bishop, b)), None) => Some((TokenKind::Move(bishop), b)),
                (None, None) => None,
            };
        }

        let (piece, start) = match piece_letter(w.first().copied(), dialect) {
            Some(pt) => (pt, 1),
            None => (PieceType::Pawn, 0),
        };
        san_body(w, start, piece, dialect).map(|(san, len)| (TokenKind::Move(san), len))
    }
}

/// Byte cursor over one word of movetext
struct Cursor<'a> {
    w: &'a [u8],
    at: usize,
}

impl Cursor<'_> {
    fn file(&mut self) -> Option<File> {
        let file = File::from_byte(*self.w.get(self.at)?)?;
        self.at += 1;
        Some(file)
    }

    fn rank(&mut self) -> Option<Rank> {
        let rank = Rank::from_byte(*self.w.get(self.at)?)?;
        self.at += 1;
        Some(rank)
    }

    fn eat(&mut self, b: u8) -> bool {
        let found = self.w.get(self.at) == Some(&b);
        if found {
            self.at += 1;
        }
        found
    }
}

/// Reads the source hint, destination and promotion of a move whose piece
/// letter, if any, ends before `start`
fn san_body(w: &[u8], start: usize, piece: PieceType, dialect: Dialect) -> Option<(SanMove, usize)> {
    let mut c = Cursor { w, at: start };

    let file1 = c.file();
    let rank1 = c.rank();
    let capture = c.eat(b'x');
    let dash = !capture && dialect.tolerant() && c.eat(b'-');

    let (file, rank, to) = match c.file() {
        Some(file2) => (file1, rank1, Square::from_parts(file2, c.rank()?)),
        None => match (file1, rank1) {
            (Some(f), Some(r)) if !capture && !dash => (None, None, Square::from_parts(f, r)),
            _ => return None,
        },
    };

    // long algebraic names the full source square
    let long = file.is_some() && rank.is_some();
    if dash && !long {
        return None;
    }
    if piece == PieceType::Pawn {
        let allowed = match long {
            true => dialect.tolerant(),
            false => rank.is_none() && file.is_some() == capture,
        };
        if !allowed {
            return None;
        }
    }

    let promotion = if c.eat(b'=') {
        Some(piece_letter(w.get(c.at).copied(), dialect)?)
    } else if dialect.tolerant() {
        piece_letter(w.get(c.at).copied(), dialect)
    } else {
        None
    };
    let end = c.at + promotion.is_some() as usize;

    ends_move(w, end).then_some((
        SanMove {
            piece,
            file,
            rank,
            capture,
            to,
            promotion,
        },
        end,
    ))
}

/******************************************\
|==========================================|
|                 Tag Pairs                |
|==========================================|
\******************************************/

enum TagScan {
    Complete { name: String, value: String, end: usize },
    Incomplete,
    Malformed,
}

/// Scans `[Name "Value"]` starting at the `[` on `at`
fn tag(buf: &str, at: usize, at_eof: bool) -> Step {
    match tag_pair(buf, at) {
        TagScan::Complete { name, value, end } => Step::Token(TokenKind::Tag { name, value }, end),
        TagScan::Incomplete if !at_eof => Step::NeedMore,
        TagScan::Incomplete | TagScan::Malformed => {
            let bytes = buf.as_bytes();
            let close = find(bytes, at, b']').map(|i| i + 1);
            let eol = find(bytes, at, b'\n');
            match (close, eol) {
                (Some(c), Some(e)) => Step::Token(TokenKind::Other, c.min(e)),
                (Some(end), None) | (None, Some(end)) => Step::Token(TokenKind::Other, end),
                (None, None) if at_eof => Step::Token(TokenKind::Other, bytes.len()),
                (None, None) => Step::NeedMore,
            }
        }
    }
}

fn tag_pair(buf: &str, at: usize) -> TagScan {
    let bytes = buf.as_bytes();
    let skip_space = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    let name_start = skip_space(at + 1);
    let mut i = name_start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    let name_end = i;
    i = skip_space(i);

    match bytes.get(i) {
        None => return TagScan::Incomplete,
        Some(b'"') if name_end > name_start => i += 1,
        Some(_) => return TagScan::Malformed,
    }

    let mut value = String::new();
    let mut segment = i;
    loop {
        match bytes.get(i) {
            None => return TagScan::Incomplete,
            Some(b'"') => break,
            Some(b'\\') => match bytes.get(i + 1) {
                None => return TagScan::Incomplete,
                Some(b'"' | b'\\') => {
                    value.push_str(&buf[segment..i]);
                    segment = i + 1;
                    i += 2;
                }
                Some(_) => return TagScan::Malformed,
            },
            Some(b'\n') => return TagScan::Malformed,
            Some(_) => i += 1,
        }
    }
    value.push_str(&buf[segment..i]);

    i = skip_space(i + 1);
    match bytes.get(i) {
        None => TagScan::Incomplete,
        Some(b']') => TagScan::Complete {
            name: buf[name_start..name_end].to_string(),
            value,
            end: i + 1,
        },
        Some(_) => TagScan::Malformed,
    }
}

/******************************************\
|==========================================|
|                 Helpers                  |
|==========================================|
\******************************************/

/// Index of the first `target` at or after `from`
#[inline]
fn find(bytes: &[u8], from: usize, target: u8) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == target).map(|i| from + i)
}

/// Bytes that end a word of movetext
#[inline]
const fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'[' | b']' | b'{' | b'}' | b'(' | b')' | b';' | b'$' | b'<' | b'>' | b'*')
}

/// Whether a move spelled in `w[..len]` may end there
#[inline]
fn ends_move(w: &[u8], len: usize) -> bool {
    len == w.len() || matches!(w[len], b'+' | b'#' | b'!' | b'?')
}

fn piece_letter(b: Option<u8>, dialect: Dialect) -> Option<PieceType> {
    let b = b?;
    match dialect.folded() {
        true => PieceType::from_san_byte(b.to_ascii_uppercase()),
        false => PieceType::from_san_byte(b),
    }
}

fn termination(w: &[u8]) -> Option<Outcome> {
    match w {
        b"1-0" => Some(Outcome::Winner(Colour::White)),
        b"0-1" => Some(Outcome::Winner(Colour::Black)),
        b"1/2-1/2" => Some(Outcome::Draw),
        _ => None,
    }
}

/// A single leading byte out of `set`
#[inline]
fn suffix(w: &[u8], set: &[u8]) -> Option<usize> {
    w.first().filter(|b| set.contains(b)).map(|_| 1)
}

fn glyph(w: &[u8]) -> Option<usize> {
    match w {
        [b'!' | b'?', b'!' | b'?', ..] => Some(2),
        [b'!' | b'?', ..] => Some(1),
        _ => None,
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
