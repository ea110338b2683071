//! # Streaming Game Reader
//!
//! [`GameReader`] pulls text in chunks of any size, scans it with a
//! [`Scanner`] and yields each [`Game`] as soon as its termination marker has
//! been read. Text the scanner cannot decide yet stays in the buffer until
//! the next chunk arrives, so the games produced never depend on where the
//! chunk boundaries fall.

use std::io::{self, Read};

use super::game::{Game, GameOptions};
use super::lexer::{Scan, Scanner};
use super::policy::MoveTextPolicy;
use super::token::Token;

/******************************************\
|==========================================|
|                 Options                  |
|==========================================|
\******************************************/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Bytes requested per read by [`GameReader::from_read`]
    pub chunk_size: usize,
    /// Options handed to every game
    pub game: GameOptions,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            game: GameOptions::default(),
        }
    }
}

impl ReaderOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_game(mut self, game: GameOptions) -> Self {
        self.game = game;
        self
    }
}

/******************************************\
|==========================================|
|               Game Reader                |
|==========================================|
\******************************************/

/// # Game Reader
///
/// Iterator over the games found in a stream of text chunks.
///
/// - A game is yielded once its termination marker is read.
/// - Tags arriving after movetext start a new game. The unfinished game
///   before them is yielded as incomplete if it had tags, and dropped as
///   noise otherwise.
/// - At the end of the stream an unfinished game with tags or movetext is
///   yielded as incomplete. Trailing comments and escapes on their own are
///   dropped.
#[derive(Debug)]
pub struct GameReader<P: MoveTextPolicy, I> {
    chunks: I,
    buffer: String,
    offset: usize,
    at_eof: bool,
    scanner: Scanner,
    partial: Option<Game<P>>,
    options: ReaderOptions,
}

impl<P: MoveTextPolicy, I: Iterator<Item = String>> GameReader<P, I> {
    pub fn new(chunks: I, options: ReaderOptions) -> Self {
        Self {
            chunks,
            buffer: String::new(),
            offset: 0,
            at_eof: false,
            scanner: Scanner::new(P::dialect()),
            partial: None,
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Drops the scanned prefix of the buffer and appends the next chunk
    fn refill(&mut self) {
        self.buffer.drain(..self.offset);
        self.offset = 0;

        match self.chunks.next() {
            Some(chunk) => self.buffer.push_str(&chunk),
            None => self.at_eof = true,
        }
    }

    /// Feeds one token to the game being read, returning a game when one is finished
    fn accept(&mut self, token: Token) -> Option<Game<P>> {
        let mut interrupted = None;
        if token.is_tag() && self.partial.as_ref().is_some_and(Game::has_movetext) {
            interrupted = self.partial.take().filter(|game| !game.tags().is_empty());
        }

        let options = self.options.game;
        let game = self.partial.get_or_insert_with(|| Game::new(options));
        game.push(token);
        let terminated = game.is_terminated();

        match interrupted {
            Some(mut game) => {
                game.finish_incomplete();
                Some(game)
            }
            None if terminated => self.partial.take(),
            None => None,
        }
    }
}

impl<P: MoveTextPolicy, I: Iterator<Item = String>> Iterator for GameReader<P, I> {
    type Item = Game<P>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.scanner.next_token(&self.buffer[self.offset..], self.at_eof) {
                Scan::Token(token, used) => {
                    self.offset += used;
                    if let Some(game) = self.accept(token) {
                        return Some(game);
                    }
                }
                Scan::NeedMore(used) => {
                    self.offset += used;
                    self.refill();
                }
                Scan::Done => {
                    let mut game = self
                        .partial
                        .take()
                        .filter(|game| game.has_movetext() || !game.tags().is_empty())?;
                    game.finish_incomplete();
                    return Some(game);
                }
            }
        }
    }
}

impl<P: MoveTextPolicy, R: Read> GameReader<P, ReadChunks<R>> {
    /// Reads games from a byte source, `options.chunk_size` bytes at a time
    pub fn from_read(reader: R, options: ReaderOptions) -> Self {
        Self::new(ReadChunks::new(reader, options.chunk_size), options)
    }
}

/// Reads every game in `text`
pub fn read_games<P: MoveTextPolicy>(text: &str) -> Vec<Game<P>> {
    GameReader::<P, _>::new(std::iter::once(text.to_owned()), ReaderOptions::default()).collect()
}

/******************************************\
|==========================================|
|               Read Chunks                |
|==========================================|
\******************************************/

/// # Read Chunks
///
/// Turns a byte source into text chunks. A UTF-8 sequence cut by a read
/// boundary is held back and completed by the next read; invalid bytes are
/// replaced with U+FFFD. A read error ends the stream.
#[derive(Debug)]
pub struct ReadChunks<R> {
    reader: R,
    chunk_size: usize,
    pending: Vec<u8>,
    done: bool,
}

impl<R: Read> ReadChunks<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            pending: Vec::new(),
            done: false,
        }
    }

    fn read_some(&mut self, buf: &mut [u8]) -> usize {
        loop {
            match self.reader.read(buf) {
                Ok(read) => return read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => return 0,
            }
        }
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        let mut bytes = std::mem::take(&mut self.pending);
        let start = bytes.len();
        bytes.resize(start + self.chunk_size, 0);
        let read = self.read_some(&mut bytes[start..]);
        bytes.truncate(start + read);

        if read == 0 {
            self.done = true;
            return match bytes.is_empty() {
                true => None,
                false => Some(String::from_utf8_lossy(&bytes).into_owned()),
            };
        }

        self.pending = bytes.split_off(complete_prefix(&bytes));
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Length of `bytes` without a trailing UTF-8 sequence that is cut short
fn complete_prefix(bytes: &[u8]) -> usize {
    let mut at = 0;
    loop {
        match std::str::from_utf8(&bytes[at..]) {
            Ok(_) => return bytes.len(),
            Err(e) => match e.error_len() {
                Some(len) => at += e.valid_up_to() + len,
                None => return at + e.valid_up_to(),
            },
        }
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
    use crate::pgn::{GameError, StrictPgn, TextPgn};

    const TWO_GAMES: &str = "[Event \"One\"]\n[Site \"?\"]\n\n\
        1. e4 e5 2. Nf3 {a comment\nover lines} Nc6 (2... d6 3. d4) 3. Bb5 1-0\n\n\
        [Event \"Two\"]\n\n\
        1. d4 d5 2. c4 ; to the end\n% escape\n2... dxc4 1/2-1/2\n";

    type Summary = (Vec<(String, String)>, Vec<String>, Option<usize>);

    fn summary<P: MoveTextPolicy>(games: &[Game<P>]) -> Vec<Summary> {
        games
            .iter()
            .map(|game| {
                (
                    game.tags().to_vec(),
                    game.tokens().iter().map(|t| t.text.clone()).collect(),
                    game.state(),
                )
            })
            .collect()
    }

    fn chunked(text: &str, size: usize) -> Vec<Game<StrictPgn>> {
        let chars: Vec<char> = text.chars().collect();
        let chunks: Vec<String> = chars.chunks(size).map(|c| c.iter().collect()).collect();
        GameReader::<StrictPgn, _>::new(chunks.into_iter(), ReaderOptions::default()).collect()
    }

    #[test]
    fn test_whole_input() {
        let games = read_games::<StrictPgn>(TWO_GAMES);
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].tag("Event"), Some("One"));
        assert_eq!(games[1].tag("Event"), Some("Two"));
        assert!(games.iter().all(|g| g.is_fully_valid() && g.is_terminated()));
        assert_eq!(
            games[1].tokens().last().map(|t| t.text.as_str()),
            Some("1/2-1/2")
        );
    }

    #[test]
    fn test_chunk_invariance() {
        let whole = summary(&read_games::<StrictPgn>(TWO_GAMES));
        for size in [1, 2, 3, 7, 13, 64] {
            assert_eq!(summary(&chunked(TWO_GAMES, size)), whole, "chunk size {size}");
        }
    }

    #[test]
    fn test_noise_is_dropped() {
        let games = read_games::<StrictPgn>("garbage 1. e4\n[Event \"x\"]\n1. d4 *\n");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].tag("Event"), Some("x"));
        assert_eq!(games[0].state(), None);
    }

    #[test]
    fn test_interrupted_game_is_incomplete() {
        let games = read_games::<StrictPgn>("[Event \"a\"]\n1. e4 e5\n[Event \"b\"]\n1. d4 *\n");
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].state(), Some(3));
        assert_eq!(games[0].errors(), [(3, GameError::Incomplete)]);
        assert!(games[1].is_fully_valid());
    }

    #[test]
    fn test_error_context_ends_at_next_tags() {
        let games = read_games::<StrictPgn>("[Event \"a\"]\n1. e4 e4 2. Nf3\n\n[Event \"b\"]\n1. d4 *\n");
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].state(), Some(2));
        assert_eq!(games[0].tokens().len(), 4);
        assert_eq!(games[1].tag("Event"), Some("b"));
        assert!(games[1].is_fully_valid());
    }

    #[test]
    fn test_end_of_stream() {
        let games = read_games::<TextPgn>("[Event \"a\"]\n1. e4");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].state(), Some(2));

        assert!(read_games::<TextPgn>("1. e4 e5 *\n\n  \n").len() == 1);
        assert!(read_games::<TextPgn>("").is_empty());
    }

    #[test]
    fn test_trailing_comment_is_not_a_game() {
        let games = read_games::<StrictPgn>("[Event \"a\"]\n1. e4 *\n{trailing note}\n% escape\n");
        assert_eq!(games.len(), 1);
        assert!(games[0].is_fully_valid());
    }

    #[test]
    fn test_stray_angle_bracket_keeps_next_game() {
        let text = "[Event \"a\"]\n1. e4 < e5 *\n\n[Event \"b\"]\n1. d4 *\n";

        let strict = read_games::<StrictPgn>(text);
        assert_eq!(strict.len(), 2);
        assert_eq!(strict[0].state(), Some(2));
        assert_eq!(strict[0].tokens()[2].text, "<");
        assert_eq!(strict[1].tag("Event"), Some("b"));
        assert!(strict[1].is_fully_valid());

        // unclosed on its line, so not a reserved sequence either
        let text_games = read_games::<TextPgn>(text);
        assert_eq!(text_games.len(), 2);
        assert_eq!(text_games[0].state(), Some(2));
        assert!(text_games[1].is_fully_valid());

        assert_eq!(summary(&chunked(text, 1)), summary(&strict));
    }

    #[test]
    fn test_from_read_splits_utf8() {
        let text = "[Event \"Caf\u{e9}\"]\n1. e4 {\u{2654} \u{e9}} *\n";
        let options = ReaderOptions::default().with_chunk_size(1);
        let games: Vec<Game<StrictPgn>> = GameReader::from_read(text.as_bytes(), options).collect();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].tag("Event"), Some("Caf\u{e9}"));
        assert_eq!(games[0].tokens()[2].text, "{\u{2654} \u{e9}}");
        assert!(games[0].is_fully_valid());
    }

    #[test]
    fn test_read_error_ends_stream() {
        struct Failing<'a>(&'a [u8]);

        impl Read for Failing<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() {
                    return Err(io::Error::other("gone"));
                }
                let n = buf.len().min(self.0.len());
                buf[..n].copy_from_slice(&self.0[..n]);
                self.0 = &self.0[n..];
                Ok(n)
            }
        }

        let reader = Failing(b"[Event \"a\"]\n1. e4 *\n[Event \"b\"]\n1. d4");
        let games: Vec<Game<StrictPgn>> =
            GameReader::from_read(reader, ReaderOptions::default().with_chunk_size(5)).collect();
        assert_eq!(games.len(), 2);
        assert!(games[0].is_fully_valid());
        assert_eq!(games[1].errors(), [(2, GameError::Incomplete)]);
    }

    #[test]
    fn test_complete_prefix() {
        assert_eq!(complete_prefix(b"abc"), 3);
        assert_eq!(complete_prefix(&[b'a', 0xc3]), 1);
        assert_eq!(complete_prefix(&[0xff, b'a']), 2);
        assert_eq!(complete_prefix(&[b'a', 0xe2, 0x99]), 1);
    }
}
