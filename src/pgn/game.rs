//! # Movetext State Machine
//!
//! A [`Game`] takes tokens one at a time and keeps, for every token, the
//! position it leaves behind. Illegal moves and structural mistakes are
//! recorded against the token that caused them; processing always carries on.
//!
//! - Before the first board token the game collects tags. The start position
//!   is set up lazily, from the `FEN` tag if there is one.
//! - `(` backs up over the last move so the variation can replace it, and
//!   `)` restores the line the variation branched from.
//! - After an error in the main line every later token up to the
//!   termination marker is kept as raw context. After an error inside a
//!   variation only the rest of that variation is skipped.

use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use super::lexer::Scanner;
use super::policy::MoveTextPolicy;
use super::token::{Outcome, Token, TokenKind};
use crate::board::{CheckMark, MoveError, Position, PositionDelta, SetupError};

/******************************************\
|==========================================|
|                 Options                  |
|==========================================|
\******************************************/

/// Per-game switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameOptions {
    /// Work out `+`/`#` for every accepted move
    pub annotate_checks: bool,
}

impl GameOptions {
    pub fn with_annotate_checks(mut self, annotate_checks: bool) -> Self {
        self.annotate_checks = annotate_checks;
        self
    }
}

/******************************************\
|==========================================|
|                  Phase                   |
|==========================================|
\******************************************/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BeforeMovetext,
    InMovetext,
    /// Skipping tokens after an error at variation `depth`; `open` counts
    /// the nested variations opened while skipping
    Error { depth: usize, open: usize },
    Terminated,
}

/// One open variation
#[derive(Debug, Clone)]
struct RavFrame {
    /// Position after the move the variation replaces
    after: Position,
    /// The replaced move
    parent: Arc<PositionDelta>,
    /// Length of the line before the replaced move
    base: usize,
}

/******************************************\
|==========================================|
|                   Game                   |
|==========================================|
\******************************************/

/// # Game
///
/// One PGN game read under the policy `P`. The token, delta and check lists
/// always have the same length: entry `i` of each belongs to token `i`.
#[derive(Debug, Clone)]
pub struct Game<P: MoveTextPolicy> {
    tags: Vec<(String, String)>,
    tokens: Vec<Token>,
    deltas: Vec<Option<Arc<PositionDelta>>>,
    checks: Vec<Option<CheckMark>>,

    state: Option<usize>,
    errors: Vec<(usize, GameError)>,
    rav_errors: Vec<usize>,

    initial: Option<Position>,
    position: Option<Position>,
    line: Vec<Arc<PositionDelta>>,
    ravs: Vec<RavFrame>,

    phase: Phase,
    movetext: bool,
    result: Option<Outcome>,
    options: GameOptions,
    _policy: PhantomData<P>,
}

impl<P: MoveTextPolicy> Default for Game<P> {
    fn default() -> Self {
        Self::new(GameOptions::default())
    }
}

impl<P: MoveTextPolicy> Game<P> {
    pub fn new(options: GameOptions) -> Self {
        Self {
            tags: Vec::new(),
            tokens: Vec::new(),
            deltas: Vec::new(),
            checks: Vec::new(),
            state: None,
            errors: Vec::new(),
            rav_errors: Vec::new(),
            initial: None,
            position: None,
            line: Vec::new(),
            ravs: Vec::new(),
            phase: Phase::BeforeMovetext,
            movetext: false,
            result: None,
            options,
            _policy: PhantomData,
        }
    }

    /// Reads one complete game from `text`. A missing termination marker is
    /// recorded as [`GameError::Incomplete`].
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, GameOptions::default())
    }

    pub fn parse_with(text: &str, options: GameOptions) -> Self {
        let mut game = Self::new(options);
        for token in Scanner::tokenize(P::dialect(), text) {
            game.push(token);
        }
        if !game.is_terminated() {
            game.finish_incomplete();
        }
        game
    }

    /// Drives the state machine with the next token
    pub fn push(&mut self, token: Token) {
        if !token.is_tag() && !matches!(token.kind, TokenKind::Comment | TokenKind::CommentToEol | TokenKind::Escape) {
            self.movetext = true;
        }

        match self.phase {
            Phase::Terminated => self.fail(token, GameError::Token),
            Phase::Error { depth, open } => self.skip(token, depth, open),
            Phase::BeforeMovetext | Phase::InMovetext => self.process(token),
        }
    }

    /// Records that the input ended before the termination marker
    pub fn finish_incomplete(&mut self) {
        let index = self.tokens.len();
        if !self.is_terminated() && self.errors.last() != Some(&(index, GameError::Incomplete)) {
            self.record(index, 0, GameError::Incomplete);
        }
    }
}

/******************************************\
|==========================================|
|              Token Handlers              |
|==========================================|
\******************************************/

impl<P: MoveTextPolicy> Game<P> {
    fn process(&mut self, token: Token) {
        match token.kind {
            TokenKind::Tag { ref name, ref value } => {
                if self.phase == Phase::InMovetext {
                    return self.fail(token, GameError::Token);
                }
                if self.tag(name).is_some() {
                    let name = name.clone();
                    return self.fail(token, GameError::DuplicateTag(name));
                }
                self.tags.push((name.clone(), value.clone()));
                self.append(token, None, None);
            }

            TokenKind::Other => self.fail(token, GameError::Token),

            TokenKind::RavEnd => match self.ravs.pop() {
                Some(frame) => self.close_rav(token, frame),
                None => self.fail(token, GameError::RavEnd),
            },

            _ if token.is_annotation() => {
                let delta = self.line.last().cloned();
                self.append(token, delta, None);
            }

            _ => {
                if let Err(error) = self.setup_position().map(|_| ()) {
                    return match token.kind {
                        TokenKind::Termination(outcome) => {
                            self.record(self.tokens.len(), 0, error);
                            self.terminate(token, outcome)
                        }
                        _ => self.fail(token, error),
                    };
                }
                if !matches!(token.kind, TokenKind::Termination(_)) {
                    self.phase = Phase::InMovetext;
                }

                match token.kind {
                    TokenKind::Move(san) => self.play(token, |p| P::play_move(p, &san)),
                    TokenKind::BishopOrPawn { bishop, pawn } => {
                        self.play(token, |p| P::play_bishop_or_pawn(p, &bishop, &pawn))
                    }
                    TokenKind::Castles(side) => self.play(token, |p| p.castle(side)),
                    TokenKind::NullMove => self.play(token, |p| p.null_move()),
                    TokenKind::RavStart => self.start_rav(token),
                    TokenKind::Termination(outcome) => self.terminate(token, outcome),
                    _ => self.fail(token, GameError::Token),
                }
            }
        }
    }

    /// Handles a token while skipping after an error
    fn skip(&mut self, token: Token, depth: usize, open: usize) {
        match token.kind {
            TokenKind::Termination(outcome) => self.terminate(token, outcome),
            TokenKind::RavStart if depth > 0 => {
                self.phase = Phase::Error { depth, open: open + 1 };
                self.append(token, None, None);
            }
            TokenKind::RavEnd if depth > 0 && open > 0 => {
                self.phase = Phase::Error { depth, open: open - 1 };
                self.append(token, None, None);
            }
            TokenKind::RavEnd if depth > 0 => match self.ravs.pop() {
                Some(frame) => self.close_rav(token, frame),
                None => self.append(token, None, None),
            },
            _ => self.append(token, None, None),
        }
    }

    /// Checks and applies one move
    fn play<F>(&mut self, token: Token, mv: F)
    where
        F: FnOnce(&mut Position) -> Result<PositionDelta, MoveError>,
    {
        let annotate = self.options.annotate_checks;
        let outcome = self.setup_position().and_then(|position| {
            let delta = mv(position)?;
            let check = if annotate { position.check_mark() } else { None };
            Ok((delta, check))
        });

        match outcome {
            Ok((delta, check)) => {
                let delta = Arc::new(delta);
                self.line.push(Arc::clone(&delta));
                self.append(token, Some(delta), check);
            }
            Err(error) => self.fail(token, error),
        }
    }

    fn start_rav(&mut self, token: Token) {
        let base = self.ravs.last().map_or(0, |frame| frame.base);
        let parent = match self.line.len() > base {
            true => self.line.pop(),
            false => None,
        };

        let Some(parent) = parent else {
            return self.fail(token, GameError::RavStart);
        };
        let Some(position) = self.position.as_mut() else {
            return self.fail(token, GameError::RavStart);
        };

        let after = position.clone();
        position.revert(&parent);
        self.ravs.push(RavFrame {
            after,
            parent,
            base: self.line.len(),
        });

        let delta = self.line.last().cloned();
        self.append(token, delta, None);
    }

    fn close_rav(&mut self, token: Token, frame: RavFrame) {
        self.position = Some(frame.after);
        self.line.truncate(frame.base);
        self.line.push(Arc::clone(&frame.parent));
        self.phase = Phase::InMovetext;
        self.append(token, Some(frame.parent), None);
    }

    fn terminate(&mut self, token: Token, outcome: Outcome) {
        if !self.ravs.is_empty() {
            self.record(self.tokens.len(), 0, GameError::UnclosedRav);
            self.ravs.clear();
        }
        self.result = Some(outcome);
        self.phase = Phase::Terminated;
        self.append(token, None, None);
    }

    /// The live position, set up from the tags on first use
    fn setup_position(&mut self) -> Result<&mut Position, GameError> {
        let position = match self.position.take() {
            Some(position) => position,
            None => {
                let position = Position::setup(&self.tags)?;
                self.initial = Some(position.clone());
                position
            }
        };
        Ok(self.position.insert(position))
    }

    /// Records an error at `index`, found at variation `depth`
    fn record(&mut self, index: usize, depth: usize, error: GameError) {
        match depth {
            0 => {
                self.state.get_or_insert(index);
            }
            _ => self.rav_errors.push(index),
        }
        self.errors.push((index, error));
    }

    /// Records an error on `token` and starts skipping
    fn fail(&mut self, token: Token, error: GameError) {
        let depth = self.ravs.len();
        self.record(self.tokens.len(), depth, error);
        if self.phase != Phase::Terminated {
            self.phase = Phase::Error { depth, open: 0 };
        }
        self.append(token, None, None);
    }

    #[inline]
    fn append(&mut self, token: Token, delta: Option<Arc<PositionDelta>>, check: Option<CheckMark>) {
        self.tokens.push(token);
        self.deltas.push(delta);
        self.checks.push(check);
    }
}

/******************************************\
|==========================================|
|                 Queries                  |
|==========================================|
\******************************************/

impl<P: MoveTextPolicy> Game<P> {
    /// Tags in the order they were read
    #[inline]
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The position delta each token leaves behind; `None` for tags,
    /// termination markers, skipped tokens and anything before the first move
    #[inline]
    pub fn deltas(&self) -> &[Option<Arc<PositionDelta>>] {
        &self.deltas
    }

    /// Check marks of accepted moves when check annotation is on
    #[inline]
    pub fn checks(&self) -> &[Option<CheckMark>] {
        &self.checks
    }

    /// Index of the first token in error outside any variation
    #[inline]
    pub fn state(&self) -> Option<usize> {
        self.state
    }

    /// Every error with the index of its token
    #[inline]
    pub fn errors(&self) -> &[(usize, GameError)] {
        &self.errors
    }

    /// Indices of errors found inside variations
    #[inline]
    pub fn rav_errors(&self) -> &[usize] {
        &self.rav_errors
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The termination marker's outcome, once read
    #[inline]
    pub fn result(&self) -> Option<Outcome> {
        self.result
    }

    #[inline]
    pub fn options(&self) -> GameOptions {
        self.options
    }

    /// Number of open variations
    #[inline]
    pub fn depth(&self) -> usize {
        self.ravs.len()
    }

    /// Whether anything other than tags and comments has been read
    #[inline]
    pub fn has_movetext(&self) -> bool {
        self.movetext
    }

    /// The start position, once set up
    #[inline]
    pub fn initial_position(&self) -> Option<&Position> {
        self.initial.as_ref()
    }

    /// The live position, once set up
    #[inline]
    pub fn current_position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// The position as it stood after token `index`
    pub fn position_at(&self, index: usize) -> Option<Position> {
        self.deltas.get(index)?.as_ref().map(|delta| delta.position())
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// No error in the main line nor in any variation
    #[inline]
    pub fn is_fully_valid(&self) -> bool {
        self.state.is_none() && self.rav_errors.is_empty()
    }

    /// No error outside variations
    #[inline]
    pub fn is_main_line_valid(&self) -> bool {
        self.state.is_none()
    }

    #[inline]
    pub fn has_variation_errors(&self) -> bool {
        !self.rav_errors.is_empty()
    }
}

impl<P: MoveTextPolicy> std::fmt::Display for Game<P> {
    /// Tags one per line, then the movetext tokens separated by spaces
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, value) in &self.tags {
            let value = value.replace('\\', "\\\\").replace('"', "\\\"");
            writeln!(f, "[{name} \"{value}\"]")?;
        }
        if !self.tags.is_empty() {
            writeln!(f)?;
        }

        let movetext = self
            .tokens
            .iter()
            .filter(|token| !token.is_tag())
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{movetext}")
    }
}

/******************************************\
|==========================================|
|               Game Errors                |
|==========================================|
\******************************************/

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Unrecognised or misplaced text")]
    Token,

    #[error("Illegal move: {0}")]
    Move(#[from] MoveError),

    #[error("Duplicate tag {0}")]
    DuplicateTag(String),

    #[error("Invalid start position: {0}")]
    Setup(#[from] SetupError),

    #[error("Variation opened before a move it could replace")]
    RavStart,

    #[error("Variation closed without being opened")]
    RavEnd,

    #[error("Game ends inside a variation")]
    UnclosedRav,

    #[error("Input ends before the termination marker")]
    Incomplete,
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Piece, Square};
    use crate::pgn::{IgnoreCasePgn, StrictPgn, TextPgn};

    fn assert_aligned<P: MoveTextPolicy>(game: &Game<P>) {
        assert_eq!(game.tokens().len(), game.deltas().len());
        assert_eq!(game.tokens().len(), game.checks().len());
    }

    fn fen_at<P: MoveTextPolicy>(game: &Game<P>, index: usize) -> Option<String> {
        game.position_at(index).map(|p| p.fen())
    }

    #[test]
    fn test_simple_game() {
        let game = Game::<StrictPgn>::parse("1. e4 e5 2. Nf3 Nc6 *");
        assert_aligned(&game);
        assert_eq!(game.state(), None);
        assert!(game.is_fully_valid());
        assert!(game.is_terminated());
        assert_eq!(game.tokens().len(), 5);
        assert_eq!(game.result(), Some(Outcome::Unknown));
        assert_eq!(
            fen_at(&game, 3).as_deref(),
            Some("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
        );
        assert_eq!(fen_at(&game, 4), None);
    }

    #[test]
    fn test_castling_from_fen() {
        let game = Game::<StrictPgn>::parse("[SetUp\"1\"][FEN\"4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1\"]O-O*");
        assert_aligned(&game);
        assert_eq!(game.state(), None);
        assert_eq!(game.tag("SetUp"), Some("1"));
        assert_eq!(fen_at(&game, 2).as_deref(), Some("4k3/8/8/8/8/8/8/R4RK1 b - - 1 1"));
    }

    #[test]
    fn test_superfluous_hint_by_policy() {
        let text = "[FEN \"4k3/8/8/b7/8/2N5/8/4K1N1 w - - 0 1\"] Nge2 *";

        let strict = Game::<StrictPgn>::parse(text);
        assert_eq!(strict.state(), Some(1));
        assert!(matches!(
            strict.errors()[0].1,
            GameError::Move(MoveError::SuperfluousDisambiguation { .. })
        ));

        let text_game = Game::<TextPgn>::parse(text);
        assert_eq!(text_game.state(), None);
        assert_eq!(
            text_game.position_at(1).and_then(|p| p.piece_on(Square::E2)),
            Some(Piece::WhiteKnight)
        );
    }

    #[test]
    fn test_bishop_or_pawn_resolved_on_board() {
        let game = Game::<IgnoreCasePgn>::parse("[FEN \"2r1k3/1P6/8/8/8/8/8/4K3 w - - 0 1\"] bxc8=q *");
        assert_eq!(game.state(), None);
        assert!(matches!(game.tokens()[1].kind, TokenKind::BishopOrPawn { .. }));
        assert_eq!(
            game.position_at(1).and_then(|p| p.piece_on(Square::C8)),
            Some(Piece::WhiteQueen)
        );
    }

    #[test]
    fn test_variations_restore_the_line() {
        let game = Game::<StrictPgn>::parse("1. e4 (1. d4 d5) (1. c4) e5 2. Nf3 *");
        assert_aligned(&game);
        assert!(game.is_fully_valid());
        assert_eq!(game.tokens().len(), 11);

        assert_eq!(fen_at(&game, 1), None);
        assert_eq!(
            fen_at(&game, 3).as_deref(),
            Some("rnbqkbnr/ppp1pppp/8/3p4/3P4/8/PPP1PPPP/RNBQKBNR w KQkq d6 0 2")
        );
        assert_eq!(
            fen_at(&game, 4).as_deref(),
            Some("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
        );
        assert_eq!(
            fen_at(&game, 8).as_deref(),
            Some("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2")
        );
        assert_eq!(game.depth(), 0);
    }

    #[test]
    fn test_variation_error_keeps_main_line() {
        let game = Game::<StrictPgn>::parse("1. e4 (1. e5 d5) e5 *");
        assert_aligned(&game);
        assert!(game.is_main_line_valid());
        assert!(game.has_variation_errors());
        assert!(!game.is_fully_valid());
        assert_eq!(game.rav_errors(), [2]);
        assert_eq!(fen_at(&game, 3), None);
        assert!(fen_at(&game, 5).is_some());
        assert!(game.is_terminated());
    }

    #[test]
    fn test_nested_variation_skipped_after_error() {
        let game = Game::<StrictPgn>::parse("1. e4 (1. e5 (1. d4) d5) e5 *");
        assert!(game.is_main_line_valid());
        assert_eq!(game.rav_errors(), [2]);
        assert_eq!(game.phase(), Phase::Terminated);
        assert!(fen_at(&game, 8).is_some());
    }

    #[test]
    fn test_main_line_error_context() {
        let game = Game::<StrictPgn>::parse("1. e4 e4 2. Nf3 { still kept } *");
        assert_aligned(&game);
        assert_eq!(game.state(), Some(1));
        assert_eq!(game.tokens().len(), 5);
        assert!(game.deltas()[2..].iter().all(Option::is_none));
        assert!(game.is_terminated());
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(Game::<StrictPgn>::parse("( e4 ) *").state(), Some(0));
        assert_eq!(Game::<StrictPgn>::parse("1. e4 ) *").state(), Some(1));
        assert_eq!(Game::<StrictPgn>::parse("1. e4 e5 xx *").state(), Some(2));

        let unclosed = Game::<StrictPgn>::parse("1. e4 (1. d4 *");
        assert_eq!(unclosed.state(), Some(3));
        assert_eq!(unclosed.errors(), [(3, GameError::UnclosedRav)]);
        assert_eq!(unclosed.depth(), 0);

        // after the marker the open variation no longer counts
        let trailing = Game::<StrictPgn>::parse("1. e4 (1. d4 * e5");
        assert_eq!(trailing.state(), Some(3));
        assert_eq!(trailing.errors(), [(3, GameError::UnclosedRav), (4, GameError::Token)]);
        assert!(trailing.rav_errors().is_empty());
        assert!(!trailing.has_variation_errors());
    }

    #[test]
    fn test_duplicate_tag() {
        let game = Game::<StrictPgn>::parse("[Event \"a\"][Event \"b\"] 1. e4 *");
        assert_eq!(game.state(), Some(1));
        assert_eq!(game.tags().len(), 1);
        assert_eq!(game.tokens().len(), 4);
        assert_eq!(game.errors()[0].1, GameError::DuplicateTag("Event".into()));
    }

    #[test]
    fn test_invalid_setup_without_moves() {
        let game = Game::<StrictPgn>::parse("[FEN \"8/8/8/8/8/8/8/8 w - - 0 1\"] *");
        assert_eq!(game.state(), Some(1));
        assert!(matches!(game.errors()[0].1, GameError::Setup(_)));
        assert!(game.is_terminated());
    }

    #[test]
    fn test_annotations_repeat_the_delta() {
        let game = Game::<StrictPgn>::parse("{before} 1. e4 {good} $1 e5 *");
        assert_aligned(&game);
        assert_eq!(game.deltas()[0], None);
        let (Some(e4), Some(comment), Some(nag)) = (&game.deltas()[1], &game.deltas()[2], &game.deltas()[3]) else {
            panic!("annotations should carry the last move's delta");
        };
        assert!(Arc::ptr_eq(e4, comment));
        assert!(Arc::ptr_eq(e4, nag));
    }

    #[test]
    fn test_check_annotation() {
        let options = GameOptions::default().with_annotate_checks(true);
        let game = Game::<StrictPgn>::parse_with("1. f3 e5 2. g4 Qh4# 0-1", options);
        assert_aligned(&game);
        assert_eq!(game.state(), None);
        assert_eq!(game.checks()[3], Some(CheckMark::Mate));
        assert_eq!(game.tokens()[4].kind, TokenKind::CheckIndicator);
        assert_eq!(game.checks()[..3], [None, None, None]);

        let plain = Game::<StrictPgn>::parse("1. f3 e5 2. g4 Qh4# 0-1");
        assert_eq!(plain.checks()[3], None);
    }

    #[test]
    fn test_incomplete_game() {
        let game = Game::<StrictPgn>::parse("1. e4 e5");
        assert_eq!(game.state(), Some(2));
        assert_eq!(game.errors(), [(2, GameError::Incomplete)]);
        assert!(!game.is_terminated());
    }

    #[test]
    fn test_null_moves_by_policy() {
        let text = Game::<TextPgn>::parse("1. e4 -- 2. d4 *");
        assert_eq!(text.state(), None);
        assert_eq!(
            fen_at(&text, 2).as_deref(),
            Some("rnbqkbnr/pppppppp/8/8/3PP3/8/PPP2PPP/RNBQKBNR b KQkq d3 0 2")
        );

        let strict = Game::<StrictPgn>::parse("1. e4 -- 2. d4 *");
        assert_eq!(strict.state(), Some(1));
        assert_eq!(strict.errors()[0].1, GameError::Token);
    }

    #[test]
    fn test_display() {
        let game = Game::<StrictPgn>::parse("[Event \"x\"] 1. e4 {hi} *");
        assert_eq!(game.to_string(), "[Event \"x\"]\n\ne4 {hi} *");
    }
}
