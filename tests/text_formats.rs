use pgn::board::MoveError;
use pgn::pgn::{GameError, TokenKind};
use pgn::{Game, IgnoreCasePgn, Piece, Square, StrictPgn, TextPgn};

fn fen_at<P: pgn::MoveTextPolicy>(game: &Game<P>, index: usize) -> Option<String> {
    game.position_at(index).map(|p| p.fen())
}

/******************************************\
|==========================================|
|            Tolerant Movetext             |
|==========================================|
\******************************************/

#[test]
fn test_long_algebraic_game() {
    let text = "1. e2e4 Nf6 2. e4-e5 d5 3. e5d6 e7xd6 4. Ng1-f3 Bf8-e7 5. Bf1c4 0-0 \
        6. 0-0 <ignored note> c7c5 *";
    let game = Game::<TextPgn>::parse(text);

    assert_eq!(game.state(), None);
    assert!(game.is_fully_valid());
    assert_eq!(game.tokens().len(), 14);

    // long algebraic en passant, no capture mark
    assert_eq!(
        fen_at(&game, 4).as_deref(),
        Some("rnbqkb1r/ppp1pppp/3P1n2/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3")
    );
    assert!(game.deltas()[4].as_ref().is_some_and(|d| d.is_capture()));

    assert_eq!(game.tokens()[11].kind, TokenKind::Reserved);
    assert_eq!(game.deltas()[11], game.deltas()[10]);

    assert_eq!(
        fen_at(&game, 12).as_deref(),
        Some("rnbq1rk1/pp2bppp/3p1n2/2p5/2B5/5N2/PPPP1PPP/RNBQ1RK1 w - c6 0 7")
    );

    // none of it is import format
    assert_eq!(Game::<StrictPgn>::parse(text).state(), Some(0));
}

#[test]
fn test_bare_promotion() {
    let game = Game::<TextPgn>::parse("[FEN \"4k3/1P6/8/8/8/8/8/4K3 w - - 0 1\"]\n1. b8Q Kd7 *");

    assert_eq!(game.state(), None);
    let after = game.position_at(1).unwrap();
    assert_eq!(after.piece_on(Square::B8), Some(Piece::WhiteQueen));
    assert_eq!(after.piece_on(Square::B7), None);
    assert_eq!(fen_at(&game, 2).as_deref(), Some("1Q6/3k4/8/8/8/8/8/4K3 w - - 1 2"));
}

/******************************************\
|==========================================|
|              Bishop or Pawn              |
|==========================================|
\******************************************/

#[test]
fn test_bishop_and_pawn_both_legal() {
    let game = Game::<IgnoreCasePgn>::parse("[FEN \"4k3/8/8/4B3/8/2n5/1P6/4K3 w - - 0 1\"]\nbxc3 *");

    assert!(matches!(game.tokens()[1].kind, TokenKind::BishopOrPawn { .. }));
    assert_eq!(game.state(), Some(1));
    assert_eq!(
        game.errors(),
        [(1, GameError::Move(MoveError::BishopOrPawnUnresolved { both_legal: true }))]
    );
    assert_eq!(game.deltas()[1], None);
}
