use pgn::pgn::GameError;
use pgn::{Game, GameReader, IgnoreCasePgn, ReaderOptions, StrictPgn, TextPgn, read_games};

const DATABASE: &str = "[Event \"Rated game\"]\n[Site \"?\"]\n[Result \"1-0\"]\n\n\
    1. e4 e5 2. Nf3 Nc6 3. Bb5 {The Ruy Lopez; a comment\nacross lines} a6 $1\n\
    (3... Nf6 4. O-O (4. d3) 4... Nxe4) 4. Ba4 Nf6 5. O-O Be7 1-0\n\n\
    % an escaped line\n\
    [Event \"Broken\"]\n\n\
    1. d4 d5 2. Bf4 Bf5 3. Qd3 Bxd3 4. Kd2 ; never finished\n\n\
    [Event \"Third\"]\n[FEN \"4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1\"]\n\n\
    1. O-O-O Kf7 2. Rh7+ Ke6 1/2-1/2\n";

type Summary = (Vec<(String, String)>, Vec<String>, Option<usize>, Vec<usize>);

fn summarise<P: pgn::MoveTextPolicy>(games: &[Game<P>]) -> Vec<Summary> {
    games
        .iter()
        .map(|game| {
            (
                game.tags().to_vec(),
                game.tokens().iter().map(ToString::to_string).collect(),
                game.state(),
                game.rav_errors().to_vec(),
            )
        })
        .collect()
}

/// Splits `text` into chunks whose sizes cycle through `sizes`, never cutting a character
fn split(text: &str, sizes: &[usize]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut at = 0;
    for &size in sizes.iter().cycle() {
        if at >= chars.len() {
            break;
        }
        let end = (at + size).min(chars.len());
        chunks.push(chars[at..end].iter().collect());
        at = end;
    }
    chunks
}

#[test]
fn test_database_games() {
    let games = read_games::<StrictPgn>(DATABASE);
    assert_eq!(games.len(), 3);

    assert_eq!(games[0].tag("Event"), Some("Rated game"));
    assert!(games[0].is_fully_valid());

    // legal moves, but the next tags arrive before a result
    assert_eq!(games[1].tag("Event"), Some("Broken"));
    assert!(!games[1].is_terminated());
    assert_eq!(games[1].state(), Some(10));
    assert_eq!(games[1].errors().last().map(|e| &e.1), Some(&GameError::Incomplete));

    assert_eq!(games[2].tag("Event"), Some("Third"));
    assert!(games[2].is_fully_valid());
}

#[test]
fn test_chunk_sizes_do_not_matter() {
    let whole = summarise(&read_games::<TextPgn>(DATABASE));

    for sizes in [&[1][..], &[7], &[2, 5, 1, 11], &[64], &[DATABASE.len()]] {
        let chunks = split(DATABASE, sizes);
        let games: Vec<Game<TextPgn>> =
            GameReader::new(chunks.into_iter(), ReaderOptions::default()).collect();
        assert_eq!(summarise(&games), whole, "chunk sizes {sizes:?}");
    }
}

#[test]
fn test_byte_reader_matches_text() {
    let whole = summarise(&read_games::<StrictPgn>(DATABASE));

    for chunk_size in [1, 3, 4096] {
        let options = ReaderOptions::default().with_chunk_size(chunk_size);
        let games: Vec<Game<StrictPgn>> = GameReader::from_read(DATABASE.as_bytes(), options).collect();
        assert_eq!(summarise(&games), whole, "chunk size {chunk_size}");
    }
}

#[test]
fn test_parsing_is_deterministic() {
    let first = summarise(&read_games::<IgnoreCasePgn>(DATABASE));
    let second = summarise(&read_games::<IgnoreCasePgn>(DATABASE));
    assert_eq!(first, second);
}

#[test]
fn test_tokens_and_deltas_align() {
    for game in read_games::<TextPgn>(DATABASE) {
        assert_eq!(game.tokens().len(), game.deltas().len());
        assert_eq!(game.tokens().len(), game.checks().len());

        for (index, delta) in game.deltas().iter().enumerate() {
            if let Some(delta) = delta {
                assert_eq!(game.position_at(index), Some(delta.position()));
            }
        }
    }
}
