use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use pgn::{Game, GameOptions, GameReader, ReaderOptions, StrictPgn, TextPgn};

const OPERA_GAME: &str = "[Event \"Paris\"]\n[Site \"Paris FRA\"]\n[Result \"1-0\"]\n\n\
    1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3 5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7\n\
    8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8 13. Rxd7 Rxd7\n\
    14. Rd1 Qe6 15. Bxd7+ Nxd7 16. Qb8+ Nxb8 17. Rd8# 1-0\n\n";

const RUY_LOPEZ: &str = "[Event \"Analysis\"]\n[Result \"*\"]\n\n\
    1. e4 e5 2. Nf3 Nc6 3. Bb5 {The Spanish} a6 (3... Nf6 4. O-O (4. d3 Bc5) 4... Nxe4)\n\
    4. Ba4 Nf6 5. O-O Be7 6. Re1 b5 7. Bb3 d6 8. c3 O-O 9. h3 $1 *\n\n";

/// A database of `copies` games alternating between the two samples
fn database(copies: usize) -> String {
    (0..copies)
        .map(|i| if i % 2 == 0 { OPERA_GAME } else { RUY_LOPEZ })
        .collect()
}

fn bench_reader(c: &mut Criterion) {
    pgn::geometry::init_all_tables();
    let text = database(200);

    let mut group = c.benchmark_group("reader");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);
    group.throughput(Throughput::Bytes(text.len() as u64));

    // Correctness guard before benchmarking.
    let games: Vec<Game<StrictPgn>> = GameReader::from_read(text.as_bytes(), ReaderOptions::default()).collect();
    assert_eq!(games.len(), 200);
    assert!(games.iter().all(Game::is_fully_valid));

    for chunk_size in [64, 4096, 64 * 1024] {
        let options = ReaderOptions::default().with_chunk_size(chunk_size);
        group.bench_with_input(BenchmarkId::new("strict", chunk_size), &options, |b, &options| {
            b.iter(|| {
                let count = GameReader::<StrictPgn, _>::from_read(black_box(text.as_bytes()), options).count();
                black_box(count)
            });
        });
    }

    let annotated = ReaderOptions::default().with_game(GameOptions::default().with_annotate_checks(true));
    group.bench_function("text_with_checks", |b| {
        b.iter(|| {
            let count = GameReader::<TextPgn, _>::from_read(black_box(text.as_bytes()), annotated).count();
            black_box(count)
        });
    });

    group.finish();
}

criterion_group!(reader_benches, bench_reader);
criterion_main!(reader_benches);
