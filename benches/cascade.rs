use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use jewel_match::core::{
    find_matches, generate, legal_moves, Board, CascadeEngine, GameConfig, GameState, KindSet,
    MatchRules, SimpleRng, SwapRule,
};
use jewel_match::engine::plan_best_swap;

fn random_board(seed: u32) -> Board {
    let mut board = Board::new(8, 8).unwrap();
    board.refill(&KindSet::all(), &mut SimpleRng::new(seed));
    board
}

fn bench_generate(c: &mut Criterion) {
    let kinds = KindSet::all();
    let mut rng = SimpleRng::new(12345);

    c.bench_function("generate_8x8", |b| {
        b.iter(|| generate(8, 8, &kinds, 3, &mut rng).unwrap())
    });
}

fn bench_find_matches(c: &mut Criterion) {
    let board = random_board(12345);
    let rules = MatchRules::default();

    c.bench_function("find_matches_8x8", |b| {
        b.iter(|| find_matches(black_box(&board), &rules))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let engine = CascadeEngine::default();
    let kinds = KindSet::all();
    let mut seed = 0u32;

    // Random fills are full of matches, so this drives long cascades.
    c.bench_function("resolve_random_8x8", |b| {
        b.iter_batched(
            || {
                seed = seed.wrapping_add(1);
                (random_board(seed), SimpleRng::new(seed ^ 0xa5a5))
            },
            |(mut board, mut rng)| {
                let _ = engine.resolve(&mut board, &kinds, &mut rng);
                board
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_legal_moves(c: &mut Criterion) {
    let game = GameState::new(GameConfig::default().with_seed(12345)).unwrap();

    c.bench_function("legal_moves_8x8", |b| {
        b.iter(|| legal_moves(black_box(game.board()), 3, SwapRule::MustMatch))
    });
}

fn bench_plan(c: &mut Criterion) {
    let game = GameState::new(GameConfig::default().with_seed(12345)).unwrap();

    c.bench_function("plan_best_swap", |b| {
        b.iter(|| plan_best_swap(black_box(&game)))
    });
}

criterion_group!(
    benches,
    bench_generate,
    bench_find_matches,
    bench_resolve,
    bench_legal_moves,
    bench_plan
);
criterion_main!(benches);
