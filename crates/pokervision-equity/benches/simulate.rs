use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pokervision_equity::{rank, simulate, Card, Deck};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn cards(ids: &[u8]) -> Vec<Card> {
    ids.iter().filter_map(|&id| Card::new(id).ok()).collect()
}

fn bench_rank(c: &mut Criterion) {
    let hand: [Card; 7] = [0, 14, 28, 42, 4, 18, 32].map(|id| Card::new(id).unwrap());
    c.bench_function("rank a 7-card hand", |b| b.iter(|| rank(black_box(&hand))));
}

fn bench_draw(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(0);
    c.bench_function("shuffle and draw 2+5", |b| {
        b.iter(|| Deck::full().shuffle_and_draw(&mut rng, 2, 5))
    });
}

fn bench_simulate(c: &mut Criterion) {
    let hole = cards(&[0, 12]);
    let flop = cards(&[20, 33, 47]);
    let mut group = c.benchmark_group("simulate_1000");
    group
        .sample_size(20)
        .measurement_time(Duration::from_secs(2));
    group.bench_function("preflop", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| simulate(&hole, &[], 1_000, &mut rng))
    });
    group.bench_function("flop", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| simulate(&hole, &flop, 1_000, &mut rng))
    });
    group.finish();
}

criterion_group!(benches, bench_rank, bench_draw, bench_simulate);
criterion_main!(benches);
