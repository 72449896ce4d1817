use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use conquest::board::{classic, PlayerId};
use conquest::bot::{path_to_rival, play_turn, rank_continents, BotConfig};
use conquest::combat::{estimate, resolve_battle};
use conquest::protocol::{format_snapshot, parse_snapshot};
use conquest::resolve::{reinforcements, Rules};
use conquest::setup::{deal, DEFAULT_INITIAL_TROOPS};

fn names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Player{}", i)).collect()
}

fn bench_resolve_battle(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(1);
    c.bench_function("resolve_battle_20v15", |b| {
        b.iter(|| resolve_battle(black_box(20), black_box(15), &mut rng))
    });
}

fn bench_odds_estimate(c: &mut Criterion) {
    c.bench_function("odds_estimate_10k_8v6", |b| {
        b.iter(|| estimate(black_box(8), black_box(6), 10_000, 7))
    });
}

fn bench_connectivity(c: &mut Criterion) {
    let graph = classic();
    let mut rng = SmallRng::seed_from_u64(2);
    let state = deal(&names(2), &graph, DEFAULT_INITIAL_TROOPS, &Rules::default(), &mut rng).unwrap();
    let (origin, _) = state.territories_of(PlayerId(0))[0];
    c.bench_function("connected_owned_territories", |b| {
        b.iter(|| state.connected_owned_territories(black_box(origin), PlayerId(0), &graph))
    });
}

fn bench_reinforcements(c: &mut Criterion) {
    let graph = classic();
    let mut rng = SmallRng::seed_from_u64(3);
    let state = deal(&names(4), &graph, DEFAULT_INITIAL_TROOPS, &Rules::default(), &mut rng).unwrap();
    c.bench_function("reinforcements", |b| {
        b.iter(|| reinforcements(black_box(&state), &graph, PlayerId(1), &Rules::default()))
    });
}

fn bench_snapshot_roundtrip(c: &mut Criterion) {
    let graph = classic();
    let mut rng = SmallRng::seed_from_u64(4);
    let state = deal(&names(6), &graph, 20, &Rules::default(), &mut rng).unwrap();
    let json = format_snapshot(&state, &graph).unwrap();
    c.bench_function("snapshot_parse", |b| {
        b.iter(|| parse_snapshot(black_box(&json), &graph).unwrap())
    });
    c.bench_function("snapshot_format", |b| {
        b.iter(|| format_snapshot(black_box(&state), &graph).unwrap())
    });
}

fn bench_bot_planning(c: &mut Criterion) {
    let graph = classic();
    let mut rng = SmallRng::seed_from_u64(5);
    let state = deal(&names(3), &graph, DEFAULT_INITIAL_TROOPS, &Rules::default(), &mut rng).unwrap();
    let player = PlayerId(0);
    let (from, _) = state.territories_of(player)[0];
    let target = graph
        .ids()
        .filter(|&t| !state.is_owned_by(t, player))
        .last()
        .unwrap();
    c.bench_function("rank_continents", |b| {
        b.iter(|| rank_continents(black_box(&state), &graph, player))
    });
    c.bench_function("path_to_rival", |b| {
        b.iter(|| path_to_rival(black_box(&state), &graph, from, target))
    });
}

fn bench_bot_turn(c: &mut Criterion) {
    let graph = classic();
    let rules = Rules::default();
    let mut rng = SmallRng::seed_from_u64(6);
    let state = deal(&names(3), &graph, DEFAULT_INITIAL_TROOPS, &rules, &mut rng).unwrap();
    let mut odds = conquest::combat::OddsTable::new(1_000, 9);
    c.bench_function("bot_play_turn", |b| {
        b.iter(|| {
            let mut scratch = state.clone();
            play_turn(&mut scratch, &graph, &rules, &BotConfig::default(), &mut odds, &mut rng).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_resolve_battle,
    bench_odds_estimate,
    bench_connectivity,
    bench_reinforcements,
    bench_snapshot_roundtrip,
    bench_bot_planning,
    bench_bot_turn,
);
criterion_main!(benches);
