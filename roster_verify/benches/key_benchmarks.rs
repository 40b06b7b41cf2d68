use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use roster_verify::{
    CompositeKey, HierarchicalLoader, KeyShape, Level,
    db::{EventRow, MemoryStore, PlayerRow, TeamRow, predicate::push_key_filter},
};
use std::hint::black_box;
use std::sync::Arc;

/// Store with `n_events` events, four teams each, five players per team
fn seeded_store(n_events: usize) -> Arc<MemoryStore> {
    let mut store = MemoryStore::new();

    for e in 0..n_events {
        let event_id = e.to_string();
        store = store.with_event(EventRow {
            event_id: event_id.clone(),
            remote_id: String::new(),
            name: format!("Event {e}"),
            url: String::new(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            team_count: 4,
        });

        for t in 0..4 {
            let team_id = (e * 10 + t).to_string();
            store = store.with_team(TeamRow {
                event_id: event_id.clone(),
                team_id: team_id.clone(),
                remote_id: String::new(),
                name: format!("Team {team_id}"),
                url: String::new(),
                reg_order: i32::try_from(t).unwrap(),
                dropped: false,
                verification_status: 0,
                verification_note: String::new(),
            });

            for p in 0..5 {
                store = store.with_player(PlayerRow {
                    event_id: event_id.clone(),
                    team_id: team_id.clone(),
                    player_id: (t * 10 + p).to_string(),
                    remote_id: String::new(),
                    name: format!("Player {p}"),
                    url: String::new(),
                    dropped: false,
                    verification_status: 0,
                    verification_note: String::new(),
                });
            }
        }
    }

    Arc::new(store)
}

/// Benchmark key construction from segments
fn bench_key_new(c: &mut Criterion) {
    c.bench_function("key_new", |b| {
        b.iter(|| CompositeKey::new(black_box("1024"), black_box("77"), black_box("5")));
    });
}

/// Benchmark wire format parsing
fn bench_key_parse(c: &mut Criterion) {
    c.bench_function("key_parse", |b| {
        b.iter(|| black_box("1024:77:5").parse::<CompositeKey>());
    });
}

/// Benchmark elevation to both parent levels
fn bench_key_elevate(c: &mut Criterion) {
    let key = CompositeKey::player("1024", "77", "5").unwrap();

    c.bench_function("key_elevate", |b| {
        b.iter(|| {
            let team = key.elevate(Level::Team);
            let event = key.elevate(Level::Event);
            (team, event)
        });
    });
}

/// Benchmark building a batched key filter for growing batches
fn bench_predicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_filter");

    for batch in [1, 10, 100, 1000].iter() {
        let ids: Vec<String> = (0..*batch).map(|i| format!("{i}:{i}:")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(batch), &ids, |b, ids| {
            b.iter(|| {
                let mut builder =
                    sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT 1 FROM eventTeams et WHERE ");
                push_key_filter(
                    &mut builder,
                    KeyShape::TEAM,
                    &roster_verify::db::predicate::EVENT_TEAM_COLUMNS,
                    ids,
                );
                builder
            });
        });
    }

    group.finish();
}

/// Benchmark loading every roster entry of N events through the full hierarchy
fn bench_load_players(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("load_players");

    for n_events in [1, 10, 50].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_events", n_events)),
            n_events,
            |b, &n| {
                let store = seeded_store(n);
                let loader = HierarchicalLoader::new(store);
                let keys: Vec<CompositeKey> = (0..n)
                    .map(|e| CompositeKey::event(&e.to_string()).unwrap())
                    .collect();

                b.iter(|| runtime.block_on(loader.load_players(keys.clone())));
            },
        );
    }

    group.finish();
}

criterion_group!(
    key_operations,
    bench_key_new,
    bench_key_parse,
    bench_key_elevate,
    bench_predicate,
);

criterion_group!(loading, bench_load_players);

criterion_main!(key_operations, loading);
