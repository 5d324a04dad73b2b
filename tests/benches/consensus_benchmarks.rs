//! # Hashgraph Core Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | hg-01 | event sign / verify, Lamport sort |
//! | hg-02 | wire event reconstruction, rolling index append |
//! | hg-03 | batched event persistence |

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use hg_01_consensus_types::{sort_lamport, Event};
use hg_02_consensus_caches::RollingIndex;
use hg_03_kv_storage::ConsensusStore;
use hg_tests::fixtures::network;
use rand::seq::SliceRandom;
use std::time::Duration;

// ============================================================================
// hg-01: Event model
// ============================================================================

fn bench_event_signatures(c: &mut Criterion) {
    let mut group = c.benchmark_group("hg-01-events");
    group.measurement_time(Duration::from_secs(5));

    let mut nodes = network(&["alice"]);
    let event = nodes[0].create_event(vec![vec![7u8; 256]; 16], vec![], vec![], None);

    group.bench_function("event_verify", |b| {
        b.iter(|| black_box(event.verify().unwrap()))
    });

    group.bench_function("event_hash_cold", |b| {
        b.iter_batched(
            || Event::unmarshal(&event.marshal().unwrap()).unwrap(),
            |fresh| black_box(fresh.hash().unwrap()),
            BatchSize::SmallInput,
        )
    });

    for size in [10usize, 100, 1000] {
        let mut events: Vec<Event> = (0..size)
            .map(|i| {
                let mut e = nodes[0].create_event(vec![], vec![], vec![], None);
                e.set_lamport_timestamp((i % 7) as i64);
                e
            })
            .collect();
        events.shuffle(&mut rand::thread_rng());

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("lamport_sort", size), &events, |b, events| {
            b.iter_batched(
                || events.clone(),
                |mut batch| sort_lamport(&mut batch),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

// ============================================================================
// hg-02: Caches
// ============================================================================

fn bench_caches(c: &mut Criterion) {
    let mut group = c.benchmark_group("hg-02-caches");

    let mut nodes = network(&["alice", "bob"]);
    let mut last = None;
    for _ in 0..50 {
        let event = nodes[0].create_event(vec![vec![1u8; 64]], vec![], vec![], None);
        nodes[1].receive(&event.to_wire());
        last = Some(event.to_wire());
    }
    if let Some(wire) = last {
        group.bench_function("read_wire_event", |b| {
            b.iter(|| black_box(nodes[1].caches.read_wire_event(&wire).unwrap()))
        });
    }

    group.bench_function("rolling_index_append_10k", |b| {
        b.iter(|| {
            let mut index = RollingIndex::new("bench", 1000);
            for i in 0..10_000i64 {
                index.set(i, i).unwrap();
            }
            black_box(index.last_index())
        })
    });
    group.finish();
}

// ============================================================================
// hg-03: Storage
// ============================================================================

fn bench_storage(c: &mut Criterion) {
    let mut group = c.benchmark_group("hg-03-storage");

    let mut nodes = network(&["alice"]);
    let events: Vec<Event> = (0..100)
        .map(|_| nodes[0].create_event(vec![vec![2u8; 128]], vec![], vec![], None))
        .collect();

    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("put_events_100", |b| {
        b.iter_batched(
            || events.clone(),
            |mut batch| {
                let mut store = ConsensusStore::open(&Default::default()).unwrap();
                store.put_events(&mut batch).unwrap();
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_event_signatures, bench_caches, bench_storage);
criterion_main!(benches);
