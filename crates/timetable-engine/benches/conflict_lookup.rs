//! Conflict lookup over a term-sized timetable: indexed store vs linear scan.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use timetable_engine::conflict::scan_conflicts;
use timetable_engine::{find_conflict, BookingInput, BookingStore, SchedulingPolicy, Slot, Weekday};

/// A dense, conflict-free timetable: every faculty member teaches back-to-back
/// hour-long sessions in their own room all day, every day.
fn timetable(faculty_count: usize) -> BookingStore {
    let policy = SchedulingPolicy::default();
    let mut store = BookingStore::new();
    for day in Weekday::ALL {
        for f in 0..faculty_count {
            for hour in 8..19 {
                let slot = BookingInput::new(
                    day.as_str(),
                    format!("{hour}:00"),
                    1.0,
                    "S1",
                    format!("F{f}"),
                    format!("R{f}"),
                )
                .validate(&policy, None)
                .expect("benchmark slots are in policy");
                let id = store.allocate_id().expect("ids available");
                store
                    .insert(slot.into_booking(id))
                    .expect("ids are freshly allocated");
            }
        }
    }
    store
}

fn candidate() -> Slot {
    BookingInput::new("wednesday", "13:00", 1.5, "S2", "F7", "R3")
        .validate(&SchedulingPolicy::default(), None)
        .expect("candidate is in policy")
}

fn bench_conflict_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("conflict_lookup");
    let candidate = candidate();
    for faculty_count in [10usize, 100, 500] {
        let store = timetable(faculty_count);
        let bookings = store.all();
        group.bench_with_input(
            BenchmarkId::new("indexed", store.len()),
            &store,
            |b, store| b.iter(|| find_conflict(black_box(&candidate), store, None)),
        );
        group.bench_with_input(
            BenchmarkId::new("scan", bookings.len()),
            &bookings,
            |b, bookings| b.iter(|| scan_conflicts(black_box(&candidate), bookings, None)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_conflict_lookup);
criterion_main!(benches);
