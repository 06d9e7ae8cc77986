#[macro_use]
extern crate slog;

use criterion::*;
use handscene_rs::*;

fn bench_show(c: &mut Criterion) {
    let mut group = c.benchmark_group("benchmark-handscene");

    let drain = slog::Discard;
    let log = slog::Logger::root(drain, o!());

    let mut tracker = tracker::SyntheticHandTracker::new(&log, 32, false);
    let mut events = tracker.poll(0.016).into_iter();
    let topology = match events.next() {
        Some(tracker::HandTrackerEvent::TopologyLoaded(topology)) => topology,
        _ => panic!("tracker did not announce a topology"),
    };
    let detection = match events.next() {
        Some(tracker::HandTrackerEvent::HandFound(detection)) => detection,
        _ => panic!("tracker did not find a hand"),
    };

    let mut hand = handscene::HandMesh::build(&log, &topology).unwrap();

    group.bench_function("bench_show", |b| b.iter(|| hand.show(&detection)));
    group.finish();
}

criterion_group!(benches, bench_show);
criterion_main!(benches);
