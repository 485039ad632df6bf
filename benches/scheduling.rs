//! Scheduling and encounter throughput on the demo tower

use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use encounter_sim::scenario::Scenario;

fn tower() -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios/tower.toml");
    match Scenario::load(&path) {
        Ok(scenario) => scenario,
        Err(e) => panic!("cannot load {}: {}", path.display(), e),
    }
}

fn bench_schedule_week(c: &mut Criterion) {
    let scenario = tower();
    c.bench_function("schedule_week", |b| {
        b.iter(|| {
            let mut sim = scenario.build(black_box(11)).unwrap();
            for day in 0..7 {
                sim.schedule_day(day);
            }
            black_box(sim.agents.len())
        })
    });
}

fn bench_encounter_day(c: &mut Criterion) {
    let scenario = tower();
    let mut group = c.benchmark_group("encounters");
    group.sample_size(10);
    group.bench_function("one_day", |b| {
        b.iter(|| {
            let mut sim = scenario.build(black_box(11)).unwrap();
            sim.schedule_day(0);
            sim.run_encounters(0);
            black_box(sim.context.counters.day_total(0))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_schedule_week, bench_encounter_day);
criterion_main!(benches);
