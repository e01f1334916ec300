/*!
 * Simulation Benchmark
 * Full runs of a contended script under the cheap and expensive policies
 */

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use schedsim::{PolicyKind, ProcessScript, Simulation};

fn contended_scripts(processes: u32) -> Vec<ProcessScript> {
    (1..=processes)
        .map(|pid| {
            ProcessScript::new(pid, 20, pid % 10, (pid % 4) as u64)
                .with_acquire((pid % 4) as usize, 2, 6)
                .with_acquire(((pid + 1) % 4) as usize, 10, 4)
        })
        .collect()
}

fn bench_policies(c: &mut Criterion) {
    let scripts = contended_scripts(32);

    for kind in [
        PolicyKind::Fifo,
        PolicyKind::RoundRobin,
        PolicyKind::PriorityAging,
        PolicyKind::PriorityInheritance,
    ] {
        c.bench_function(&format!("run_{kind:?}"), |b| {
            b.iter(|| {
                let mut sim = Simulation::new(kind, black_box(&scripts)).unwrap();
                black_box(sim.run().unwrap())
            })
        });
    }
}

criterion_group!(benches, bench_policies);
criterion_main!(benches);
