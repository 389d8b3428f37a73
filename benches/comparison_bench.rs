use criterion::{criterion_group, criterion_main, Criterion};
use grid_search_harness::solver::{AlgorithmKind, BenchmarkSolver};
use grid_util::{grid::ValueGrid, BoolGrid, Point};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

const N: usize = 64;
const N_QUERIES: usize = 32;

fn random_scenario(seed: u64) -> (BoolGrid, Vec<(Point, Point)>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = BoolGrid::new(N, N, false);
    for x in 0..N as i32 {
        for y in 0..N as i32 {
            grid.set(x, y, rng.gen_bool(0.2));
        }
    }
    let mut free_point = |grid: &BoolGrid| loop {
        let p = Point::new(rng.gen_range(0..N as i32), rng.gen_range(0..N as i32));
        if !grid.get_point(p) {
            break p;
        }
    };
    let queries = (0..N_QUERIES)
        .map(|_| (free_point(&grid), free_point(&grid)))
        .collect();
    (grid, queries)
}

fn random_grid_bench(c: &mut Criterion) {
    let (grid, queries) = random_scenario(0);
    for kind in AlgorithmKind::ALL {
        let mut solver = kind.build(grid.clone(), false);
        c.bench_function(format!("random {N}x{N}, {kind}").as_str(), |b| {
            b.iter(|| {
                for (start, end) in &queries {
                    solver.set_query(*start, *end);
                    black_box(solver.solve().ok());
                }
            })
        });
    }
}

criterion_group!(benches, random_grid_bench);
criterion_main!(benches);
