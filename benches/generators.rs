use criterion::{criterion_group, criterion_main, Criterion};
use mazes::{
    cells::Coordinate,
    generators,
    units::{ColumnsCount, RowsCount},
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_depth_first_maze_101(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(101);
    c.bench_function("depth_first_maze_101", move |b| {
        b.iter(|| {
            generators::depth_first(&mut rng,
                                    RowsCount(101),
                                    ColumnsCount(101),
                                    &[Coordinate::new(0, 0)],
                                    &[Coordinate::new(100, 100)],
                                    None)
        })
    });
}

fn bench_random_growth_maze_101(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(101);
    c.bench_function("random_growth_maze_101", move |b| {
        b.iter(|| {
            generators::random_growth(&mut rng,
                                      RowsCount(101),
                                      ColumnsCount(101),
                                      &[Coordinate::new(0, 0)],
                                      &[Coordinate::new(100, 100)],
                                      None)
        })
    });
}

criterion_group!(
    benches,
    bench_depth_first_maze_101,
    bench_random_growth_maze_101
);
criterion_main!(benches);
