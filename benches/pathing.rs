use criterion::{
    Criterion,
    criterion_group,
    criterion_main
};
use mazes::cells::Coordinate;
use mazes::generators;
use mazes::grid::Grid;
use mazes::pathing::{self, SearchAlgorithm, SearchLimits};
use mazes::units::{ColumnsCount, MaxPaths, MaxSteps, RowsCount};
use rand::rngs::StdRng;
use rand::SeedableRng;

const START: Coordinate = Coordinate { row: 0, col: 0 };
const END: Coordinate = Coordinate { row: 200, col: 200 };

fn large_maze() -> Grid {
    let mut rng = StdRng::seed_from_u64(201);
    generators::depth_first(&mut rng, RowsCount(201), ColumnsCount(201), &[START], &[END], None).unwrap()
}

fn unlimited() -> SearchLimits {
    SearchLimits::new(MaxSteps(usize::max_value()), MaxPaths(1))
}

fn bench_breadth_first(c: &mut Criterion) {
    c.bench_function("breadth_first", |b| {
        let g = large_maze();
        b.iter(|| pathing::breadth_first(&g, &[START], &[END], unlimited(), None))
    });
}

fn bench_depth_first(c: &mut Criterion) {
    c.bench_function("depth_first", |b| {
        let g = large_maze();
        b.iter(|| pathing::depth_first(&g, &[START], &[END], unlimited(), None))
    });
}

fn bench_greedy_best_first(c: &mut Criterion) {
    c.bench_function("greedy_best_first", |b| {
        let g = large_maze();
        b.iter(|| pathing::greedy_best_first(&g, &[START], &[END], unlimited(), None))
    });
}

fn bench_default_budget_search(c: &mut Criterion) {
    c.bench_function("default_budget_search", |b| {
        let g = large_maze();
        let limits = SearchLimits::for_algorithm(SearchAlgorithm::BreadthFirst);
        b.iter(|| pathing::search(SearchAlgorithm::BreadthFirst, &g, &[START], &[END], limits, None))
    });
}

criterion_group!(benches,
    bench_breadth_first,
    bench_depth_first,
    bench_greedy_best_first,
    bench_default_budget_search
);
criterion_main!(benches);
