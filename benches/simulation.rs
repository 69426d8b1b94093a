//! Performance benchmarks for Genetic Snakes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use genetic_snakes::grid::Arena;
use genetic_snakes::neural::Matrix;
use genetic_snakes::sensor;
use genetic_snakes::snake::Body;
use genetic_snakes::{Config, NeuralNet, Population, Topology};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn benchmark_population_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_tick");

    for size in [100, 500, 1000].iter() {
        let mut config = Config::default();
        config.population.size = *size;
        config.population.tournament_size = config.population.tournament_size.min(*size);

        let mut population = Population::new(config, 42).unwrap();

        group.bench_with_input(BenchmarkId::new("size", size), size, |b, _| {
            b.iter(|| {
                population.tick().unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_neural_forward(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut net = NeuralNet::random(Topology::snake_brain(), &mut rng).unwrap();
    let inputs = [0.5f32; 24];

    c.bench_function("neural_feed_forward", |b| {
        b.iter(|| net.feed_forward(black_box(&inputs)).unwrap());
    });
}

fn benchmark_matrix_multiply(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let a = Matrix::random(16, 27, &mut rng).unwrap();
    let x = Matrix::random(27, 1, &mut rng).unwrap();

    c.bench_function("matrix_multiply_16x27", |b| {
        b.iter(|| Matrix::multiply(black_box(&a), black_box(&x)).unwrap());
    });
}

fn benchmark_sensing(c: &mut Criterion) {
    let arena = Arena::new(10);
    let body = Body::spawn(&arena, 3);
    let target = Some(arena.center().offset(0, -4));

    c.bench_function("sensor_look", |b| {
        b.iter(|| sensor::look(black_box(&body), black_box(target), &arena));
    });
}

fn benchmark_genetic_operators(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let a = NeuralNet::random(Topology::snake_brain(), &mut rng).unwrap();
    let b_net = NeuralNet::random(Topology::snake_brain(), &mut rng).unwrap();

    c.bench_function("crossover", |b| {
        b.iter(|| a.crossover(black_box(&b_net), &mut rng).unwrap());
    });

    let mut child = a.copy();
    c.bench_function("mutate", |b| {
        b.iter(|| child.mutate(black_box(0.002), &mut rng).unwrap());
    });
}

fn benchmark_generation(c: &mut Criterion) {
    let mut config = Config::default();
    config.population.size = 200;

    c.bench_function("generation_200", |b| {
        b.iter_with_setup(
            || Population::new(config.clone(), 7).unwrap(),
            |mut population| population.run_generations(1).unwrap(),
        );
    });
}

criterion_group!(
    benches,
    benchmark_population_tick,
    benchmark_neural_forward,
    benchmark_matrix_multiply,
    benchmark_sensing,
    benchmark_genetic_operators,
    benchmark_generation,
);
criterion_main!(benches);
