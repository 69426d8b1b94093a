//! # Genetic Snakes
//!
//! Neuroevolution of snake controllers with a plain genetic algorithm.
//!
//! ## Features
//!
//! - **Recurrent brains**: 24 ray-cast sensors, two hidden layers, 3 steering outputs
//! - **Genetic operators**: tournament selection, elitism, uniform crossover, replacement mutation
//! - **Deterministic**: every random draw comes from a seeded `ChaCha8Rng`
//! - **Configurable**: YAML configuration files
//! - **Portable genomes**: lossless snapshots of any network
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use genetic_snakes::{Config, Population};
//!
//! let mut population = Population::new(Config::default(), 42).unwrap();
//!
//! // Evolve for a while
//! population.run_generations(10).unwrap();
//!
//! println!("Generation: {}", population.generation());
//! println!("Best score so far: {}", population.best_score_ever());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use genetic_snakes::Config;
//!
//! let mut config = Config::default();
//! config.population.size = 200;
//! config.evolution.mutation_rate = 0.01;
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Snapshots
//!
//! ```rust,no_run
//! use genetic_snakes::{Config, Population};
//! use genetic_snakes::snapshot::GenomeSnapshot;
//!
//! let mut population = Population::new(Config::default(), 7).unwrap();
//! population.run_generations(5).unwrap();
//!
//! let champion = population.champion().unwrap();
//! champion.save("champion.bin").unwrap();
//!
//! let loaded = GenomeSnapshot::load("champion.bin").unwrap();
//! let network = loaded.restore().unwrap();
//! ```

pub mod brain;
pub mod config;
pub mod error;
pub mod grid;
pub mod neural;
pub mod population;
pub mod sensor;
pub mod snake;
pub mod snapshot;
pub mod stats;

// Re-export main types
pub use brain::{Action, Brain};
pub use config::Config;
pub use error::{EvoError, Result};
pub use neural::{Matrix, NeuralNet, Topology};
pub use population::{Phase, Population};
pub use snake::Snake;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Evolve a default-configured population and time it
pub fn benchmark(generations: u64, population: usize) -> Result<BenchmarkResult> {
    use std::time::Instant;

    let mut config = Config::default();
    config.population.size = population;
    config.population.tournament_size = config.population.tournament_size.min(population);
    config.population.elitism_size = config.population.elitism_size.min(population);

    let mut pop = Population::new(config, 0)?;

    let start = Instant::now();
    pop.run_generations(generations)?;
    let elapsed = start.elapsed();

    let ticks = pop.history().generations.iter().map(|s| s.ticks).sum();

    Ok(BenchmarkResult {
        generations,
        population,
        ticks,
        elapsed_secs: elapsed.as_secs_f64(),
        generations_per_second: generations as f64 / elapsed.as_secs_f64(),
        best_score: pop.best_score_ever(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: u64,
    pub population: usize,
    /// Ticks stepped across all generations
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub generations_per_second: f64,
    pub best_score: u32,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.2} generations/s", self.generations_per_second)?;
        writeln!(f, "Best score: {}", self.best_score)?;
        Ok(())
    }
}
