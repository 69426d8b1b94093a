//! Genetic Snakes - CLI Entry Point
//!
//! Evolves snake brains from the command line.

use clap::{Parser, Subcommand};
use genetic_snakes::grid::{Arena, GridMovement};
use genetic_snakes::snapshot::GenomeSnapshot;
use genetic_snakes::{benchmark, Brain, Config, Population, Snake};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "genetic-snakes")]
#[command(version)]
#[command(about = "Neuroevolution of snake controllers with a genetic algorithm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a new population
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to evolve
        #[arg(short, long, default_value = "100")]
        generations: u64,

        /// Output directory for the champion genome and stats
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Replay the best agents of every generation before breeding
        #[arg(long)]
        show_best: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of generations
        #[arg(short, long, default_value = "5")]
        generations: u64,

        /// Population size
        #[arg(short, long, default_value = "1000")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Analyze a genome snapshot
    Analyze {
        /// Snapshot file
        snapshot: PathBuf,
    },

    /// Run one snake from a genome snapshot until it dies
    Replay {
        /// Snapshot file
        snapshot: PathBuf,

        /// Configuration file (YAML) for the arena
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The run config is read once and also decides the default log level
    let config = match &cli.command {
        Commands::Run { config, .. } | Commands::Replay { config, .. } => {
            Some(load_config(config)?)
        }
        _ => None,
    };
    let level = config
        .as_ref()
        .map_or("info", |c| c.logging.log_level.as_str())
        .to_string();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    let config = config.unwrap_or_default();

    match cli.command {
        Commands::Run {
            config: path,
            generations,
            output,
            seed,
            show_best,
        } => {
            if path.exists() {
                println!("Loading config from: {:?}", path);
            } else {
                println!("Using default configuration");
            }
            run_evolution(config, generations, output, seed, show_best)
        }

        Commands::Benchmark {
            generations,
            population,
        } => run_benchmark(generations, population),

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { snapshot } => analyze_snapshot(snapshot),

        Commands::Replay { snapshot, .. } => replay_snapshot(snapshot, &config),
    }
}

/// Parse and validate `path`, or fall back to defaults when it does not exist
fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        Config::from_file(path)
    } else {
        Ok(Config::default())
    }
}

fn run_evolution(
    mut config: Config,
    generations: u64,
    output: PathBuf,
    seed: u64,
    show_best: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    config.population.show_best |= show_best;

    std::fs::create_dir_all(&output)?;

    let mut population = Population::new(config.clone(), seed)?;

    println!("Starting evolution");
    println!("  Population: {}", config.population.size);
    println!("  Arena: {}x{}", config.arena.tile_count, config.arena.tile_count);
    println!("  Parameters per genome: {}", population.topology().parameter_count());
    println!("  Generations: {}", generations);
    println!("  Seed: {}", seed);
    println!();

    let start = Instant::now();
    population.run_generations(generations)?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Evolution Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", population.history().len());
    println!(
        "Speed: {:.2} generations/s",
        generations as f64 / elapsed.as_secs_f64()
    );
    println!("Best score: {}", population.best_score_ever());

    if let Some(champion) = population.champion() {
        let path = output.join("champion.bin");
        champion.save(&path)?;
        println!("Champion genome: {:?}", path);
    }

    let stats_path = output.join("stats_history.json");
    population.history().save(&stats_path)?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn run_benchmark(generations: u64, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Genetic Snakes Benchmark ===");
    println!("Generations: {}", generations);
    println!("Population: {}", population);
    println!();

    let result = benchmark(generations, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn analyze_snapshot(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Genome Analysis ===");
    println!("File: {:?}", path);
    println!();

    let snapshot = GenomeSnapshot::load(&path)?;
    let network = snapshot.restore()?;
    let topology = network.topology();

    println!("Generation: {}", snapshot.generation);
    if let Some(fitness) = snapshot.fitness {
        println!("Fitness: {:.1}", fitness);
    }
    println!(
        "Topology: {} -> {:?} -> {} ({})",
        topology.inputs,
        topology.hidden,
        topology.outputs,
        if topology.recurrent { "recurrent" } else { "feedforward" }
    );
    println!("Parameters: {}", network.parameter_count());
    println!("Fingerprint: {:016x}", network.fingerprint());

    let values = &snapshot.values;
    if !values.is_empty() {
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        println!();
        println!("Value mean: {:.4}", mean);
        println!("Value std: {:.4}", var.sqrt());
        println!("Value range: [{:.4}, {:.4}]", min, max);
    }

    Ok(())
}

fn replay_snapshot(path: PathBuf, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = GenomeSnapshot::load(&path)?;
    let network = snapshot.restore()?;

    let arena = Arena::new(config.arena.tile_count);
    let mut movement = GridMovement::new(arena);
    let mut snake = Snake::new(Brain::new(network), &arena, &config.arena);

    while snake.is_alive() {
        snake.tick(&arena, &mut movement, config.arena.max_idle_ticks)?;
    }

    println!("=== Replay ===");
    println!("Score: {}", snake.score);
    println!("Ticks survived: {}", snake.ticks_alive);
    println!("Length: {}", snake.body.len());
    println!("Fitness: {:.1}", snake.fitness);

    Ok(())
}
