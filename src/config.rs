//! Configuration for the snake evolution run.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::error::EvoError;
use crate::neural::Topology;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub neural: NeuralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Arena and per-snake settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Side length of the square arena
    pub tile_count: usize,
    /// Seed of every snake's target placement stream
    pub target_seed: u64,
    /// Ticks without eating before a snake starves; bounds every generation
    pub max_idle_ticks: u64,
    /// Body length at spawn
    pub initial_length: usize,
}

/// Population and selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Agents per generation
    pub size: usize,
    /// Agents sampled per tournament
    pub tournament_size: usize,
    /// Top genomes copied unchanged into the next generation
    pub elitism_size: usize,
    /// Replay the best agents of each generation before breeding
    pub show_best: bool,
    /// How many agents a replay shows
    pub best_size: usize,
}

/// Genetic operator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Probability of redrawing each weight and bias
    pub mutation_rate: f32,
}

/// Hidden layout of the snake brain. Inputs and outputs are fixed by the
/// sensors and the action set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralConfig {
    /// Hidden layer sizes
    pub hidden: Vec<usize>,
    /// Feed the previous output back as extra inputs
    pub recurrent: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Generations between stats summaries
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tile_count: 10,
            target_seed: 123,
            max_idle_ticks: 100,
            initial_length: 3,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 1000,
            tournament_size: 150,
            elitism_size: 20,
            show_best: false,
            best_size: 1,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.002,
        }
    }
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            hidden: vec![16, 16],
            recurrent: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 1,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Network layout for every snake of the run
    pub fn topology(&self) -> Topology {
        Topology {
            hidden: self.neural.hidden.clone(),
            recurrent: self.neural.recurrent,
            ..Topology::snake_brain()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), EvoError> {
        let fail = |msg: String| Err(EvoError::Configuration(msg));

        let arena = &self.arena;
        if arena.tile_count < 4 {
            return fail(format!("tile_count must be >= 4, got {}", arena.tile_count));
        }
        if arena.max_idle_ticks == 0 {
            return fail("max_idle_ticks must be >= 1".to_string());
        }
        let max_length = arena.tile_count / 2 + 1;
        if arena.initial_length == 0 || arena.initial_length > max_length {
            return fail(format!(
                "initial_length must be between 1 and {}, got {}",
                max_length, arena.initial_length
            ));
        }

        let pop = &self.population;
        if pop.size == 0 {
            return fail("population size must be > 0".to_string());
        }
        if pop.tournament_size == 0 || pop.tournament_size > pop.size {
            return fail(format!(
                "tournament_size must be between 1 and {}, got {}",
                pop.size, pop.tournament_size
            ));
        }
        if pop.elitism_size > pop.size {
            return fail(format!(
                "elitism_size must be between 0 and {}, got {}",
                pop.size, pop.elitism_size
            ));
        }
        if pop.best_size == 0 || pop.best_size > pop.size {
            return fail(format!(
                "best_size must be between 1 and {}, got {}",
                pop.size, pop.best_size
            ));
        }

        crate::neural::validate_rate(self.evolution.mutation_rate)?;
        self.topology().validate()?;

        if self.logging.stats_interval == 0 {
            return fail("stats_interval must be >= 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.topology(), Topology::snake_brain());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "population:\n  size: 50\n  tournament_size: 5\n  elitism_size: 2\n  show_best: true\n  best_size: 3\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.population.size, 50);
        assert_eq!(config.arena, ArenaConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases: Vec<fn(&mut Config)> = vec![
            |c| c.arena.tile_count = 3,
            |c| c.arena.initial_length = 0,
            |c| c.arena.initial_length = 7,
            |c| c.arena.max_idle_ticks = 0,
            |c| c.population.size = 0,
            |c| c.population.tournament_size = 0,
            |c| c.population.tournament_size = 1001,
            |c| c.population.elitism_size = 1001,
            |c| c.population.best_size = 0,
            |c| c.evolution.mutation_rate = 1.5,
            |c| c.evolution.mutation_rate = -0.1,
            |c| c.neural.hidden = vec![],
            |c| c.logging.stats_interval = 0,
        ];

        for (i, mutate) in cases.into_iter().enumerate() {
            let mut config = Config::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(EvoError::Configuration(_))),
                "case {} should fail",
                i
            );
        }
    }

    #[test]
    fn test_edge_values_accepted() {
        let mut config = Config::default();
        config.population.tournament_size = config.population.size;
        config.population.elitism_size = 0;
        config.evolution.mutation_rate = 1.0;
        config.arena.initial_length = 6;
        config.arena.max_idle_ticks = 1;
        assert!(config.validate().is_ok());
    }
}
