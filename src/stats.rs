//! Per-generation statistics.

use crate::snake::Snake;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Summary of one finished generation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation these numbers describe
    pub generation: u64,
    /// Number of agents
    pub population: usize,
    /// Highest fitness in the generation
    pub best_fitness: f32,
    /// Mean fitness
    pub mean_fitness: f32,
    /// Highest score in the generation
    pub best_score: u32,
    /// Mean score
    pub mean_score: f32,
    /// Best score of any generation so far, this one included
    pub best_score_ever: u32,
    /// Genome fingerprint of the highest-fitness agent
    pub best_fingerprint: u64,
    /// Ticks until the last agent died
    pub ticks: u64,
}

impl GenerationStats {
    /// Collect stats over a dead generation. `best` indexes the top agent.
    pub fn collect(generation: u64, agents: &[Snake], best: usize, ticks: u64) -> Self {
        let mut stats = Self {
            generation,
            population: agents.len(),
            ticks,
            ..Self::default()
        };

        if agents.is_empty() {
            return stats;
        }

        let n = agents.len() as f32;
        stats.mean_fitness = agents.iter().map(|a| a.fitness).sum::<f32>() / n;
        stats.mean_score = agents.iter().map(|a| a.score as f32).sum::<f32>() / n;
        stats.best_score = agents.iter().map(|a| a.score).max().unwrap_or(0);

        if let Some(top) = agents.get(best) {
            stats.best_fitness = top.fitness;
            stats.best_fingerprint = top.brain.network().fingerprint();
        }

        stats
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:5} | Pop:{:5} | Fit best:{:8.1} mean:{:7.1} | Score best:{:3} mean:{:5.2} | Record:{:3} | Ticks:{:5}",
            self.generation,
            self.population,
            self.best_fitness,
            self.mean_fitness,
            self.best_score,
            self.mean_score,
            self.best_score_ever,
            self.ticks,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsHistory {
    /// One entry per finished generation
    pub generations: Vec<GenerationStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.generations.last()
    }

    /// Best fitness over time
    pub fn best_fitness_series(&self) -> Vec<(u64, f32)> {
        self.generations
            .iter()
            .map(|s| (s.generation, s.best_fitness))
            .collect()
    }

    /// Mean fitness over time
    pub fn mean_fitness_series(&self) -> Vec<(u64, f32)> {
        self.generations
            .iter()
            .map(|s| (s.generation, s.mean_fitness))
            .collect()
    }

    /// Best score over time
    pub fn score_series(&self) -> Vec<(u64, u32)> {
        self.generations
            .iter()
            .map(|s| (s.generation, s.best_score))
            .collect()
    }

    /// Save history to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
