//! Generational loop: stepping, replay of the best, selection and breeding.
//!
//! A [`Population`] is a small state machine driven one tick at a time:
//!
//! - **Stepping**: every live agent senses, decides and moves, in index order.
//! - When every agent is dead the generation ends. With `show_best` off the
//!   next generation is bred on the spot; with it on, the top `best_size`
//!   genomes are cloned into a replay cohort and the phase becomes
//!   **ReplayBest**.
//! - **ReplayBest**: only the replay cohort is stepped. When it is all dead
//!   the next generation is bred from the (untouched) main population.
//!
//! Every random draw comes from one seeded `ChaCha8Rng`, so bulk runs and
//! paced `tick()` calls produce identical results.

use crate::brain::Brain;
use crate::config::Config;
use crate::error::Result;
use crate::grid::{Arena, GridMovement, Movement};
use crate::neural::{NeuralNet, Topology};
use crate::snake::Snake;
use crate::snapshot::GenomeSnapshot;
use crate::stats::{GenerationStats, StatsHistory};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Which cohort the next tick advances
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Stepping,
    ReplayBest,
}

/// Tournament selection over `agents`; returns the winner's index.
///
/// Draws `size` candidates uniformly with replacement and keeps the fittest,
/// the first drawn winning ties. A tournament as large as the population
/// is a full scan instead, so it always finds the fittest agent (lowest
/// index on ties) and consumes no random draws.
pub fn tournament<R: Rng>(agents: &[Snake], size: usize, rng: &mut R) -> usize {
    if size >= agents.len() {
        return rank(agents).first().copied().unwrap_or(0);
    }

    let mut best = rng.gen_range(0..agents.len());
    for _ in 1..size {
        let candidate = rng.gen_range(0..agents.len());
        if agents[candidate].fitness > agents[best].fitness {
            best = candidate;
        }
    }
    best
}

/// Indices ordered by fitness, best first. Equal fitness keeps index order.
pub fn rank(agents: &[Snake]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..agents.len()).collect();
    order.sort_by(|&a, &b| agents[b].fitness.total_cmp(&agents[a].fitness));
    order
}

/// A generation of snakes plus everything needed to breed the next one
pub struct Population<M: Movement = GridMovement> {
    agents: Vec<Snake>,
    replay: Vec<Snake>,
    generation: u64,
    phase: Phase,
    config: Config,
    topology: Topology,
    arena: Arena,
    movement: M,
    rng: ChaCha8Rng,
    seed: u64,
    tick_in_generation: u64,
    best_score_ever: u32,
    champion: Option<GenomeSnapshot>,
    history: StatsHistory,
}

impl Population<GridMovement> {
    /// Random first generation on the built-in snake rules
    pub fn new(config: Config, seed: u64) -> Result<Self> {
        let arena = Arena::new(config.arena.tile_count);
        Self::with_movement(config, seed, GridMovement::new(arena))
    }
}

impl<M: Movement> Population<M> {
    /// Random first generation driven by a host-supplied [`Movement`]
    pub fn with_movement(config: Config, seed: u64, movement: M) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let topology = config.topology();
        let arena = Arena::new(config.arena.tile_count);

        let agents = (0..config.population.size)
            .map(|_| {
                let net = NeuralNet::random(topology.clone(), &mut rng)?;
                Ok(Snake::new(Brain::new(net), &arena, &config.arena))
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Population of {} created: topology {:?}, {} parameters per genome",
            agents.len(),
            topology,
            topology.parameter_count()
        );

        Ok(Self {
            agents,
            replay: Vec::new(),
            generation: 1,
            phase: Phase::Stepping,
            config,
            topology,
            arena,
            movement,
            rng,
            seed,
            tick_in_generation: 0,
            best_score_ever: 0,
            champion: None,
            history: StatsHistory::new(),
        })
    }

    // === Accessors ===

    #[inline]
    pub fn agents(&self) -> &[Snake] {
        &self.agents
    }

    /// Mutable agents, for hosts that score or kill agents themselves
    #[inline]
    pub fn agents_mut(&mut self) -> &mut [Snake] {
        &mut self.agents
    }

    /// Replay cohort; empty outside [`Phase::ReplayBest`]
    #[inline]
    pub fn replay(&self) -> &[Snake] {
        &self.replay
    }

    /// Current generation, starting at 1
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks the current generation has been stepped for
    #[inline]
    pub fn tick_in_generation(&self) -> u64 {
        self.tick_in_generation
    }

    /// Highest score reached by any agent of any finished generation
    #[inline]
    pub fn best_score_ever(&self) -> u32 {
        self.best_score_ever
    }

    /// Best genome of the last finished generation
    #[inline]
    pub fn champion(&self) -> Option<&GenomeSnapshot> {
        self.champion.as_ref()
    }

    #[inline]
    pub fn history(&self) -> &StatsHistory {
        &self.history
    }

    /// Live agents in the cohort the next tick advances
    pub fn live_count(&self) -> usize {
        self.active().iter().filter(|a| a.is_alive()).count()
    }

    /// Toggle replay of the best before breeding. Takes effect at the next
    /// generation end.
    pub fn set_show_best(&mut self, show_best: bool) {
        self.config.population.show_best = show_best;
    }

    fn active(&self) -> &[Snake] {
        match self.phase {
            Phase::Stepping => &self.agents,
            Phase::ReplayBest => &self.replay,
        }
    }

    // === Simulation ===

    /// Advance the active cohort by one tick, then handle a generation end.
    ///
    /// A tick always runs to completion; stopping means not calling again.
    pub fn tick(&mut self) -> Result<()> {
        let max_idle = self.config.arena.max_idle_ticks;
        let cohort = match self.phase {
            Phase::Stepping => &mut self.agents,
            Phase::ReplayBest => &mut self.replay,
        };

        let mut moved = false;
        for agent in cohort.iter_mut().filter(|a| a.is_alive()) {
            agent.tick(&self.arena, &mut self.movement, max_idle)?;
            moved = true;
        }
        if moved && self.phase == Phase::Stepping {
            self.tick_in_generation += 1;
        }

        if cohort.iter().any(|a| a.is_alive()) {
            return Ok(());
        }

        match self.phase {
            Phase::Stepping if self.config.population.show_best => {
                self.start_replay();
                Ok(())
            }
            Phase::Stepping | Phase::ReplayBest => self.breed(),
        }
    }

    /// Run exactly `ticks` ticks
    pub fn run_ticks(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Tick until `generations` more generations have been bred
    pub fn run_generations(&mut self, generations: u64) -> Result<()> {
        let target = self.generation + generations;
        while self.generation < target {
            self.tick()?;
        }
        Ok(())
    }

    fn start_replay(&mut self) {
        let best_size = self.config.population.best_size;
        self.replay = rank(&self.agents)
            .into_iter()
            .take(best_size)
            .map(|i| Snake::new(self.agents[i].brain.copy(), &self.arena, &self.config.arena))
            .collect();
        self.phase = Phase::ReplayBest;

        log::debug!(
            "Generation {} finished, replaying best {}",
            self.generation,
            self.replay.len()
        );
    }

    /// Replace the population with the next generation.
    ///
    /// Elites come first in ranking order; every other child is a crossover
    /// of two tournament winners, then mutated.
    pub fn breed(&mut self) -> Result<()> {
        let ranking = rank(&self.agents);
        self.record_generation(&ranking);

        let pop = &self.config.population;
        let rate = self.config.evolution.mutation_rate;
        let mut next = Vec::with_capacity(pop.size);

        for &i in ranking.iter().take(pop.elitism_size) {
            next.push(Snake::new(self.agents[i].brain.copy(), &self.arena, &self.config.arena));
        }

        while next.len() < pop.size {
            let a = tournament(&self.agents, pop.tournament_size, &mut self.rng);
            let b = tournament(&self.agents, pop.tournament_size, &mut self.rng);

            let mut child = self.agents[a].brain.crossover(&self.agents[b].brain, &mut self.rng)?;
            child.mutate(rate, &mut self.rng)?;
            next.push(Snake::new(child, &self.arena, &self.config.arena));
        }

        self.agents = next;
        self.replay.clear();
        self.generation += 1;
        self.tick_in_generation = 0;
        self.phase = Phase::Stepping;

        Ok(())
    }

    fn record_generation(&mut self, ranking: &[usize]) {
        let Some(&best) = ranking.first() else {
            return;
        };

        let mut stats =
            GenerationStats::collect(self.generation, &self.agents, best, self.tick_in_generation);
        self.best_score_ever = self.best_score_ever.max(stats.best_score);
        stats.best_score_ever = self.best_score_ever;

        let top = &self.agents[best];
        self.champion = Some(GenomeSnapshot::capture(
            top.brain.network(),
            self.generation,
            Some(top.fitness),
        ));

        if self.generation % self.config.logging.stats_interval == 0 {
            log::info!("{}", stats.summary());
        }
        self.history.record(stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvoError;
    use crate::grid::{Heading, MoveOutcome, Position, Target};
    use crate::snake::Body;

    fn small_config(size: usize, tournament: usize, elitism: usize, rate: f32) -> Config {
        let mut config = Config::default();
        config.population.size = size;
        config.population.tournament_size = tournament;
        config.population.elitism_size = elitism;
        config.evolution.mutation_rate = rate;
        config
    }

    fn kill_all_with_fitness(pop: &mut Population, fitness: &[f32]) {
        for (agent, &f) in pop.agents_mut().iter_mut().zip(fitness) {
            agent.alive = false;
            agent.fitness = f;
        }
    }

    #[test]
    fn test_construction_validates() {
        assert!(Population::new(small_config(4, 5, 1, 0.0), 1).is_err());
        assert!(Population::new(small_config(4, 2, 5, 0.0), 1).is_err());
        assert!(Population::new(small_config(4, 2, 1, 2.0), 1).is_err());
        assert!(Population::new(small_config(0, 0, 0, 0.0), 1).is_err());

        let pop = Population::new(small_config(4, 2, 1, 0.0), 1).unwrap();
        assert_eq!(pop.generation(), 1);
        assert_eq!(pop.phase(), Phase::Stepping);
        assert_eq!(pop.agents().len(), 4);
    }

    #[test]
    fn test_rank_is_stable() {
        let mut pop = Population::new(small_config(5, 2, 0, 0.0), 2).unwrap();
        kill_all_with_fitness(&mut pop, &[2.0, 5.0, 2.0, 5.0, 1.0]);
        assert_eq!(rank(pop.agents()), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_full_tournament_returns_best() {
        let mut pop = Population::new(small_config(6, 6, 0, 0.0), 3).unwrap();
        kill_all_with_fitness(&mut pop, &[1.0, 9.0, 3.0, 9.5, 0.0, 2.0]);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..20 {
            assert_eq!(tournament(pop.agents(), 6, &mut rng), 3);
        }
    }

    #[test]
    fn test_single_tournament_is_uniform_draw() {
        let mut pop = Population::new(small_config(4, 1, 0, 0.0), 4).unwrap();
        kill_all_with_fitness(&mut pop, &[1.0, 2.0, 3.0, 4.0]);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[tournament(pop.agents(), 1, &mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_end_to_end_generation() {
        let mut pop = Population::new(small_config(4, 2, 1, 0.0), 5).unwrap();
        let parents: Vec<Vec<f32>> = pop.agents().iter().map(|a| a.brain.network().values()).collect();

        kill_all_with_fitness(&mut pop, &[3.0, 1.0, 4.0, 2.0]);
        pop.tick().unwrap();

        assert_eq!(pop.generation(), 2);
        assert_eq!(pop.agents().len(), 4);

        // Elite: index 2, identical genome, fresh agent
        let elite = &pop.agents()[0];
        assert_eq!(elite.brain.network().values(), parents[2]);
        assert_eq!(elite.score, 0);
        assert_eq!(elite.body.head(), pop.arena().center());
        assert!(elite.is_alive());

        // Children: with rate 0 every value comes from one of the parents
        for child in &pop.agents()[1..] {
            for (k, v) in child.brain.network().values().iter().enumerate() {
                assert!(parents.iter().any(|p| p[k] == *v), "value {} not inherited", k);
            }
        }

        let stats = pop.history().last().unwrap();
        assert_eq!(stats.generation, 1);
        assert_eq!(stats.best_fitness, 4.0);
        assert_eq!(pop.champion().unwrap().values, parents[2]);
    }

    #[test]
    fn test_elites_keep_order_and_genomes() {
        let mut pop = Population::new(small_config(6, 3, 3, 0.5), 6).unwrap();
        let parents: Vec<Vec<f32>> = pop.agents().iter().map(|a| a.brain.network().values()).collect();

        kill_all_with_fitness(&mut pop, &[10.0, 60.0, 30.0, 50.0, 20.0, 40.0]);
        pop.breed().unwrap();

        for (slot, &source) in [1usize, 3, 5].iter().enumerate() {
            let elite = &pop.agents()[slot];
            assert_eq!(elite.brain.network().values(), parents[source]);
            assert_eq!(elite.fitness, 0.0);
            assert!(elite.brain.network().feedback().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_show_best_replays_before_breeding() {
        let mut config = small_config(4, 2, 1, 0.0);
        config.population.show_best = true;
        config.population.best_size = 2;
        let mut pop = Population::new(config, 7).unwrap();
        let parents: Vec<Vec<f32>> = pop.agents().iter().map(|a| a.brain.network().values()).collect();

        kill_all_with_fitness(&mut pop, &[3.0, 1.0, 4.0, 2.0]);
        pop.tick().unwrap();

        assert_eq!(pop.phase(), Phase::ReplayBest);
        assert_eq!(pop.generation(), 1);
        assert_eq!(pop.replay().len(), 2);
        assert_eq!(pop.replay()[0].brain.network().values(), parents[2]);
        assert_eq!(pop.replay()[1].brain.network().values(), parents[0]);
        assert!(pop.replay().iter().all(|s| s.is_alive() && s.score == 0));

        // Replay must not disturb the ranking of the finished generation
        let mut guard = 0;
        while pop.phase() == Phase::ReplayBest {
            pop.tick().unwrap();
            guard += 1;
            assert!(guard < 10_000, "replay never ended");
        }

        assert_eq!(pop.generation(), 2);
        assert!(pop.replay().is_empty());
        assert_eq!(pop.agents()[0].brain.network().values(), parents[2]);
    }

    #[test]
    fn test_bulk_matches_paced() {
        let config = small_config(20, 3, 2, 0.05);
        let mut bulk = Population::new(config.clone(), 42).unwrap();
        let mut paced = Population::new(config, 42).unwrap();

        bulk.run_generations(3).unwrap();
        while paced.generation() < 4 {
            paced.tick().unwrap();
        }

        assert_eq!(bulk.generation(), paced.generation());
        assert_eq!(bulk.history(), paced.history());
        for (a, b) in bulk.agents().iter().zip(paced.agents()) {
            assert_eq!(a.brain.network().values(), b.brain.network().values());
        }
    }

    #[test]
    fn test_run_ticks_counts_ticks() {
        let mut pop = Population::new(small_config(10, 2, 1, 0.01), 9).unwrap();
        pop.run_ticks(3).unwrap();
        assert!(pop.generation() > 1 || pop.tick_in_generation() == 3);
    }

    #[test]
    fn test_best_score_ever_is_monotonic() {
        let mut pop = Population::new(small_config(30, 5, 2, 0.02), 10).unwrap();
        let mut last = 0;
        for _ in 0..4 {
            pop.run_generations(1).unwrap();
            assert!(pop.best_score_ever() >= last);
            last = pop.best_score_ever();
        }
        assert_eq!(pop.history().len(), 4);
    }

    /// Movement that always kills, for driving the loop without the grid
    struct Wall;

    impl Movement for Wall {
        fn advance(&mut self, _: &mut Body, _: &mut Target, _: Heading) -> MoveOutcome {
            MoveOutcome::default()
        }
    }

    #[test]
    fn test_custom_movement() {
        let mut pop = Population::with_movement(small_config(4, 2, 1, 0.0), 11, Wall).unwrap();
        pop.tick().unwrap();

        // Everyone died on the first tick, so breeding already happened
        assert_eq!(pop.generation(), 2);
        let stats = pop.history().last().unwrap();
        assert_eq!(stats.ticks, 1);
        assert_eq!(stats.best_fitness, 0.0);
        assert!(pop.agents().iter().all(|a| a.body.head() == Position::new(5, 5)));
    }

    /// Movement that never kills and never feeds
    struct Open;

    impl Movement for Open {
        fn advance(&mut self, _: &mut Body, _: &mut Target, _: Heading) -> MoveOutcome {
            MoveOutcome {
                alive: true,
                ate_target: false,
            }
        }
    }

    #[test]
    fn test_starvation_ends_generation_without_collisions() {
        let mut config = small_config(4, 2, 1, 0.0);
        config.arena.max_idle_ticks = 5;
        let mut pop = Population::with_movement(config.clone(), 12, Open).unwrap();

        pop.run_generations(1).unwrap();

        assert_eq!(pop.generation(), 2);
        let stats = pop.history().last().unwrap();
        assert_eq!(stats.ticks, 5);
        assert_eq!(stats.best_fitness, 5.0);

        config.arena.max_idle_ticks = 0;
        assert!(matches!(
            Population::with_movement(config, 12, Open),
            Err(EvoError::Configuration(_))
        ));
    }
}
