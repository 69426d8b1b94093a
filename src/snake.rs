//! Snake agents: body geometry, per-tick stepping and fitness.

use crate::brain::Brain;
use crate::config::ArenaConfig;
use crate::error::Result;
use crate::grid::{Arena, Heading, MoveOutcome, Movement, Position, Target};
use crate::sensor;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Occupied cells, head first
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    cells: VecDeque<Position>,
}

impl Body {
    /// Straight body of `length` cells with the head on the arena centre,
    /// trailing west
    pub fn spawn(arena: &Arena, length: usize) -> Self {
        let head = arena.center();
        let cells = (0..length.max(1) as i32)
            .map(|i| head.offset(-i, 0))
            .collect();
        Self { cells }
    }

    /// Body from explicit cells, head first. Panics on an empty list.
    pub fn from_cells(cells: Vec<Position>) -> Self {
        assert!(!cells.is_empty(), "a body needs at least a head");
        Self {
            cells: cells.into(),
        }
    }

    #[inline]
    pub fn head(&self) -> Position {
        self.cells[0]
    }

    /// Segment right behind the head
    #[inline]
    pub fn neck(&self) -> Option<Position> {
        self.cells.get(1).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &VecDeque<Position> {
        &self.cells
    }

    /// Any cell, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    /// Any cell behind the head
    pub fn tail_occupies(&self, pos: Position) -> bool {
        self.cells.iter().skip(1).any(|&cell| cell == pos)
    }

    /// Head overlaps its own tail
    pub fn hits_self(&self) -> bool {
        self.tail_occupies(self.head())
    }

    /// Advance one cell along `heading`; returns the vacated tail cell
    pub fn shift(&mut self, heading: Heading) -> Position {
        let next = self.head().step(heading);
        self.cells.push_front(next);
        // Length is at least 2 here, so there is always a tail to drop
        self.cells.pop_back().unwrap_or(next)
    }

    /// Re-attach a segment at the tail
    pub fn grow(&mut self, cell: Position) {
        self.cells.push_back(cell);
    }
}

/// Fitness: survival time plus a food bonus growing with the square of the score.
/// One more meal always outweighs any amount of extra survival under the idle limit.
pub fn fitness(score: u32, ticks_alive: u64) -> f32 {
    ticks_alive as f32 + 100.0 * (score as f32).powi(2)
}

/// A snake in the simulation
#[derive(Debug)]
pub struct Snake {
    pub body: Body,
    pub heading: Heading,
    pub alive: bool,
    /// Targets consumed
    pub score: u32,
    /// Selection key, see [`fitness`]
    pub fitness: f32,
    pub ticks_alive: u64,
    pub ticks_since_meal: u64,
    pub target: Target,
    pub brain: Brain,
}

impl Snake {
    /// Place a fresh snake at the arena centre, heading east
    pub fn new(brain: Brain, arena: &Arena, config: &ArenaConfig) -> Self {
        let body = Body::spawn(arena, config.initial_length);
        let target = Target::new(config.target_seed, arena, &body);
        let mut brain = brain;
        brain.reset();

        Self {
            body,
            heading: Heading::East,
            alive: true,
            score: 0,
            fitness: 0.0,
            ticks_alive: 0,
            ticks_since_meal: 0,
            target,
            brain,
        }
    }

    /// Sense, decide, move, and book-keep one tick.
    ///
    /// Dead snakes are left untouched. A snake starves once it has gone
    /// `max_idle_ticks` ticks without eating.
    pub fn tick<M: Movement>(
        &mut self,
        arena: &Arena,
        movement: &mut M,
        max_idle_ticks: u64,
    ) -> Result<MoveOutcome> {
        if !self.alive {
            return Ok(MoveOutcome::default());
        }

        let sensors = sensor::look(&self.body, self.target.position(), arena);
        let action = self.brain.decide(&sensors)?;
        self.heading =
            self.brain
                .resolve_heading(self.heading, action, self.body.head(), self.body.neck());

        let mut outcome = movement.advance(&mut self.body, &mut self.target, self.heading);
        self.brain.end_tick();

        if outcome.ate_target {
            self.score += 1;
            self.ticks_since_meal = 0;
        } else {
            self.ticks_since_meal += 1;
        }

        if outcome.alive {
            self.ticks_alive += 1;
            if self.ticks_since_meal >= max_idle_ticks {
                outcome.alive = false;
            }
        }

        self.alive = outcome.alive;
        self.fitness = fitness(self.score, self.ticks_alive);
        Ok(outcome)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }
}
