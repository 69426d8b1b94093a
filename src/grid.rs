//! Arena geometry, headings, the forage target and the movement rules.

use crate::snake::Body;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A grid cell. Signed so rays and moves can step past the border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The neighbouring cell along `heading`
    #[inline]
    pub fn step(self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        self.offset(dx, dy)
    }
}

/// Direction of travel. North is towards y = 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Heading::North => (0, -1),
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Square arena of `tile_count` x `tile_count` cells
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena {
    tile_count: usize,
}

impl Arena {
    pub fn new(tile_count: usize) -> Self {
        Self { tile_count }
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.tile_count * self.tile_count
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        let n = self.tile_count as i32;
        pos.x >= 0 && pos.y >= 0 && pos.x < n && pos.y < n
    }

    /// Spawn cell of every new snake head
    #[inline]
    pub fn center(&self) -> Position {
        let half = (self.tile_count / 2) as i32;
        Position::new(half, half)
    }
}

/// The forage target of one snake, with its own seeded placement stream.
///
/// Every snake seeded alike sees the same sequence of target cells, so
/// agents of one generation are scored on the same course.
#[derive(Clone, Debug)]
pub struct Target {
    position: Option<Position>,
    rng: ChaCha8Rng,
}

impl Target {
    /// Place the first target on a cell not covered by `body`
    pub fn new(seed: u64, arena: &Arena, body: &Body) -> Self {
        let mut target = Self {
            position: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        target.relocate(arena, body);
        target
    }

    /// Current cell; `None` once the body covers the whole arena
    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Move to a uniformly drawn free cell
    pub fn relocate(&mut self, arena: &Arena, body: &Body) -> Option<Position> {
        let n = arena.tile_count() as i32;
        let free: Vec<Position> = (0..n)
            .flat_map(|y| (0..n).map(move |x| Position::new(x, y)))
            .filter(|&cell| !body.occupies(cell))
            .collect();

        self.position = if free.is_empty() {
            None
        } else {
            Some(free[self.rng.gen_range(0..free.len())])
        };
        self.position
    }
}

/// What the movement rules report back for one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub alive: bool,
    pub ate_target: bool,
}

/// Applies a resolved heading to a snake body.
///
/// The population drives every agent through this trait, so hosts can swap
/// in their own world rules without touching selection or breeding.
pub trait Movement {
    fn advance(&mut self, body: &mut Body, target: &mut Target, heading: Heading) -> MoveOutcome;
}

/// Classic snake rules on a walled square arena
#[derive(Clone, Copy, Debug)]
pub struct GridMovement {
    arena: Arena,
}

impl GridMovement {
    pub fn new(arena: Arena) -> Self {
        Self { arena }
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}

impl Movement for GridMovement {
    fn advance(&mut self, body: &mut Body, target: &mut Target, heading: Heading) -> MoveOutcome {
        let previous = body.clone();
        let vacated = body.shift(heading);
        let head = body.head();

        if !self.arena.contains(head) || body.hits_self() {
            *body = previous;
            return MoveOutcome {
                alive: false,
                ate_target: false,
            };
        }

        if target.position() != Some(head) {
            return MoveOutcome {
                alive: true,
                ate_target: false,
            };
        }

        body.grow(vacated);
        // A full board leaves nowhere to forage; the run is over
        let alive = target.relocate(&self.arena, body).is_some();
        MoveOutcome {
            alive,
            ate_target: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_bounds() {
        let arena = Arena::new(10);
        assert!(arena.contains(Position::new(0, 0)));
        assert!(arena.contains(Position::new(9, 9)));
        assert!(!arena.contains(Position::new(10, 3)));
        assert!(!arena.contains(Position::new(-1, 3)));
        assert_eq!(arena.center(), Position::new(5, 5));
    }

    #[test]
    fn test_heading_steps() {
        let p = Position::new(5, 5);
        assert_eq!(p.step(Heading::North), Position::new(5, 4));
        assert_eq!(p.step(Heading::East), Position::new(6, 5));
        assert_eq!(p.step(Heading::South), Position::new(5, 6));
        assert_eq!(p.step(Heading::West), Position::new(4, 5));
    }

    #[test]
    fn test_target_avoids_body_and_is_reproducible() {
        let arena = Arena::new(10);
        let body = Body::spawn(&arena, 3);
        let a = Target::new(123, &arena, &body);
        let b = Target::new(123, &arena, &body);

        let pos = a.position().unwrap();
        assert_eq!(Some(pos), b.position());
        assert!(arena.contains(pos));
        assert!(!body.occupies(pos));
    }

    #[test]
    fn test_move_into_wall_restores_body() {
        let arena = Arena::new(4);
        let mut movement = GridMovement::new(arena);
        let mut body = Body::from_cells(vec![Position::new(3, 1), Position::new(2, 1)]);
        let mut target = Target::new(1, &arena, &body);
        let before = body.clone();

        let outcome = movement.advance(&mut body, &mut target, Heading::East);

        assert!(!outcome.alive);
        assert_eq!(body, before);
    }

    #[test]
    fn test_move_into_self_kills() {
        let arena = Arena::new(10);
        let mut movement = GridMovement::new(arena);
        // Head at (5,5), body curls so moving south lands on (5,6)
        let mut body = Body::from_cells(vec![
            Position::new(5, 5),
            Position::new(6, 5),
            Position::new(6, 6),
            Position::new(5, 6),
            Position::new(4, 6),
        ]);
        let mut target = Target::new(1, &arena, &body);

        let outcome = movement.advance(&mut body, &mut target, Heading::South);
        assert!(!outcome.alive);
    }

    #[test]
    fn test_eating_grows_and_relocates() {
        let arena = Arena::new(10);
        let mut movement = GridMovement::new(arena);
        let mut body = Body::spawn(&arena, 3);
        let mut target = Target::new(9, &arena, &body);
        target.position = Some(Position::new(6, 5));

        let outcome = movement.advance(&mut body, &mut target, Heading::East);

        assert_eq!(
            outcome,
            MoveOutcome {
                alive: true,
                ate_target: true
            }
        );
        assert_eq!(body.len(), 4);
        assert_eq!(body.head(), Position::new(6, 5));
        // Tail regrows on the cell it just left
        assert_eq!(body.cells().back(), Some(&Position::new(3, 5)));
        let next = target.position().unwrap();
        assert!(!body.occupies(next));
    }

    #[test]
    fn test_full_board_ends_run() {
        let arena = Arena::new(2);
        let mut movement = GridMovement::new(arena);
        let mut body = Body::from_cells(vec![
            Position::new(0, 1),
            Position::new(0, 0),
            Position::new(1, 0),
        ]);
        let mut target = Target::new(5, &arena, &body);
        assert_eq!(target.position(), Some(Position::new(1, 1)));

        let outcome = movement.advance(&mut body, &mut target, Heading::East);

        assert!(outcome.ate_target);
        assert!(!outcome.alive);
        assert_eq!(target.position(), None);
    }
}
