//! Ray-cast perception: what a snake sees along 8 compass directions.
//!
//! Each ray walks outward from the head one cell at a time and stops at the
//! first thing it meets: the wall, the snake's own body, or the target. The
//! hit is encoded as `1 - distance / tile_count`, so closer is stronger, and
//! the two features that were not hit read 0.

use crate::grid::{Arena, Position};
use crate::snake::Body;

/// Ray directions in sensor order: N, NE, E, SE, S, SW, W, NW
pub const RAY_DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Values emitted per ray: body, target, wall
pub const CHANNELS_PER_RAY: usize = 3;

/// Length of the full sensor vector
pub const SENSOR_COUNT: usize = RAY_DIRECTIONS.len() * CHANNELS_PER_RAY;

/// First thing a ray runs into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RayHit {
    Wall(u32),
    Body(u32),
    Target(u32),
}

impl RayHit {
    /// (body, target, wall) channel values
    pub fn encode(self, tile_count: usize) -> [f32; CHANNELS_PER_RAY] {
        let strength = |distance: u32| 1.0 - distance as f32 / tile_count as f32;
        match self {
            RayHit::Body(d) => [strength(d), 0.0, 0.0],
            RayHit::Target(d) => [0.0, strength(d), 0.0],
            RayHit::Wall(d) => [0.0, 0.0, strength(d)],
        }
    }
}

/// Walk from `origin` along `(dx, dy)` until something is hit.
///
/// Checks wall, then body (head excluded), then target at every step. The
/// wall is at most `tile_count` steps away, so the walk always ends.
pub fn cast_ray(
    origin: Position,
    (dx, dy): (i32, i32),
    body: &Body,
    target: Option<Position>,
    arena: &Arena,
) -> RayHit {
    let mut pos = origin;
    let mut distance = 0u32;

    loop {
        distance += 1;
        pos = pos.offset(dx, dy);

        if !arena.contains(pos) {
            return RayHit::Wall(distance);
        }
        if body.tail_occupies(pos) {
            return RayHit::Body(distance);
        }
        if target == Some(pos) {
            return RayHit::Target(distance);
        }
    }
}

/// Full sensor vector for a snake
pub fn look(body: &Body, target: Option<Position>, arena: &Arena) -> [f32; SENSOR_COUNT] {
    let mut out = [0.0f32; SENSOR_COUNT];
    let head = body.head();

    for (i, &direction) in RAY_DIRECTIONS.iter().enumerate() {
        let hit = cast_ray(head, direction, body, target, arena);
        let start = i * CHANNELS_PER_RAY;
        out[start..start + CHANNELS_PER_RAY].copy_from_slice(&hit.encode(arena.tile_count()));
    }

    out
}
