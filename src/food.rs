use rand::Rng;

use crate::config::Stage;
use crate::geometry::{Vec2, snap_to_grid};
use crate::snake::Snake;

/// Attempts at uniform rejection sampling before scanning for free cells.
const MAX_SAMPLE_ATTEMPTS: u32 = 128;

/// The single food entity active on the stage.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Food {
    pub position: Vec2,
}

impl Food {
    /// Creates food at an explicit position.
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self { position }
    }

    /// Spawns food on a grid-aligned cell not occupied by the snake.
    ///
    /// Returns `None` only when the snake covers every cell of the stage.
    #[must_use]
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, stage: &Stage, snake: &Snake) -> Option<Self> {
        spawn_position(rng, stage, snake).map(Self::at)
    }
}

/// Picks a free grid-aligned position inside the stage.
///
/// Each axis is sampled independently and uniformly over the valid pixel
/// range, snapped onto the grid, and clamped so a square of `cell` pixels
/// stays inside the bounds even when the sample lands exactly on the edge
/// multiple. Occupied cells are rejected; when sampling keeps colliding on a
/// dense board, the remaining free cells are enumerated instead.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    stage: &Stage,
    snake: &Snake,
) -> Option<Vec2> {
    let cell = stage.cell();
    let x_limit = stage.width() - cell;
    let y_limit = stage.height() - cell;

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let position = Vec2 {
            x: sample_axis(rng, x_limit, cell),
            y: sample_axis(rng, y_limit, cell),
        };

        if !snake.occupies(position) {
            return Some(position);
        }
    }

    let mut candidates = Vec::new();
    for y in 0..stage.rows() {
        for x in 0..stage.cols() {
            let position = Vec2 {
                x: x * cell,
                y: y * cell,
            };
            if !snake.occupies(position) {
                candidates.push(position);
            }
        }
    }

    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, limit: i32, cell: i32) -> i32 {
    let raw = rng.gen_range(0.0..=f64::from(limit));
    snap_to_grid(raw, cell).min(limit)
}
