use std::collections::VecDeque;

use crate::config::Stage;
use crate::food::Food;
use crate::geometry::{Vec2, snap_to_grid};
use crate::input::Direction;

/// Result of one movement step.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StepOutcome {
    /// The head advanced to the contained position.
    Moved(Vec2),
    /// The attempted head position left the stage; the body was not touched.
    HitWall(Vec2),
}

/// Mutable snake state: segment body, committed heading, and growth memory.
///
/// The body is ordered head to tail with the head at the front. Every
/// segment is one grid cell of `cell` pixels.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Vec2>,
    direction: Direction,
    dropped_tail: Option<Vec2>,
    cell: i32,
}

impl Snake {
    /// Creates a snake anchored at `(x, y)` snapped onto the grid.
    ///
    /// Segments are laid out contiguously along positive X from the anchor,
    /// appended tail-first so index 0 is the head. The committed direction
    /// starts as `Left` regardless of the layout; the snake moves away from
    /// its own body on the first tick.
    #[must_use]
    pub fn new(x: f64, y: f64, segment_count: usize, cell: i32) -> Self {
        let anchor = Vec2 {
            x: snap_to_grid(x, cell),
            y: snap_to_grid(y, cell),
        };

        let mut body = VecDeque::with_capacity(segment_count.max(1));
        for i in 0..segment_count.max(1) {
            body.push_back(Vec2 {
                x: anchor.x + cell * i as i32,
                y: anchor.y,
            });
        }

        Self {
            body,
            direction: Direction::Left,
            dropped_tail: None,
            cell,
        }
    }

    /// Creates a snake from explicit segments (front is head), for tests.
    #[must_use]
    pub fn from_segments(segments: Vec<Vec2>, direction: Direction, cell: i32) -> Self {
        Self {
            body: VecDeque::from(segments),
            direction,
            dropped_tail: None,
            cell,
        }
    }

    /// Applies one movement step toward `requested`.
    ///
    /// A request that reverses the committed direction is silently ignored
    /// and the snake continues on its committed heading. The wall check runs
    /// against the attempted head position before anything is mutated: on a
    /// hit the body and committed direction are left exactly as they were.
    pub fn advance(&mut self, requested: Direction, stage: &Stage) -> StepOutcome {
        let reversal = requested == self.direction.opposite();
        let effective = if reversal { self.direction } else { requested };

        let next_head = self.head().stepped(effective, self.cell);
        if !stage.contains(next_head, self.cell) {
            return StepOutcome::HitWall(next_head);
        }

        self.body.push_front(next_head);
        self.dropped_tail = self.body.pop_back();

        if !reversal {
            self.direction = effective;
        }

        StepOutcome::Moved(next_head)
    }

    /// Returns true when the head sits exactly on the food cell.
    ///
    /// Equality is exact grid-cell equality, not bounding-box overlap. On a
    /// hit the tail position removed by the latest `advance` is re-inserted,
    /// growing the snake by one segment.
    pub fn ate(&mut self, food: &Food) -> bool {
        if self.head() != food.position {
            return false;
        }

        if let Some(tail) = self.dropped_tail.take() {
            self.body.push_back(tail);
        }
        true
    }

    /// Returns true if the head overlaps any non-head segment.
    #[must_use]
    pub fn self_collided(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|segment| *segment == head)
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Vec2 {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Vec2) -> bool {
        self.body.contains(&position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments. Never true for a live snake.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the last committed movement direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Segment size in pixels.
    #[must_use]
    pub fn cell(&self) -> i32 {
        self.cell
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Vec2> {
        self.body.iter()
    }
}
