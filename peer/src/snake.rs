//! A single snake's body, heading, and growth state.

use shared::{Coord, Direction, PlayerId};
use std::collections::VecDeque;

use crate::grid;

/// Outcome of advancing the head by one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceResult {
    Moved,
    SelfCollision,
    OutOfBounds,
}

/// The locally simulated snake. The body always holds at least one cell,
/// head at the front, in movement order.
pub struct SnakeEntity {
    id: PlayerId,
    body: VecDeque<Coord>,
    direction: Direction,
    growing: bool,
}

impl SnakeEntity {
    pub fn new(id: PlayerId, start: Coord, direction: Direction) -> Self {
        let mut body = VecDeque::new();
        body.push_back(start);
        Self {
            id,
            body,
            direction,
            growing: false,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn head(&self) -> Coord {
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body cells head first, for snapshots and broadcasts.
    pub fn cells(&self) -> Vec<Coord> {
        self.body.iter().copied().collect()
    }

    /// Points the snake for the next `advance`. A direct reversal is
    /// ignored while the body is longer than one cell, since the head would
    /// step straight onto its own neck. Idempotent between advances.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.body.len() > 1 && direction == self.direction.opposite() {
            return;
        }
        self.direction = direction;
    }

    /// Arms the one-tick growth flag; the next `advance` keeps the tail.
    pub fn mark_growing(&mut self) {
        self.growing = true;
    }

    /// Moves the head one cell along the current direction.
    ///
    /// On `SelfCollision` or `OutOfBounds` the body is left untouched; the
    /// caller decides where to respawn.
    pub fn advance(&mut self) -> AdvanceResult {
        let next = self.head().step(self.direction);
        if !grid::contains(next) {
            return AdvanceResult::OutOfBounds;
        }
        // The whole pre-move body blocks the head, tail included.
        if self.body.iter().any(|&cell| cell == next) {
            return AdvanceResult::SelfCollision;
        }

        self.body.push_front(next);
        if self.growing {
            self.growing = false;
        } else {
            self.body.pop_back();
        }
        AdvanceResult::Moved
    }

    /// Full reset to a single segment at `cell`, dropping pending growth.
    pub fn respawn_at(&mut self, cell: Coord) {
        self.body.clear();
        self.body.push_back(cell);
        self.growing = false;
    }
}
