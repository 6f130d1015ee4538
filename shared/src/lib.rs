use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod wire;

pub const GRID_WIDTH: i32 = 50;
pub const GRID_HEIGHT: i32 = 50;
pub const DEFAULT_PORT: u16 = 2000;
pub const DEFAULT_TARGET: &str = "127.0.0.1";
pub const TICK_INTERVAL_MS: u64 = 100;

/// Maximum number of coordinates a single wire record can carry.
pub const BODY_CAPACITY: usize = 100;

/// Peer identifier assigned during the handshake. The host takes id 1 and
/// hands out 2, 3, … to clients; 0 is reserved for "link id unknown".
pub type PlayerId = i32;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring cell one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Movement heading. The grid origin is the top-left corner, so `Up`
/// decrements y and `Down` increments it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A body snapshot bounded by the wire capacity.
///
/// Construction is the only place the bound is checked, so any
/// `BoundedBody` that exists holds at most [`BODY_CAPACITY`] cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundedBody {
    cells: Vec<Coord>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("body of {0} cells exceeds wire capacity of {BODY_CAPACITY}")]
pub struct CapacityError(pub usize);

impl BoundedBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: &[Coord]) -> Result<Self, CapacityError> {
        if cells.len() > BODY_CAPACITY {
            return Err(CapacityError(cells.len()));
        }
        Ok(Self {
            cells: cells.to_vec(),
        })
    }

    /// Keeps the head-most [`BODY_CAPACITY`] cells and drops the rest.
    /// Used on the send path when a local body outgrows the record format.
    pub fn truncated(cells: &[Coord]) -> Self {
        let keep = cells.len().min(BODY_CAPACITY);
        Self {
            cells: cells[..keep].to_vec(),
        }
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// One protocol message. Every variant serializes to the same fixed-size
/// record (see [`wire`]); `player` is always the id of the sending peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Empty record; ignored on receipt.
    None,
    /// A peer's full body, head first.
    BodyUpdate {
        player: PlayerId,
        body: BoundedBody,
    },
    /// "My head just reached the food." Clients send this to the host.
    FoodPickup { player: PlayerId },
    /// Authoritative food location, issued by the host.
    FoodAssign { player: PlayerId, cell: Coord },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_follows_direction_offsets() {
        let c = Coord::new(23, 23);
        assert_eq!(c.step(Direction::Up), Coord::new(23, 22));
        assert_eq!(c.step(Direction::Down), Coord::new(23, 24));
        assert_eq!(c.step(Direction::Left), Coord::new(22, 23));
        assert_eq!(c.step(Direction::Right), Coord::new(24, 23));
    }

    #[test]
    fn test_opposite_is_involutive() {
        for d in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            assert_ne!(d.opposite(), d);
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn test_bounded_body_accepts_up_to_capacity() {
        let cells: Vec<Coord> = (0..BODY_CAPACITY as i32)
            .map(|i| Coord::new(i, 0))
            .collect();
        let body = BoundedBody::from_cells(&cells).unwrap();
        assert_eq!(body.len(), BODY_CAPACITY);
        assert_eq!(body.cells(), cells.as_slice());
    }

    #[test]
    fn test_bounded_body_rejects_over_capacity() {
        let cells: Vec<Coord> = (0..BODY_CAPACITY as i32 + 1)
            .map(|i| Coord::new(i, 0))
            .collect();
        let err = BoundedBody::from_cells(&cells).unwrap_err();
        assert_eq!(err, CapacityError(BODY_CAPACITY + 1));
    }

    #[test]
    fn test_truncated_keeps_head_cells() {
        let cells: Vec<Coord> = (0..150).map(|i| Coord::new(i, 1)).collect();
        let body = BoundedBody::truncated(&cells);
        assert_eq!(body.len(), BODY_CAPACITY);
        assert_eq!(body.cells()[0], Coord::new(0, 1));
        assert_eq!(body.cells()[BODY_CAPACITY - 1], Coord::new(99, 1));
    }

    #[test]
    fn test_truncated_of_short_body_is_identity() {
        let cells = vec![Coord::new(5, 6), Coord::new(5, 7)];
        assert_eq!(BoundedBody::truncated(&cells).cells(), cells.as_slice());
    }
}
