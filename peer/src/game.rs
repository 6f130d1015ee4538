//! The authoritative local simulation: one owned snake, the shared food
//! item, and the last reported remote bodies.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Coord, Direction, Packet, PlayerId};
use std::collections::{HashMap, HashSet};

use crate::food;
use crate::grid;
use crate::snake::{AdvanceResult, SnakeEntity};

/// Where the local snake first appears.
pub const INITIAL_SNAKE_CELL: Coord = Coord::new(23, 23);
pub const INITIAL_DIRECTION: Direction = Direction::Up;

/// What a single tick did, for the session to publish.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Local body after the tick, head first.
    pub body: Vec<Coord>,
    pub ate_food: bool,
    pub respawned: bool,
}

/// A peer's snake as last reported over the wire. Only the receive path
/// writes these records; the render path gets copies.
#[derive(Debug, Clone)]
pub struct RemotePlayer {
    pub id: PlayerId,
    pub body: Vec<Coord>,
}

/// Positions to draw this frame, taken after all tick mutations settle.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub local: Vec<Coord>,
    pub remote: Vec<Vec<Coord>>,
    pub food: Coord,
}

pub struct Simulation {
    local: SnakeEntity,
    food: Coord,
    remotes: HashMap<PlayerId, RemotePlayer>,
    rng: StdRng,
}

impl Simulation {
    pub fn new(player: PlayerId) -> Self {
        Self::with_rng(player, StdRng::from_entropy())
    }

    /// Seedable constructor so placement decisions can be pinned in tests.
    pub fn with_rng(player: PlayerId, rng: StdRng) -> Self {
        Self {
            local: SnakeEntity::new(player, INITIAL_SNAKE_CELL, INITIAL_DIRECTION),
            food: food::initial_cell(),
            remotes: HashMap::new(),
            rng,
        }
    }

    pub fn local_player(&self) -> PlayerId {
        self.local.id()
    }

    pub fn food(&self) -> Coord {
        self.food
    }

    pub fn local_body(&self) -> Vec<Coord> {
        self.local.cells()
    }

    pub fn remote_body(&self, player: PlayerId) -> Option<&[Coord]> {
        self.remotes.get(&player).map(|record| record.body.as_slice())
    }

    /// Advances the local snake exactly one tick. `None` input keeps the
    /// previous heading. Collisions and wall hits respawn the snake to a
    /// single segment at a fresh in-bounds cell away from the food.
    pub fn tick(&mut self, input: Option<Direction>) -> TickReport {
        if let Some(direction) = input {
            self.local.set_direction(direction);
        }

        let mut ate_food = false;
        let mut respawned = false;

        match self.local.advance() {
            AdvanceResult::Moved => {
                if self.local.head() == self.food {
                    self.local.mark_growing();
                    self.relocate_food();
                    ate_food = true;
                }
            }
            AdvanceResult::SelfCollision | AdvanceResult::OutOfBounds => {
                self.respawn_local();
                respawned = true;
            }
        }

        TickReport {
            body: self.local.cells(),
            ate_food,
            respawned,
        }
    }

    /// Folds one received packet into local state.
    pub fn apply_remote(&mut self, packet: &Packet) {
        match packet {
            Packet::None => {}
            Packet::BodyUpdate { player, body } => {
                if *player == self.local.id() {
                    debug!("Ignoring echoed body update for player {}", player);
                    return;
                }
                if body.is_empty() {
                    debug!("Dropping empty body update for player {}", player);
                    return;
                }
                let record = self.remotes.entry(*player).or_insert_with(|| RemotePlayer {
                    id: *player,
                    body: Vec::new(),
                });
                record.body = body.cells().to_vec();
            }
            Packet::FoodPickup { player } => {
                debug!("Player {} reports a food pickup", player);
                self.relocate_food();
            }
            Packet::FoodAssign { cell, .. } => {
                if grid::contains(*cell) {
                    self.food = *cell;
                } else {
                    warn!(
                        "Ignoring food assignment outside the grid: ({}, {})",
                        cell.x, cell.y
                    );
                }
            }
        }
    }

    /// Immutable position copy for the renderer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            local: self.local.cells(),
            remote: self.remotes.values().map(|record| record.body.clone()).collect(),
            food: self.food,
        }
    }

    fn relocate_food(&mut self) {
        let mut occupied = self.occupied_cells();
        // The food never reappears in the cell it was just taken from.
        occupied.insert(self.food);
        self.food = food::respawn(&mut self.rng, &occupied);
        debug!("Food moved to ({}, {})", self.food.x, self.food.y);
    }

    fn respawn_local(&mut self) {
        let mut blocked = HashSet::new();
        blocked.insert(self.food);
        let cell = grid::random_free_cell(&mut self.rng, &blocked);
        self.local.respawn_at(cell);
        debug!(
            "Player {} respawned at ({}, {})",
            self.local.id(),
            cell.x,
            cell.y
        );
    }

    fn occupied_cells(&self) -> HashSet<Coord> {
        let mut cells: HashSet<Coord> = self.local.cells().into_iter().collect();
        for record in self.remotes.values() {
            cells.extend(record.body.iter().copied());
        }
        cells
    }
}
