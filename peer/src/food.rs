//! Food placement policy.
//!
//! Exactly one food item exists per session. It starts at a fixed cell and
//! is relocated whenever some snake's head reaches it; relocation avoids
//! every known body so the new item is not eaten the instant it appears.

use rand::Rng;
use shared::Coord;
use std::collections::HashSet;

use crate::grid;

/// Where the food sits when a session starts.
pub const INITIAL_FOOD_CELL: Coord = Coord::new(23, 20);

pub fn initial_cell() -> Coord {
    INITIAL_FOOD_CELL
}

/// Picks a fresh food cell outside every occupied coordinate. Placement
/// never blocks; a pathologically full grid degrades to best effort.
pub fn respawn<R: Rng>(rng: &mut R, occupied: &HashSet<Coord>) -> Coord {
    grid::random_free_cell(rng, occupied)
}
