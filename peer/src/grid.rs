//! Grid bounds and cell selection.

use rand::Rng;
use shared::{Coord, GRID_HEIGHT, GRID_WIDTH};
use std::collections::HashSet;

/// Random draws before falling back to a linear scan for a free cell.
const PLACEMENT_ATTEMPTS: usize = 64;

/// True iff `cell` lies inside the play field.
pub fn contains(cell: Coord) -> bool {
    (0..GRID_WIDTH).contains(&cell.x) && (0..GRID_HEIGHT).contains(&cell.y)
}

/// A uniformly chosen in-bounds cell.
pub fn random_cell<R: Rng>(rng: &mut R) -> Coord {
    Coord::new(rng.gen_range(0..GRID_WIDTH), rng.gen_range(0..GRID_HEIGHT))
}

/// A random in-bounds cell outside `occupied`.
///
/// Random placement is tried a bounded number of times, then the grid is
/// scanned for any free cell. A fully occupied grid degrades to a random
/// cell rather than looping forever.
pub fn random_free_cell<R: Rng>(rng: &mut R, occupied: &HashSet<Coord>) -> Coord {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let cell = random_cell(rng);
        if !occupied.contains(&cell) {
            return cell;
        }
    }

    for y in 0..GRID_HEIGHT {
        for x in 0..GRID_WIDTH {
            let cell = Coord::new(x, y);
            if !occupied.contains(&cell) {
                return cell;
            }
        }
    }

    random_cell(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_contains_accepts_interior_and_edges() {
        assert!(contains(Coord::new(0, 0)));
        assert!(contains(Coord::new(23, 23)));
        assert!(contains(Coord::new(GRID_WIDTH - 1, GRID_HEIGHT - 1)));
    }

    #[test]
    fn test_contains_rejects_out_of_bounds() {
        assert!(!contains(Coord::new(-1, 10)));
        assert!(!contains(Coord::new(10, -1)));
        assert!(!contains(Coord::new(GRID_WIDTH, 10)));
        assert!(!contains(Coord::new(10, GRID_HEIGHT)));
    }

    #[test]
    fn test_random_cell_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(contains(random_cell(&mut rng)));
        }
    }

    #[test]
    fn test_random_free_cell_avoids_occupied() {
        let mut rng = StdRng::seed_from_u64(11);
        let occupied: HashSet<Coord> =
            (0..GRID_WIDTH).map(|x| Coord::new(x, 0)).collect();

        for _ in 0..100 {
            let cell = random_free_cell(&mut rng, &occupied);
            assert!(contains(cell));
            assert!(!occupied.contains(&cell));
        }
    }

    #[test]
    fn test_random_free_cell_finds_the_last_free_cell() {
        let mut rng = StdRng::seed_from_u64(3);
        let last = Coord::new(GRID_WIDTH - 1, GRID_HEIGHT - 1);
        let mut occupied = HashSet::new();
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                occupied.insert(Coord::new(x, y));
            }
        }
        occupied.remove(&last);

        assert_eq!(random_free_cell(&mut rng, &occupied), last);
    }

    #[test]
    fn test_random_free_cell_on_full_grid_still_returns_in_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut occupied = HashSet::new();
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                occupied.insert(Coord::new(x, y));
            }
        }

        assert!(contains(random_free_cell(&mut rng, &occupied)));
    }
}
