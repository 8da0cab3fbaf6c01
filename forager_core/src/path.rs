use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::map::{Grid, Terrain};
use crate::{Direction, Movement, Position};

/// An ordered move sequence between two cells. Its length is its action cost
/// under unit step cost.
pub type Path = Vec<Direction>;

fn traversable(grid: &Grid<Terrain>, position: Position) -> bool {
    matches!(grid.get(position), Some(Terrain::Floor))
}

/// A* shortest path from `start` to `goal` honoring the movement model.
///
/// A cell is traversable iff it is in bounds and not a wall; resource
/// occupancy never blocks movement. `start == goal` yields an empty path.
/// Returns `None` when no path exists. Neighbors are expanded in the fixed
/// [`Movement`] order and frontier ties break by insertion order, so
/// identical inputs always reconstruct the identical path.
pub fn find_path(
    grid: &Grid<Terrain>,
    start: Position,
    goal: Position,
    movement: Movement,
) -> Option<Path> {
    if !traversable(grid, start) || !traversable(grid, goal) {
        return None;
    }
    if start == goal {
        return Some(Path::new());
    }

    // For priority queue
    #[derive(Clone, Eq, PartialEq)]
    struct Frontier {
        priority: usize,
        order: usize,
        position: Position,
    }

    impl Ord for Frontier {
        fn cmp(&self, other: &Self) -> Ordering {
            // Reverse ordering for min-heap behavior; earlier pushes first
            other
                .priority
                .cmp(&self.priority)
                .then_with(|| other.order.cmp(&self.order))
        }
    }

    impl PartialOrd for Frontier {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<Position, (Position, Direction)> = HashMap::new();
    let mut cost_so_far: HashMap<Position, usize> = HashMap::new();
    let mut pushes = 0;

    cost_so_far.insert(start, 0);
    frontier.push(Frontier {
        priority: movement.heuristic(start, goal),
        order: pushes,
        position: start,
    });

    let mut goal_reached = false;

    while let Some(Frontier {
        position: current, ..
    }) = frontier.pop()
    {
        if current == goal {
            goal_reached = true;
            break;
        }

        let current_cost = *cost_so_far.get(&current).unwrap_or(&usize::MAX);

        for &direction in movement.directions() {
            let Some(next) = current.step(direction) else {
                continue;
            };
            if !traversable(grid, next) {
                continue;
            }

            let new_cost = current_cost + 1;
            if !cost_so_far.contains_key(&next) || new_cost < cost_so_far[&next] {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, (current, direction));
                pushes += 1;
                frontier.push(Frontier {
                    priority: new_cost + movement.heuristic(next, goal),
                    order: pushes,
                    position: next,
                });
            }
        }
    }

    if !goal_reached {
        return None;
    }

    // Walk came_from back from the goal, collecting the move labels.
    let mut moves = Vec::new();
    let mut current = goal;
    while current != start {
        let &(previous, direction) = came_from.get(&current)?;
        moves.push(direction);
        current = previous;
    }
    moves.reverse();
    Some(moves)
}

/// Memoizes [`find_path`] results, including unreachable ones, between
/// position pairs queried repeatedly within one solve.
///
/// One cache serves one movement model over one obstacle layout; the terrain
/// never changes during a solve, so entries never go stale.
#[derive(Debug, Clone)]
pub struct PathCache {
    movement: Movement,
    entries: HashMap<(Position, Position), Option<Path>>,
}

impl PathCache {
    pub fn new(movement: Movement) -> Self {
        PathCache {
            movement,
            entries: HashMap::new(),
        }
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    /// The shortest path from `from` to `to`, computed at most once.
    pub fn path(&mut self, grid: &Grid<Terrain>, from: Position, to: Position) -> Option<Path> {
        let movement = self.movement;
        self.entries
            .entry((from, to))
            .or_insert_with(|| find_path(grid, from, to, movement))
            .clone()
    }

    /// The shortest-path cost alone, without cloning the move sequence.
    pub fn cost(&mut self, grid: &Grid<Terrain>, from: Position, to: Position) -> Option<usize> {
        let movement = self.movement;
        self.entries
            .entry((from, to))
            .or_insert_with(|| find_path(grid, from, to, movement))
            .as_ref()
            .map(Vec::len)
    }
}
