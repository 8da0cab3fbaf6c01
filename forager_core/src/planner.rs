use std::collections::BTreeSet;

use crate::Position;
use crate::map::{Grid, Terrain};
use crate::path::{Path, PathCache};

/// One planned excursion from the depot.
///
/// `legs` holds `stops.len() + 1` paths: one to each stop in visiting order,
/// then the leg back to the depot. `cost` is the full action cost of the
/// trip (every move, one TAKE per stop, the final DROP).
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub stops: Vec<Position>,
    pub legs: Vec<Path>,
    pub cost: usize,
    /// Resources collected minus move actions weighted by the per-step cost.
    pub net_gain: f64,
}

impl TripPlan {
    /// Total move actions across all legs.
    pub fn move_count(&self) -> usize {
        self.legs.iter().map(Vec::len).sum()
    }
}

/// Builds the next trip by greedy nearest-first extension.
///
/// Starting from `from`, repeatedly admits the nearest remaining resource
/// whose pickup *and* return to the depot still fit `budget`, until
/// `capacity` stops are chosen or no candidate fits. Unreachable candidates
/// are skipped. Ties on distance go to the first candidate in resource
/// iteration order, so identical inputs always yield the identical plan.
///
/// With a positive `cost_per_step` the finished trip must be profitable
/// (`stops - moves * cost_per_step > 0`); otherwise there is no viable trip
/// and `None` is returned. The resource set is only read, never written.
#[allow(clippy::too_many_arguments)]
pub fn plan_trip(
    terrain: &Grid<Terrain>,
    resources: &BTreeSet<Position>,
    cache: &mut PathCache,
    from: Position,
    depot: Position,
    budget: usize,
    capacity: usize,
    cost_per_step: f64,
) -> Option<TripPlan> {
    let mut stops: Vec<Position> = Vec::new();
    let mut legs: Vec<Path> = Vec::new();
    // Return leg of the most recently admitted stop.
    let mut home: Path = Path::new();
    let mut current = from;
    let mut cost_so_far = 0;

    while stops.len() < capacity {
        let mut best: Option<(Position, Path, Path)> = None;
        let mut best_distance = usize::MAX;

        for &candidate in resources {
            if stops.contains(&candidate) {
                continue;
            }
            let Some(leg) = cache.path(terrain, current, candidate) else {
                continue;
            };
            let Some(back) = cache.path(terrain, candidate, depot) else {
                continue;
            };
            // Pickup, then the return trip with its DROP, all within budget.
            if cost_so_far + leg.len() + 1 + back.len() + 1 > budget {
                continue;
            }
            if leg.len() < best_distance {
                best_distance = leg.len();
                best = Some((candidate, leg, back));
            }
        }

        let Some((stop, leg, back)) = best else {
            break;
        };
        cost_so_far += leg.len() + 1;
        current = stop;
        stops.push(stop);
        legs.push(leg);
        home = back;
    }

    if stops.is_empty() {
        return None;
    }

    let cost = cost_so_far + home.len() + 1;
    legs.push(home);

    let moves = legs.iter().map(Vec::len).sum::<usize>();
    let net_gain = stops.len() as f64 - moves as f64 * cost_per_step;
    if cost_per_step > 0.0 && net_gain <= 0.0 {
        return None;
    }

    Some(TripPlan {
        stops,
        legs,
        cost,
        net_gain,
    })
}
