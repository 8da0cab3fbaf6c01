use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::path::PathCache;
use crate::planner::{TripPlan, plan_trip};
use crate::world::World;
use crate::{Action, Direction, Movement, Position};

/// Solve-wide limits and movement rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveConfig {
    pub movement: Movement,
    /// Maximum resources carried at once.
    pub capacity: usize,
    /// Per-move cost used only for trip profitability scoring; it is never
    /// deducted from the hard action budget.
    pub cost_per_step: f64,
    /// Hard budget on the total number of emitted actions.
    pub max_actions: usize,
}

/// Execution-loop states. Each transition function emits the actions for its
/// state and returns the next one.
enum Phase {
    AtDepot,
    Collecting(TripPlan),
    Returning,
    Done,
}

/// Plans and emits the full action sequence for one solve.
///
/// The start cell is the depot: every trip leaves from it and every DROP
/// happens on it. Returns an empty sequence when the input is degenerate
/// (start out of bounds or inside a wall, zero capacity or budget) or when
/// no viable trip exists.
pub fn solve(world: &World, start: Position, config: &SolveConfig) -> Vec<Action> {
    if !world.is_open(start) || config.capacity == 0 || config.max_actions == 0 {
        return Vec::new();
    }
    Solver::new(world, start, config).run()
}

struct Solver<'a> {
    world: &'a World,
    /// Live resource set, drained as TAKE actions are committed.
    resources: BTreeSet<Position>,
    cache: PathCache,
    config: SolveConfig,
    depot: Position,
    position: Position,
    carried: usize,
    budget: usize,
    actions: Vec<Action>,
}

impl<'a> Solver<'a> {
    fn new(world: &'a World, start: Position, config: &SolveConfig) -> Self {
        Solver {
            world,
            resources: world.resources().clone(),
            cache: PathCache::new(config.movement),
            config: *config,
            depot: start,
            position: start,
            carried: 0,
            budget: config.max_actions,
            actions: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Action> {
        self.collect_initial_bonus();

        let mut phase = Phase::AtDepot;
        loop {
            phase = match phase {
                Phase::AtDepot => self.at_depot(),
                Phase::Collecting(plan) => self.collect(plan),
                Phase::Returning => self.return_home(),
                Phase::Done => break,
            };
        }
        self.actions
    }

    /// A resource sitting on the depot at solve start is banked immediately,
    /// before any trip; it is never a trip target.
    fn collect_initial_bonus(&mut self) {
        if self.resources.contains(&self.depot) && self.budget >= 2 {
            self.resources.remove(&self.depot);
            self.emit(Action::Take);
            self.emit(Action::Drop);
        }
    }

    fn at_depot(&mut self) -> Phase {
        let plan = plan_trip(
            self.world.terrain(),
            &self.resources,
            &mut self.cache,
            self.position,
            self.depot,
            self.budget,
            self.config.capacity,
            self.config.cost_per_step,
        );
        match plan {
            Some(plan) => Phase::Collecting(plan),
            // Cannot arise at the depot; kept as a guard.
            None if self.carried > 0 => Phase::Returning,
            None => Phase::Done,
        }
    }

    /// Walks each leg of the trip and picks up the stop at its end.
    fn collect(&mut self, plan: TripPlan) -> Phase {
        for (stop, leg) in plan.stops.iter().zip(&plan.legs) {
            if !self.emit_moves(leg) {
                return Phase::Done;
            }
            // Never TAKE a stale target, past capacity, or past the budget.
            if !self.resources.contains(stop)
                || self.carried >= self.config.capacity
                || self.budget == 0
            {
                return Phase::Returning;
            }
            self.resources.remove(stop);
            self.carried += 1;
            self.emit(Action::Take);
        }
        Phase::Returning
    }

    /// Heads back to the depot and banks the cargo. When the round trip no
    /// longer fits the budget, walks the affordable prefix and stops.
    fn return_home(&mut self) -> Phase {
        if self.position == self.depot {
            if self.carried > 0 {
                if !self.emit(Action::Drop) {
                    return Phase::Done;
                }
                self.carried = 0;
            }
            return if self.budget == 0 {
                Phase::Done
            } else {
                Phase::AtDepot
            };
        }

        let Some(path) = self
            .cache
            .path(self.world.terrain(), self.position, self.depot)
        else {
            // The depot is unreachable from here; nothing more can be scored.
            return Phase::Done;
        };

        if path.len() + 1 <= self.budget {
            if !self.emit_moves(&path) {
                return Phase::Done;
            }
            self.emit(Action::Drop);
            self.carried = 0;
            if self.budget == 0 {
                Phase::Done
            } else {
                Phase::AtDepot
            }
        } else {
            // Undelivered cargo is not scored, so no DROP on a cut-short run.
            let prefix: Vec<Direction> = path.into_iter().take(self.budget).collect();
            self.emit_moves(&prefix);
            Phase::Done
        }
    }

    /// Emits one non-move action if the budget allows it.
    fn emit(&mut self, action: Action) -> bool {
        if self.budget == 0 {
            return false;
        }
        self.budget -= 1;
        self.actions.push(action);
        true
    }

    /// Emits the moves of a path, tracking the agent position. Returns false
    /// if the budget ran out before the path was finished.
    fn emit_moves(&mut self, path: &[Direction]) -> bool {
        for &direction in path {
            if self.budget == 0 {
                return false;
            }
            self.budget -= 1;
            if let Some(next) = self.position.step(direction) {
                self.position = next;
            }
            self.actions.push(Action::Move(direction));
        }
        true
    }
}
